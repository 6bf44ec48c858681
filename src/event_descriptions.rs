use std::collections::HashMap;

/// Descriptions for well-known Windows Security event IDs. Entries absent
/// from the table simply omit the `(description)` suffix in the output.
static EVENT_DESCRIPTIONS: &[(u16, &str)] = &[
    (1100, "The event logging service has shut down."),
    (1101, "Audit events have been dropped by the transport."),
    (1102, "The audit log was cleared."),
    (1104, "The security log is now full."),
    (1105, "Event log automatic backup."),
    (4608, "Windows is starting up."),
    (4609, "Windows is shutting down."),
    (4610, "An authentication package has been loaded by the Local Security Authority."),
    (4611, "A trusted logon process has been registered with the Local Security Authority."),
    (4612, "Internal resources allocated for the queuing of audit messages have been exhausted, leading to the loss of some audits."),
    (4614, "A notification package has been loaded by the Security Account Manager."),
    (4615, "Invalid use of LPC port."),
    (4616, "The system time was changed."),
    (4618, "A monitored security event pattern has occurred."),
    (4621, "Administrator recovered system from CrashOnAuditFail."),
    (4622, "A security package has been loaded by the Local Security Authority."),
    (4624, "An account was successfully logged on."),
    (4625, "An account failed to log on."),
    (4634, "An account was logged off."),
    (4646, "IKE DoS-prevention mode started."),
    (4647, "User initiated logoff."),
    (4648, "A logon was attempted using explicit credentials."),
    (4649, "A replay attack was detected."),
    (4672, "Special privileges assigned to new logon."),
    (4673, "A privileged service was called."),
    (4674, "An operation was attempted on a privileged object."),
    (4688, "A new process has been created."),
    (4689, "A process has exited."),
    (4697, "A service was installed in the system."),
    (4698, "A scheduled task was created."),
    (4699, "A scheduled task was deleted."),
    (4700, "A scheduled task was enabled."),
    (4701, "A scheduled task was disabled."),
    (4702, "A scheduled task was updated."),
    (4719, "System audit policy was changed."),
    (4720, "A user account was created."),
    (4722, "A user account was enabled."),
    (4723, "An attempt was made to change an account's password."),
    (4724, "An attempt was made to reset an account's password."),
    (4725, "A user account was disabled."),
    (4726, "A user account was deleted."),
    (4727, "A security-enabled global group was created."),
    (4728, "A member was added to a security-enabled global group."),
    (4732, "A member was added to a security-enabled local group."),
    (4738, "A user account was changed."),
    (4740, "A user account was locked out."),
    (4767, "A user account was unlocked."),
    (4768, "A Kerberos authentication ticket (TGT) was requested."),
    (4769, "A Kerberos service ticket was requested."),
    (4771, "Kerberos pre-authentication failed."),
    (4776, "The computer attempted to validate the credentials for an account."),
    (4778, "A session was reconnected to a Window Station."),
    (4779, "A session was disconnected from a Window Station."),
    (4798, "A user's local group membership was enumerated."),
    (4799, "A security-enabled local group membership was enumerated."),
    (4826, "Boot Configuration Data loaded."),
    (5024, "The Windows Firewall Service has started successfully."),
    (5033, "The Windows Firewall Driver has started successfully."),
    (5058, "Key file operation."),
    (5059, "Key migration operation."),
    (5061, "Cryptographic operation."),
    (5379, "Credential Manager credentials were read."),
];

/// Labels for the `LogonType` field of logon events, indexed by value.
/// Gaps (0, 1, 6) have no documented meaning and stay unlabeled.
static LOGON_TYPES: [Option<&str>; 12] = [
    None,
    None,
    Some("Interactive"),
    Some("Network"),
    Some("Batch"),
    Some("Service"),
    None,
    Some("Unlock"),
    Some("NetworkCleartext"),
    Some("NewCredentials"),
    Some("RemoteInteractive"),
    Some("CachedInteractive"),
];

pub(crate) fn logon_type_label(value: u32) -> Option<&'static str> {
    LOGON_TYPES.get(value as usize).copied().flatten()
}

/// Read-only EventID to description lookup, loaded once at startup.
#[derive(Debug)]
pub struct EventDescriptions {
    table: HashMap<u16, &'static str>,
}

impl EventDescriptions {
    pub fn load() -> Self {
        EventDescriptions {
            table: EVENT_DESCRIPTIONS.iter().copied().collect(),
        }
    }

    pub fn description(&self, event_id: u16) -> Option<&'static str> {
        self.table.get(&event_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_resolve() {
        let events = EventDescriptions::load();
        assert_eq!(
            events.description(4624),
            Some("An account was successfully logged on.")
        );
        assert_eq!(events.description(9), None);
    }

    #[test]
    fn logon_type_labels() {
        assert_eq!(logon_type_label(2), Some("Interactive"));
        assert_eq!(logon_type_label(6), None);
        assert_eq!(logon_type_label(12), None);
    }
}
