use std::collections::HashMap;

/// An argument slot discovered while parsing a template body: the key the
/// substitution resolves to and its declared value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TemplateArgSlot {
    pub key: Vec<u8>,
    pub value_type: u16,
}

/// A cached template skeleton: text that is identical across every
/// instantiation (`fixed`, in insertion order) and the typed argument slots
/// keyed by substitution index.
#[derive(Debug, Default)]
pub(crate) struct TemplateDescription {
    fixed: Vec<(Vec<u8>, Vec<u8>)>,
    args: HashMap<u16, TemplateArgSlot>,
}

impl TemplateDescription {
    pub(crate) fn register_fixed_pair(&mut self, key: &[u8], value: &[u8]) {
        self.fixed.push((key.to_vec(), value.to_vec()));
    }

    /// The first registration for an index wins; template bodies may name an
    /// index twice and the original keeps the earlier slot.
    pub(crate) fn register_arg_pair(&mut self, index: u16, key: &[u8], value_type: u16) {
        self.args.entry(index).or_insert_with(|| TemplateArgSlot {
            key: key.to_vec(),
            value_type,
        });
    }

    pub(crate) fn fixed_pairs(&self) -> &[(Vec<u8>, Vec<u8>)] {
        &self.fixed
    }

    pub(crate) fn arg(&self, index: u16) -> Option<&TemplateArgSlot> {
        self.args.get(&index)
    }
}

/// Per-chunk map from short template ID to its cached description.
/// Cleared en bloc at every chunk boundary.
#[derive(Debug, Default)]
pub(crate) struct TemplateCache {
    known_ids: HashMap<u32, TemplateDescription>,
}

impl TemplateCache {
    pub(crate) fn new() -> Self {
        TemplateCache::default()
    }

    pub(crate) fn contains(&self, id: u32) -> bool {
        self.known_ids.contains_key(&id)
    }

    /// Insert a fresh empty description, replacing any stale entry.
    pub(crate) fn register(&mut self, id: u32) {
        self.known_ids.insert(id, TemplateDescription::default());
    }

    pub(crate) fn get(&self, id: u32) -> Option<&TemplateDescription> {
        self.known_ids.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: u32) -> Option<&mut TemplateDescription> {
        self.known_ids.get_mut(&id)
    }

    pub(crate) fn reset(&mut self) {
        self.known_ids.clear();
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.known_ids.is_empty()
    }
}
