use crate::binxml::context::ParseContext;
use crate::err::{DeserializationError, DeserializationResult};

use std::fmt::{self, Debug, Display};

#[derive(PartialOrd, PartialEq, Eq, Clone)]
pub struct Sid {
    revision: u8,
    // Kept in big-endian order on the wire.
    id_authority: u64,
    sub_authorities: Vec<u32>,
}

impl Sid {
    /// Read a SID occupying `size` bytes. The sub-authority list is driven
    /// by the declared size, not by the count byte in the header; trailing
    /// bytes that do not fill a whole `u32` are left for the caller.
    pub(crate) fn from_context(ctx: &mut ParseContext<'_>, size: u16) -> DeserializationResult<Sid> {
        if size < 8 {
            return Err(DeserializationError::SidTooShort {
                size,
                offset: ctx.chunk_offset(),
            });
        }

        let header = ctx.take_bytes(8, "sid_header")?;
        let revision = header[0];
        let _sub_authority_count = header[1];

        let mut id_authority = 0_u64;
        for &byte in &header[2..8] {
            id_authority = (id_authority << 8) | u64::from(byte);
        }

        let mut sub_authorities = Vec::new();
        let mut consumed = 8_usize;
        while consumed + 4 <= usize::from(size) {
            sub_authorities.push(ctx.u32_named("sid_sub_authority")?);
            consumed += 4;
        }

        Ok(Sid {
            revision,
            id_authority,
            sub_authorities,
        })
    }
}

impl Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}-{}", self.revision, self.id_authority)?;
        for sub in &self.sub_authorities {
            write!(f, "-{}", sub)?;
        }
        Ok(())
    }
}

impl Debug for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}
