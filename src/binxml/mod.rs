pub(crate) mod context;
pub(crate) mod name;
pub(crate) mod template;
pub(crate) mod tokens;
mod value;

pub(crate) use context::ParseContext;
pub(crate) use tokens::BinXmlParser;
