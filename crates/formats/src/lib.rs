pub mod zone_document;

pub use zone_document::*;
