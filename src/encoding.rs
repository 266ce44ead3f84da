//! Tag text recovery.
//!
//! Tag readers routinely decode legacy regional encodings (GBK, Big5, ...)
//! as if they were Latin-1 or UTF-8. The helpers here re-derive the raw
//! bytes from such a string and retry a short, ordered list of candidate
//! encodings until the result looks like real text.

mod recover;
mod script;

pub use recover::*;
pub use script::{is_plausible, is_target_script, looks_misread};
