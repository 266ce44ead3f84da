//! Track model, tag reading and folder ingestion.
//!
//! Everything here is glue around the playback engine: tracks come in from
//! a folder scan (or a `PlaylistStore`) and are handed to the session one
//! `add` at a time.

mod model;
mod scan;
mod store;
mod tags;

pub use model::Track;
pub use scan::{dedup_by_path, scan};
pub use store::{PlaylistStore, StoreError};
pub use tags::{TagInfo, read_tags};

#[cfg(test)]
pub(crate) use store::MemoryStore;
