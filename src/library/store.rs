use thiserror::Error;

use super::model::Track;

/// Failure reported by a playlist store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("playlist store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("playlist store holds malformed data: {0}")]
    Malformed(String),
}

/// Where the playlist is kept between runs.
///
/// The on-disk format is up to the implementor; the player only needs the
/// two calls below and treats every error as non-fatal.
pub trait PlaylistStore {
    fn save(&self, tracks: &[Track]) -> Result<(), StoreError>;
    fn load(&self) -> Result<Vec<Track>, StoreError>;
}

#[cfg(test)]
pub(crate) use memory::MemoryStore;
