use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use tracing::debug;

use crate::encoding::TextRecovery;

/// Display metadata read from a file's tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagInfo {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: Duration,
}

impl TagInfo {
    /// Run every string field through encoding recovery.
    pub fn recovered(self, recovery: &TextRecovery) -> Self {
        Self {
            title: recovery.recover(&self.title).into_owned(),
            artist: recovery.recover(&self.artist).into_owned(),
            album: recovery.recover(&self.album).into_owned(),
            duration: self.duration,
        }
    }
}

/// Read title/artist/album/duration with `lofty`.
///
/// Returns `None` when the file has no readable container; callers fall
/// back to the file name.
pub fn read_tags(path: &Path) -> Option<TagInfo> {
    let tagged = match lofty::read_from_path(path) {
        Ok(tagged) => tagged,
        Err(e) => {
            debug!(path = %path.display(), "no readable tags: {e}");
            return None;
        }
    };

    let mut info = TagInfo {
        duration: tagged.properties().duration(),
        ..TagInfo::default()
    };

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        info.title = tag.title().map(|v| v.trim().to_string()).unwrap_or_default();
        info.artist = tag.artist().map(|v| v.trim().to_string()).unwrap_or_default();
        info.album = tag.album().map(|v| v.trim().to_string()).unwrap_or_default();
    }

    Some(info)
}
