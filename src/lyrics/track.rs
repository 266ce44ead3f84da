use std::time::Duration;

/// One timestamped line of lyrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
    pub time: Duration,
    pub text: String,
}

/// Parse LRC markup.
///
/// Each `[mm:ss.xx]` (or `[mm:ss:xx]`) tag on a line yields one entry that
/// carries the text after the line's last tag. Lines without a time tag,
/// including `[ar:...]` style headers, are skipped. The result is sorted by
/// time; entries sharing a timestamp keep their file order.
pub fn parse_lrc(content: &str) -> Vec<LyricLine> {
    let mut lines = Vec::new();

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let mut times = Vec::new();
        let mut text_start = 0;
        let mut cursor = 0;
        while let Some(open) = line[cursor..].find('[') {
            let open = cursor + open;
            let Some(close) = line[open..].find(']') else {
                break;
            };
            let close = open + close;
            if let Some(time) = parse_time_tag(&line[open + 1..close]) {
                times.push(time);
                text_start = close + 1;
            }
            cursor = close + 1;
        }

        if times.is_empty() {
            continue;
        }

        let text = line[text_start..].trim();
        lines.extend(times.into_iter().map(|time| LyricLine {
            time,
            text: text.to_string(),
        }));
    }

    lines.sort_by_key(|l| l.time);
    lines
}

/// `mm:ss.xx` or `mm:ss:xx`, two digits per field.
fn parse_time_tag(tag: &str) -> Option<Duration> {
    let bytes = tag.as_bytes();
    if bytes.len() != 8 || bytes[2] != b':' || !matches!(bytes[5], b'.' | b':') {
        return None;
    }

    let field = |range: std::ops::Range<usize>| -> Option<u64> {
        let s = &tag[range];
        if s.bytes().all(|b| b.is_ascii_digit()) {
            s.parse().ok()
        } else {
            None
        }
    };

    let minutes = field(0..2)?;
    let seconds = field(3..5)?;
    let centis = field(6..8)?;
    Some(
        Duration::from_secs(minutes * 60 + seconds) + Duration::from_millis(centis * 10),
    )
}

/// Lyrics for the loaded track plus the line currently shown.
#[derive(Debug, Clone, Default)]
pub struct LyricTrack {
    lines: Vec<LyricLine>,
    current: Option<usize>,
}

impl LyricTrack {
    pub fn new(lines: Vec<LyricLine>) -> Self {
        Self {
            lines,
            current: None,
        }
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn current(&self) -> Option<&LyricLine> {
        self.current.map(|i| &self.lines[i])
    }

    /// Move the selection to the last line at or before `position`.
    ///
    /// Returns `Some(line)` when the selection changed (`Some(None)` when it
    /// changed to "no line") and `None` when it stayed put.
    pub fn update_current(&mut self, position: Duration) -> Option<Option<&LyricLine>> {
        let next = self
            .lines
            .iter()
            .rposition(|l| l.time <= position);

        if next == self.current {
            return None;
        }
        self.current = next;
        Some(self.current())
    }
}
