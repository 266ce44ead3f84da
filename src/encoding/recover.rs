use std::borrow::Cow;
use std::sync::LazyLock;

use encoding_rs::{BIG5, EUC_KR, Encoding, GB18030, GBK, SHIFT_JIS, UTF_8, WINDOWS_1252};
use tracing::debug;

use crate::config::RecoverySettings;

use super::script::{is_east_asian, is_halfwidth_katakana, is_latin1_high, is_plausible};

/// Candidate encodings tried by default, most specific first.
pub const DEFAULT_CANDIDATES: &[&str] = &["utf-8", "gbk", "gb18030", "big5", "shift_jis", "euc-kr"];

/// Encoding used for the "re-encode under the platform default" pass.
pub const DEFAULT_PLATFORM_ENCODING: &str = "windows-1252";

static DEFAULT_RECOVERY: LazyLock<TextRecovery> = LazyLock::new(TextRecovery::default);

/// Repair `text` with the default candidate list.
///
/// See [`TextRecovery::recover`].
pub fn recover(text: &str) -> Cow<'_, str> {
    DEFAULT_RECOVERY.recover(text)
}

/// Best-effort repair of mis-decoded tag text, parameterised over an
/// ordered list of candidate legacy encodings.
#[derive(Debug, Clone)]
pub struct TextRecovery {
    candidates: Vec<&'static Encoding>,
    platform: &'static Encoding,
}

impl Default for TextRecovery {
    fn default() -> Self {
        Self {
            candidates: vec![UTF_8, GBK, GB18030, BIG5, SHIFT_JIS, EUC_KR],
            platform: WINDOWS_1252,
        }
    }
}

impl TextRecovery {
    /// Build a recovery from WHATWG encoding labels (`"gbk"`, `"big5"`, ...).
    pub fn from_labels<S: AsRef<str>>(candidates: &[S], platform: &str) -> Result<Self, String> {
        let candidates = candidates
            .iter()
            .map(|label| lookup(label.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if candidates.is_empty() {
            return Err("recovery.candidates must not be empty".to_string());
        }

        Ok(Self {
            candidates,
            platform: lookup(platform)?,
        })
    }

    pub fn from_settings(settings: &RecoverySettings) -> Result<Self, String> {
        Self::from_labels(&settings.candidates, &settings.platform_encoding)
    }

    /// Canonical names of the candidate encodings, in priority order.
    pub fn candidate_names(&self) -> Vec<&'static str> {
        self.candidates.iter().map(|e| e.name()).collect()
    }

    /// Attempt to recover the originally intended text.
    ///
    /// Text that already passes [`is_plausible`] is returned untouched, and
    /// when no pass produces plausible text the input comes back verbatim.
    /// Because every returned value is either the input or a plausible
    /// string, `recover(recover(s)) == recover(s)`.
    pub fn recover<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if text.is_empty() || is_plausible(text) {
            return Cow::Borrowed(text);
        }

        let fixed = self
            .from_code_units(text)
            .or_else(|| self.from_platform_bytes(text))
            .or_else(|| self.from_utf8_bytes(text));

        match fixed {
            Some(fixed) => {
                debug!(original = text, recovered = %fixed, "recovered tag text");
                Cow::Owned(fixed)
            }
            None => Cow::Borrowed(text),
        }
    }

    /// Decode raw bytes from a text file of unknown encoding.
    ///
    /// A BOM wins; otherwise the first candidate that decodes without
    /// errors is used, and lossy UTF-8 is the last resort.
    pub fn decode_bytes(&self, bytes: &[u8]) -> String {
        if let Some((enc, bom_len)) = Encoding::for_bom(bytes) {
            let (text, _) = enc.decode_without_bom_handling(&bytes[bom_len..]);
            return text.into_owned();
        }

        self.candidates
            .iter()
            .find_map(|enc| enc.decode_without_bom_handling_and_without_replacement(bytes))
            .map(Cow::into_owned)
            .unwrap_or_else(|| String::from_utf8_lossy(bytes).into_owned())
    }

    // Each UTF-16 unit taken as one raw byte: undoes a Latin-1 style
    // pass-through decode of a legacy byte stream.
    fn from_code_units(&self, text: &str) -> Option<String> {
        if !text.chars().any(|c| ('\u{80}'..='\u{FF}').contains(&c)) {
            return None;
        }
        let bytes: Vec<u8> = text.encode_utf16().map(|unit| unit as u8).collect();
        self.first_plausible(&bytes, text)
    }

    fn from_platform_bytes(&self, text: &str) -> Option<String> {
        let (bytes, _, unmappable) = self.platform.encode(text);
        if unmappable {
            return None;
        }
        self.first_plausible(&bytes, text)
    }

    fn from_utf8_bytes(&self, text: &str) -> Option<String> {
        self.first_plausible(text.as_bytes(), text)
    }

    fn first_plausible(&self, bytes: &[u8], original: &str) -> Option<String> {
        self.candidates.iter().find_map(|enc| {
            let decoded = enc.decode_without_bom_handling_and_without_replacement(bytes)?;
            let accepted = is_plausible(&decoded) && is_repair_of(&decoded, original);
            accepted.then(|| decoded.into_owned())
        })
    }
}

/// A candidate only counts as a repair when it differs from the input,
/// brings in East Asian text, has fewer U+0080..=U+00FF characters than
/// the input and carries no half-width katakana.
fn is_repair_of(candidate: &str, original: &str) -> bool {
    let high = |s: &str| s.chars().filter(|&c| is_latin1_high(c)).count();

    candidate != original
        && candidate.chars().any(is_east_asian)
        && !candidate.chars().any(is_halfwidth_katakana)
        && high(candidate) < high(original)
}

fn lookup(label: &str) -> Result<&'static Encoding, String> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| format!("unknown encoding label: {label:?}"))
}
