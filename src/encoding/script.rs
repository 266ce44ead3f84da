//! Character classification used to judge whether decoded text is plausible.

/// Ideograph blocks the recovery is biased towards (CJK unified ideographs,
/// extensions A-E and the compatibility blocks).
const TARGET_SCRIPT_RANGES: &[(u32, u32)] = &[
    (0x4E00, 0x9FFF),
    (0x3400, 0x4DBF),
    (0x20000, 0x2A6DF),
    (0x2A700, 0x2B73F),
    (0x2B740, 0x2B81F),
    (0x2B820, 0x2CEAF),
    (0xF900, 0xFAFF),
    (0x2F800, 0x2FA1F),
];

/// Shortest run of consecutive U+0080..=U+00FF characters taken as the
/// trace of legacy multi-byte text read one byte per char. Real Latin-1
/// words rarely stack more than two (`öß`, `çã`); two ideographs already
/// make four.
const MISREAD_RUN: usize = 3;

/// Returns true if `c` belongs to one of the target ideograph blocks.
pub fn is_target_script(c: char) -> bool {
    let cp = c as u32;
    TARGET_SCRIPT_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// Target ideographs plus kana and hangul, the scripts a successful
/// legacy decode produces.
pub(crate) fn is_east_asian(c: char) -> bool {
    is_target_script(c)
        || ('\u{3040}'..='\u{30FF}').contains(&c)
        || ('\u{AC00}'..='\u{D7AF}').contains(&c)
}

/// Half-width katakana: what Shift-JIS makes of stray single high bytes.
pub(crate) fn is_halfwidth_katakana(c: char) -> bool {
    ('\u{FF61}'..='\u{FF9F}').contains(&c)
}

pub(crate) fn is_latin1_high(c: char) -> bool {
    ('\u{80}'..='\u{FF}').contains(&c)
}

/// Validity test for (possibly recovered) tag text.
///
/// A string is plausible when it is non-empty, carries no NUL, `?` or
/// U+FFFD, no control characters besides tab/newline/carriage return,
/// every character is a target-script ideograph, a letter, a number,
/// whitespace, punctuation or a symbol, and it does not carry the
/// byte-per-char misread signature (see [`looks_misread`]).
pub fn is_plausible(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    let chars_ok = text.chars().all(|c| {
        if c == '\0' || c == '?' || c == char::REPLACEMENT_CHARACTER {
            return false;
        }
        if c.is_control() {
            return matches!(c, '\t' | '\n' | '\r');
        }
        is_target_script(c)
            || c.is_alphanumeric()
            || c.is_whitespace()
            || is_punctuation_or_symbol(c)
    });

    chars_ok && !looks_misread(text)
}

/// True when `text` holds a run of [`MISREAD_RUN`] or more consecutive
/// U+0080..=U+00FF characters.
///
/// Single accented letters and symbols (`Café`, `45°`, `E=mc²`) never
/// trigger it.
pub fn looks_misread(text: &str) -> bool {
    let mut run = 0;
    for c in text.chars() {
        if is_latin1_high(c) {
            run += 1;
            if run >= MISREAD_RUN {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

fn is_punctuation_or_symbol(c: char) -> bool {
    if c.is_ascii_punctuation() {
        return true;
    }

    match c {
        // Latin-1 signs and symbols: `¡` through `¿` plus `×` and `÷`.
        // C1 controls are rejected before this point.
        '\u{A0}'..='\u{BF}' | '×' | '÷' => true,
        // General punctuation, letterlike symbols, arrows, math and misc
        // symbols, dingbats.
        '\u{2000}'..='\u{2BFF}' => true,
        // CJK symbols and punctuation, fullwidth/halfwidth forms.
        '\u{3000}'..='\u{303F}' | '\u{FF00}'..='\u{FFEF}' => true,
        _ => false,
    }
}
