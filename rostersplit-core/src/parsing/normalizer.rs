use regex::Regex;
use std::sync::LazyLock;

/// Characters leaked into the name line by the roster renderer's "Text5:"
/// label, in the order they are stripped. Each one is removed at most once.
const LABEL_BLEED_SIGNATURE: [char; 5] = ['T', 'e', 'x', 't', '5'];

// ": " in front of a lowercase word is a label separator, not a time value
static LABEL_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r": ([a-zäöüß])").unwrap());

/// Strip the label-bleed artifact from one line of extracted text.
///
/// Steps, in order, each applied to the first occurrence only:
/// 1. drop `T`, `e`, `x`, `t`, `5`
/// 2. drop `": "` when a lowercase letter follows
/// 3. drop one `:`
/// 4. trim
///
/// This is not a character filter. Names that contain these
/// letters more than once keep the later occurrences.
pub fn normalize_line<'a>(line: impl Into<Option<&'a str>>) -> String {
    let Some(line) = line.into() else {
        return String::new();
    };

    let mut cleaned = line.to_string();
    for c in LABEL_BLEED_SIGNATURE {
        cleaned = cleaned.replacen(c, "", 1);
    }

    let cleaned = LABEL_SEPARATOR.replacen(&cleaned, 1, "$1");
    let cleaned = cleaned.replacen(':', "", 1);

    cleaned.trim().to_string()
}
