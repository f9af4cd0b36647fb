use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Matches anything that isn't a word character, whitespace or a dash.
static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());

/// Matches runs of dashes & whitespace.
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());

/// Makes a name safe to use as a file name.
///
/// The name is first folded down to ASCII, which drops accents and anything
/// that can't be represented. Punctuation is then removed and runs of
/// whitespace or dashes are collapsed into a single space.
pub fn slugify(value: &str) -> String {
    let ascii: String = value.nfkd().filter(char::is_ascii).collect();
    let stripped = PUNCTUATION.replace_all(&ascii, "");
    let collapsed = SEPARATORS.replace_all(&stripped, " ");

    collapsed
        .trim_matches(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .to_owned()
}

/// Formats the display name of a track, falling back to a numbered
/// placeholder if nothing usable is left after [`slugify`].
pub fn name(raw: &str, number: usize) -> String {
    let slug = slugify(raw.trim());
    if slug.is_empty() {
        format!("untitled-{number}")
    } else {
        slug
    }
}
