use regex::Regex;
use std::sync::LazyLock;

// ASCII word characters only: `#café` tags `caf`.
static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([A-Za-z0-9_]+)").expect("Invalid tag regex"));

/// Extracts the `#word` hashtags of `text`, without the `#`.
///
/// Tags come back in the order they appear. Repeated tags are kept, so
/// `"#a #b #a"` yields `["a", "b", "a"]`.
#[must_use]
pub fn extract_tags(text: &str) -> Vec<String> {
    TAG_REGEX
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|tag| tag.as_str().to_owned())
        .collect()
}
