//! File name derivation for acquired images.

use reqwest::Url;

/// How an acquired file is named in its order directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileNaming<'a> {
    /// `{order_id}_{original}`.
    OrderPrefixed(&'a str),
    /// `{c}_{original}`, see [`single_remote_file_name`].
    SingleRemote,
}

impl FileNaming<'_> {
    pub fn apply(&self, original: &str) -> String {
        match self {
            Self::OrderPrefixed(order_id) => order_file_name(order_id, original),
            Self::SingleRemote => single_remote_file_name(original),
        }
    }
}

/// File name referenced by an image URL or library path.
///
/// For http(s) URLs this is the last segment of the URL path, query and
/// fragment excluded. Anything else is treated as a path and split on both
/// separators. Returns `None` when the last segment is empty.
pub fn reference_file_name(reference: &str) -> Option<String> {
    let name = match Url::parse(reference) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        _ => {
            let path = reference.split(['?', '#']).next().unwrap_or_default();
            path.rsplit(['/', '\\']).next().map(str::to_string)
        }
    };

    name.filter(|n| !n.is_empty())
}

/// `{order_id}_{original}`.
pub fn order_file_name(order_id: &str, original: &str) -> String {
    format!("{}_{}", order_id, original)
}

/// Canonical name for a single-remote image.
///
/// When the name contains an underscore it is prefixed with the first
/// character of the segment that follows the first underscore and another
/// underscore: `A_bcd.jpg` becomes `b_A_bcd.jpg`. Names without an
/// underscore, or whose following segment is empty, are returned unchanged.
pub fn single_remote_file_name(original: &str) -> String {
    let prefix = original
        .split('_')
        .nth(1)
        .and_then(|segment| segment.chars().next());

    match prefix {
        Some(c) => format!("{}_{}", c, original),
        None => original.to_string(),
    }
}
