//! External link validation for the front-matter `info` list

use url::Url;

/// Keep only absolute `http`/`https` URLs.
///
/// Wiki-style `[[...]]` cross-references, blank entries and anything that
/// does not parse as an absolute URL are dropped. Entries are trimmed.
pub fn validate_links<S: AsRef<str>>(info: &[S]) -> Vec<String> {
    info.iter()
        .map(|link| link.as_ref().trim())
        .filter(|link| is_external_link(link))
        .map(str::to_string)
        .collect()
}

fn is_external_link(link: &str) -> bool {
    if link.is_empty() || link.starts_with("[[") {
        return false;
    }

    match Url::parse(link) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
