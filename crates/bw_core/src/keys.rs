use sha2::{Digest, Sha256};

/// Fixed-length digest of one or more text parts.
///
/// Parts are length-prefixed so ("ab", "c") and ("a", "bc") never collide.
pub fn content_key(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Lowercase the label and keep only ASCII alphanumerics.
pub fn normalize_source(source: &str) -> String {
    source
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_key_is_bounded_and_stable() {
        let body = "word ".repeat(100_000);
        let key = content_key(&[&body]);
        assert_eq!(key.len(), 64);
        assert_eq!(key, content_key(&[&body]));
        assert_ne!(key, content_key(&["word"]));
    }

    #[test]
    fn test_content_key_separates_parts() {
        assert_ne!(content_key(&["ab", "c"]), content_key(&["a", "bc"]));
    }

    #[test]
    fn test_normalize_source() {
        assert_eq!(normalize_source("Fox News"), "foxnews");
        assert_eq!(normalize_source("www.NYTimes.com"), "wwwnytimescom");
        assert_eq!(normalize_source("  "), "");
    }
}
