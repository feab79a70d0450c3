//! Filesystem-safe file names
//!
//! Every name that reaches an [`Artifact`](crate::Artifact), whether it came
//! from user input or from an upstream header, goes through
//! [`sanitize_filename`] first.

use percent_encoding::percent_decode_str;

/// Characters illegal in file names on at least one target platform
const ILLEGAL_CHARS: &[char] = &['/', '?', '<', '>', '\\', ':', '*', '|', '"'];

/// Device names Windows refuses as file stems
const WINDOWS_RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Maximum file name length in bytes
const MAX_LEN: usize = 255;

/// Stem used when nothing usable survives sanitization
const FALLBACK_STEM: &str = "download";

/// Strip characters and names that are unsafe as a file name
///
/// Returns an empty string when nothing usable is left.
pub fn sanitize_filename(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c) && !c.is_control())
        .collect();

    if cleaned == "." || cleaned == ".." {
        return String::new();
    }

    let stem = cleaned.split('.').next().unwrap_or_default();
    if WINDOWS_RESERVED
        .iter()
        .any(|reserved| stem.eq_ignore_ascii_case(reserved))
    {
        return String::new();
    }

    // Truncation can expose a new trailing dot or space
    truncate_on_char_boundary(&cleaned, MAX_LEN)
        .trim_end_matches(['.', ' '])
        .to_string()
}

/// Pick a file name: the sanitized hint, else `<stem>.<ext>`
pub fn file_name_or(hint: Option<&str>, stem: &str, ext: &str) -> String {
    if let Some(name) = hint.map(sanitize_filename).filter(|n| !n.is_empty()) {
        return name;
    }

    let ext_len = ext.len() + 1;
    let stem = sanitize_filename(stem);
    let stem = if stem.is_empty() {
        FALLBACK_STEM
    } else {
        truncate_on_char_boundary(&stem, MAX_LEN - ext_len)
    };
    format!("{}.{}", stem, ext)
}

/// Parse filename from Content-Disposition header value
///
/// `filename*=` (RFC 5987) takes precedence over `filename=`.
pub fn parse_content_disposition_filename(value: &str) -> Option<String> {
    for segment in value.split(';') {
        let part = segment.trim();
        if let Some(encoded) = strip_prefix_ignore_case(part, "filename*=") {
            let encoded = encoded.trim().trim_matches('"');
            // charset'language'value
            let raw = encoded.rsplit("''").next().unwrap_or(encoded);
            let decoded = percent_decode_str(raw).decode_utf8_lossy();
            if !decoded.is_empty() {
                return Some(decoded.into_owned());
            }
        }
    }

    for segment in value.split(';') {
        let part = segment.trim();
        if let Some(raw) = strip_prefix_ignore_case(part, "filename=") {
            let filename = raw.trim().trim_matches('"');
            if !filename.is_empty() {
                return Some(filename.to_string());
            }
        }
    }

    None
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}

fn truncate_on_char_boundary(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_separators_and_reserved_chars() {
        assert_eq!(sanitize_filename("author/slug"), "authorslug");
        assert_eq!(sanitize_filename("a\\b:c*d?e\"f<g>h|i"), "abcdefghi");
        assert_eq!(sanitize_filename("../../etc/passwd"), "....etcpasswd");
        assert_eq!(sanitize_filename("tab\there\n"), "tabhere");
    }

    #[test]
    fn test_sanitize_reserved_names() {
        assert_eq!(sanitize_filename("."), "");
        assert_eq!(sanitize_filename(".."), "");
        assert_eq!(sanitize_filename("CON"), "");
        assert_eq!(sanitize_filename("nul.png"), "");
        assert_eq!(sanitize_filename("console.png"), "console.png");
    }

    #[test]
    fn test_sanitize_trailing_dots_and_spaces() {
        assert_eq!(sanitize_filename("card. . "), "card");
        assert_eq!(sanitize_filename("card.png"), "card.png");
    }

    #[test]
    fn test_sanitize_truncates_on_char_boundary() {
        let long = "é".repeat(200);
        let result = sanitize_filename(&long);
        assert!(result.len() <= 255);
        assert!(result.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_file_name_or() {
        assert_eq!(file_name_or(Some("card.png"), "id", "png"), "card.png");
        assert_eq!(file_name_or(Some("a/b.png"), "id", "png"), "ab.png");
        assert_eq!(file_name_or(None, "author/slug", "png"), "authorslug.png");
        assert_eq!(file_name_or(Some("///"), "uuid", "json"), "uuid.json");
        assert_eq!(file_name_or(None, "//", "json"), "download.json");
    }

    #[test]
    fn test_parse_content_disposition_filename() {
        assert_eq!(
            parse_content_disposition_filename("attachment; filename=\"card.png\""),
            Some("card.png".to_string())
        );
        assert_eq!(
            parse_content_disposition_filename("attachment; filename=card.png"),
            Some("card.png".to_string())
        );
        assert_eq!(
            parse_content_disposition_filename(
                "attachment; filename=\"fallback.png\"; filename*=UTF-8''Caf%C3%A9.png"
            ),
            Some("Café.png".to_string())
        );
        assert_eq!(parse_content_disposition_filename("inline"), None);
    }

    #[test]
    fn test_content_disposition_keeps_malformed_escapes() {
        assert_eq!(
            parse_content_disposition_filename("attachment; filename*=UTF-8''100%25%zz.png"),
            Some("100%%zz.png".to_string())
        );
    }

    #[test]
    fn test_sanitize_trims_after_truncation() {
        let name = format!("{} b.png", "a".repeat(254));
        let result = sanitize_filename(&name);
        assert_eq!(result, "a".repeat(254));

        let name = format!("{}..png", "b".repeat(254));
        assert_eq!(sanitize_filename(&name), "b".repeat(254));
    }
}
