use std::collections::HashSet;

/// Token that stands for "any encoding".
pub const WILDCARD: &str = "*";

/// The set of encodings a client declared it accepts.
///
/// Quality values only matter when they are exactly zero, which removes the
/// token. Every other weight is ignored, so the set carries no ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities<'a> {
    tokens: HashSet<&'a str>,
}

impl<'a> Capabilities<'a> {
    /// Returns true if the client listed `token` without excluding it.
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// Returns true if the client sent the `*` wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.tokens.contains(WILDCARD)
    }

    /// Returns true if no usable token was found.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterates over the accepted tokens in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.tokens.iter().copied()
    }
}

/// Parses an `Accept-Encoding` value such as `"gzip, br;q=0.5, *;q=0.1"`.
///
/// The value is cut to `max_len` characters first. Entries with `q=0` or
/// with a quality that does not parse as a number are dropped.
pub fn parse_accept_encoding(header: &str, max_len: usize) -> Capabilities<'_> {
    let header = truncate_chars(header, max_len);

    let tokens = header.split(',').filter_map(parse_entry).collect();

    Capabilities { tokens }
}

/// Parses one comma-separated entry, returning its token unless excluded.
fn parse_entry(entry: &str) -> Option<&str> {
    let mut parts = entry.split(';');
    let token = parts.next().unwrap_or("").trim();
    if token.is_empty() {
        return None;
    }

    for param in parts {
        let Some((name, value)) = param.split_once('=') else {
            continue;
        };
        if !name.trim().eq_ignore_ascii_case("q") {
            continue;
        }
        match value.trim().parse::<f32>() {
            Ok(q) if q == 0.0 => return None,
            Ok(_) => {}
            Err(_) => {
                tracing::trace!(entry, "dropping encoding with malformed quality");
                return None;
            }
        }
    }

    Some(token)
}

fn truncate_chars(s: &str, max_len: usize) -> &str {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(header: &str) -> Capabilities<'_> {
        parse_accept_encoding(header, 200)
    }

    fn sorted(caps: &Capabilities<'_>) -> Vec<String> {
        let mut tokens: Vec<String> = caps.iter().map(str::to_owned).collect();
        tokens.sort();
        tokens
    }

    #[test]
    fn test_empty_header() {
        assert!(parse("").is_empty());
        assert!(parse(" , ,").is_empty());
    }

    #[test]
    fn test_plain_list() {
        let caps = parse("gzip, deflate, br");
        assert_eq!(sorted(&caps), vec!["br", "deflate", "gzip"]);
    }

    #[test]
    fn test_weights_ignored_unless_zero() {
        let caps = parse("br;q=1.0, gzip;q=0.8, zstd;q=0");
        assert!(caps.contains("br"));
        assert!(caps.contains("gzip"));
        assert!(!caps.contains("zstd"));
    }

    #[test]
    fn test_zero_quality_forms() {
        assert!(parse("br;q=0.000").is_empty());
        assert!(parse("br ; Q = 0").is_empty());
        assert!(parse("br;q=0.").is_empty());
    }

    #[test]
    fn test_malformed_quality_drops_token() {
        let caps = parse("br;q=high, gzip");
        assert!(!caps.contains("br"));
        assert!(caps.contains("gzip"));

        assert!(parse("zstd;q=").is_empty());
    }

    #[test]
    fn test_non_quality_params_ignored() {
        let caps = parse("gzip;level=0, br;foo");
        assert!(caps.contains("gzip"));
        assert!(caps.contains("br"));
    }

    #[test]
    fn test_tokens_are_case_sensitive() {
        let caps = parse("GZIP");
        assert!(caps.contains("GZIP"));
        assert!(!caps.contains("gzip"));
    }

    #[test]
    fn test_wildcard_preserved() {
        let caps = parse("gzip, *;q=0.1");
        assert!(caps.has_wildcard());
        assert!(caps.contains("gzip"));
    }

    #[test]
    fn test_wildcard_with_zero_quality_dropped() {
        assert!(!parse("*;q=0").has_wildcard());
    }

    #[test]
    fn test_truncated_to_limit() {
        let header = format!("{}, br", " ".repeat(200));
        assert!(parse(&header).is_empty());

        let header = format!("{}br", " ".repeat(198));
        assert!(parse(&header).contains("br"));

        let header = format!("{}gzip", " ".repeat(198));
        assert!(parse(&header).contains("gz"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let header = "é".repeat(300);
        let caps = parse_accept_encoding(&header, 200);
        assert_eq!(caps.iter().next().map(|t| t.chars().count()), Some(200));
    }
}
