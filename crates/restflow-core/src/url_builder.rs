//! Pure URL construction: base + path + query merging with percent-encoding.

use std::collections::HashMap;

/// Merge `base_url`, `path`, and explicit query parameters into one URL.
///
/// Query parameters already embedded in the path are preserved in their
/// original order; explicit `query_params` override embedded ones with the
/// same key and are otherwise appended in key order, so the output is
/// deterministic. Pure string work: nothing is validated here, a path the
/// transport cannot parse fails at dispatch.
pub fn merge(path: &str, query_params: Option<&HashMap<String, String>>, base_url: &str) -> String {
    let full = escape_uri(&format!("{}{}", base_url, path));

    let (stem, embedded) = match full.split_once('?') {
        Some((stem, query)) => (stem.to_string(), query.to_string()),
        None => (full, String::new()),
    };

    let mut pairs: Vec<(String, String)> = embedded
        .split('&')
        .filter(|raw| !raw.is_empty())
        .map(|raw| match raw.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (raw.to_string(), String::new()),
        })
        .collect();

    if let Some(params) = query_params {
        let mut explicit: Vec<(&String, &String)> = params.iter().collect();
        explicit.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in explicit {
            let key = urlencoding::encode(key).into_owned();
            let value = urlencoding::encode(value).into_owned();
            match pairs.iter_mut().find(|(existing, _)| *existing == key) {
                Some(pair) => pair.1 = value,
                None => pairs.push((key, value)),
            }
        }
    }

    if pairs.is_empty() {
        stem
    } else {
        let query = pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", stem, query)
    }
}

/// Percent-encode everything outside the URI-safe set, leaving reserved
/// separators (`/ ? : @ & = + $ , ; # !` etc.) intact.
fn escape_uri(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &byte in input.as_bytes() {
        if is_uri_safe(byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

fn is_uri_safe(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b';' | b','
                | b'/'
                | b'?'
                | b':'
                | b'@'
                | b'&'
                | b'='
                | b'+'
                | b'$'
                | b'-'
                | b'_'
                | b'.'
                | b'!'
                | b'~'
                | b'*'
                | b'\''
                | b'('
                | b')'
                | b'#'
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn no_params_passes_through() {
        let uri = "https://api.example.com/";
        assert_eq!(merge(uri, None, ""), uri);
    }

    #[test]
    fn params_are_appended_in_key_order() {
        let merged = merge(
            "https://api.example.com/",
            Some(&params(&[("name", "kim"), ("token", "xyz")])),
            "",
        );
        assert_eq!(merged, "https://api.example.com/?name=kim&token=xyz");
    }

    #[test]
    fn embedded_params_are_preserved() {
        let uri = "https://api.example.com/?name=kim&token=xyz";
        assert_eq!(merge(uri, None, ""), uri);
    }

    #[test]
    fn explicit_params_override_embedded_ones() {
        let merged = merge(
            "https://api.example.com/?name=kim",
            Some(&params(&[("name", "lee")])),
            "",
        );
        assert_eq!(merged, "https://api.example.com/?name=lee");
    }

    #[test]
    fn opaque_relative_path_passes_through() {
        assert_eq!(merge("not-a-url", None, ""), "not-a-url");
    }

    #[test]
    fn base_url_is_prepended() {
        let merged = merge("policy/customer/", None, "https://api.example.com/v1/");
        assert_eq!(merged, "https://api.example.com/v1/policy/customer/");
    }

    #[test]
    fn spaces_are_percent_encoded() {
        assert_eq!(
            merge("https://api.example.com/a b", None, ""),
            "https://api.example.com/a%20b"
        );
        assert_eq!(
            merge("https://api.example.com/", Some(&params(&[("q", "a b")])), ""),
            "https://api.example.com/?q=a%20b"
        );
    }

    #[test]
    fn embedded_order_kept_new_keys_appended() {
        let merged = merge(
            "https://api.example.com/?z=1&a=2",
            Some(&params(&[("m", "3")])),
            "",
        );
        assert_eq!(merged, "https://api.example.com/?z=1&a=2&m=3");
    }

    #[test]
    fn dangling_question_mark_is_dropped() {
        assert_eq!(merge("https://api.example.com/x?", None, ""), "https://api.example.com/x");
    }
}
