//! User metadata header codec
//!
//! Swift stores arbitrary object metadata as `X-Object-Meta-{key}` headers.

use std::collections::BTreeMap;

use crate::headers::Headers;

/// Header prefix carrying user-defined object metadata
pub const USER_METADATA_PREFIX: &str = "X-Object-Meta-";

/// Write every metadata entry into `headers` under the user metadata prefix
///
/// Keys are passed through unmodified.
pub fn encode_metadata(metadata: &BTreeMap<String, String>, headers: &mut Headers) {
    for (key, value) in metadata {
        headers.insert(format!("{USER_METADATA_PREFIX}{key}"), value.clone());
    }
}

/// Collect user metadata from headers, stripping the prefix from each name
///
/// The prefix match ignores ASCII case since servers and proxies are free to
/// re-case header names.
pub fn decode_metadata(headers: &Headers) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            strip_prefix_ignore_case(name, USER_METADATA_PREFIX)
                .filter(|key| !key.is_empty())
                .map(|key| (key.to_string(), value.to_string()))
        })
        .collect()
}

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let head = name.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &name[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_encode_adds_prefixed_headers() {
        let mut headers = Headers::new();
        encode_metadata(&meta(&[("Color", "red"), ("owner", "alice")]), &mut headers);
        assert_eq!(headers.get("X-Object-Meta-Color"), Some("red"));
        assert_eq!(headers.get("X-Object-Meta-owner"), Some("alice"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_decode_ignores_other_headers() {
        let headers: Headers = [
            ("Content-Type", "text/plain"),
            ("Content-Length", "12"),
            ("X-Object-Meta-Color", "red"),
            ("X-Container-Meta-Owner", "bob"),
        ]
        .into_iter()
        .collect();
        assert_eq!(decode_metadata(&headers), meta(&[("Color", "red")]));
    }

    #[test]
    fn test_decode_lowercased_wire_names() {
        let headers: Headers = [("x-object-meta-color", "red")].into_iter().collect();
        assert_eq!(decode_metadata(&headers), meta(&[("color", "red")]));
    }

    #[test]
    fn test_round_trip_preserves_keys() {
        let original = meta(&[
            ("Color", "red"),
            ("project-id", "42"),
            ("Mixed_Case.Key", "value with spaces"),
        ]);
        let mut headers = Headers::new();
        encode_metadata(&original, &mut headers);
        assert_eq!(decode_metadata(&headers), original);
    }

    #[test]
    fn test_utf8_values_round_trip_through_wire_headers() {
        let original = meta(&[("Owner", "José"), ("City", "Zürich")]);
        let mut headers = Headers::new();
        encode_metadata(&original, &mut headers);

        let wire = headers.to_header_map().unwrap();
        let decoded = decode_metadata(&Headers::from(&wire));
        assert_eq!(decoded, meta(&[("owner", "José"), ("city", "Zürich")]));
    }

    #[test]
    fn test_bare_prefix_is_not_metadata() {
        let headers: Headers = [("X-Object-Meta-", "x"), ("X-Obj", "y")]
            .into_iter()
            .collect();
        assert!(decode_metadata(&headers).is_empty());
    }
}
