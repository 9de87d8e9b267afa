//! Query-string editing and the `modifiers` mini-map.
//!
//! Both use `application/x-www-form-urlencoded` pairs: `key=value` joined by
//! `&`, percent-decoded, `+` read as a space.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Bytes left unescaped in form-encoded keys and values.
const FORM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

/// Ordered `key=value` pairs.
pub type Pairs = Vec<(String, String)>;

fn decode_component(s: &str) -> String {
    let spaced = s.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, FORM).to_string().replace("%20", "+")
}

/// Parse `a=1&b=2` into ordered pairs. Empty segments are ignored.
pub fn parse_pairs(query: &str) -> Pairs {
    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((k, v)) => (decode_component(k), decode_component(v)),
            None => (decode_component(segment), String::new()),
        })
        .collect()
}

/// Serialize pairs back to `a=1&b=2`.
pub fn encode_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Overlay `updates` on `base`: existing keys are replaced in place, new
/// keys are appended.
pub fn merge_pairs(base: &mut Pairs, updates: Pairs) {
    for (key, value) in updates {
        match base.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => base.push((key, value)),
        }
    }
}

/// Rewrite the query string of `url` with the pairs in `value`.
///
/// With `force` the existing query is discarded; otherwise `value` is merged
/// over it. A URL fragment (`#...`) is preserved.
pub fn edit_query(url: &str, value: &str, force: bool) -> String {
    let (without_hash, hash) = match url.find('#') {
        Some(i) => url.split_at(i),
        None => (url, ""),
    };
    let (path, query) = match without_hash.split_once('?') {
        Some((path, query)) => (path, query),
        None => (without_hash, ""),
    };

    let updates = parse_pairs(value);
    let pairs = if force {
        updates
    } else {
        let mut pairs = parse_pairs(query);
        merge_pairs(&mut pairs, updates);
        pairs
    };

    if pairs.is_empty() {
        format!("{path}{hash}")
    } else {
        format!("{path}?{}{hash}", encode_pairs(&pairs))
    }
}

/// Decode a `modifiers` value such as `auto=compress&crop=entropy`.
pub fn to_modifiers(value: &str) -> Pairs {
    parse_pairs(value)
}

/// Encode modifiers as the same mini-map string.
pub fn encode_modifiers(modifiers: &[(String, String)]) -> String {
    encode_pairs(modifiers)
}

/// Render modifiers as a JSON object, keeping key order.
pub fn modifiers_json(modifiers: &[(String, String)]) -> String {
    let object: serde_json::Map<String, serde_json::Value> = modifiers
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect();
    serde_json::Value::Object(object).to_string()
}

/// Strip `base` from the front of `url`, leaving a root-relative path.
///
/// URLs that do not start with `base`, or an empty `base`, pass through.
pub fn trim_base_url(base: &str, url: &str) -> String {
    match url.strip_prefix(base) {
        Some(rest) if !base.is_empty() => {
            if rest.starts_with('/') {
                rest.to_string()
            } else {
                format!("/{rest}")
            }
        }
        _ => url.to_string(),
    }
}
