use percent_encoding::percent_encode_byte;
use serde_json::Value;

/// Characters that must never appear raw inside an emitted query
/// component, in addition to whitespace.
const RESERVED: &[char] = &['#', '&', '=', '?', '/', ';', ':', '@', '$', ','];

/// Canonical string form of a value, applied before percent-encoding.
///
/// Nulls become the empty string, scalars their display form, objects a
/// compact JSON rendering. Arrays are expanded one entry per element by
/// the href builder; one that still reaches this function is rendered as
/// JSON like any other structural value. A failing `Serialize`
/// implementation degrades to the empty string instead of propagating.
pub fn safe_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Percent-encodes `raw` for use as a query key, query value or fragment.
///
/// Stray `%` characters not followed by two hex digits are rewritten to
/// `%25` first, so valid triplets already present in `raw` survive
/// unchanged while malformed escapes can not reach the URL. Only
/// whitespace, the reserved set and `extra` are encoded.
pub fn encode_component(raw: &str, extra: &[char]) -> String {
    let raw = normalize_stray_percents(raw);
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch == '%' {
            out.push(ch);
        } else if ch.is_whitespace() || RESERVED.contains(&ch) || extra.contains(&ch) {
            let mut buf = [0u8; 4];
            for &b in ch.encode_utf8(&mut buf).as_bytes() {
                out.push_str(percent_encode_byte(b));
            }
        } else {
            out.push(ch);
        }
    }
    out
}

pub(crate) fn encode_pair(key: &str, value: &str, extra: &[char]) -> String {
    let mut out = encode_component(key, extra);
    out.push('=');
    out.push_str(&encode_component(value, extra));
    out
}

fn normalize_stray_percents(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    for (i, ch) in raw.char_indices() {
        if ch == '%' {
            let valid = bytes.get(i + 1).map_or(false, |b| b.is_ascii_hexdigit())
                && bytes.get(i + 2).map_or(false, |b| b.is_ascii_hexdigit());
            out.push_str(if valid { "%" } else { "%25" });
        } else {
            out.push(ch);
        }
    }
    out
}
