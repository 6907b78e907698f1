// Response rendering for `grafana-api`: raw passthrough, or pretty JSON
// with sorted keys and non-ASCII characters escaped as `\uXXXX`.

use serde_json::{Map, Value};

/// Bytes to print for a successful response.
///
/// With `raw` the body passes through untouched. Otherwise a JSON body is
/// pretty-printed with sorted keys and ASCII-only output; anything that is
/// not JSON falls back to the raw bytes.
pub fn render_response(body: &[u8], raw: bool) -> Vec<u8> {
    if raw {
        return body.to_vec();
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => match serde_json::to_string_pretty(&sort_keys(value)) {
            Ok(pretty) => {
                let mut out = escape_non_ascii(&pretty);
                out.push('\n');
                out.into_bytes()
            }
            Err(_) => body.to_vec(),
        },
        Err(_) => body.to_vec(),
    }
}

/// Escape every non-ASCII character as `\uXXXX` (UTF-16 units, so astral
/// characters become a surrogate pair). Serialized JSON only carries
/// non-ASCII text inside string literals, so this keeps it valid.
fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}

/// Rebuild objects with keys in lexicographic order, recursively.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, sort_keys(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
