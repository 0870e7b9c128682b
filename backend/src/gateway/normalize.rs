//! Normalization of loosely shaped gateway responses.
//!
//! The gateway wraps result sets differently depending on the procedure and
//! driver (`{data: [...]}`, `{recordset: [...]}`, `{data: {records: [...]}}`,
//! ...). These two functions are the only places that know the candidate
//! fields and their precedence.

use serde_json::Value;

/// Fields probed for an id, in order, after the top-level key.
const ID_CANDIDATES: [&str; 5] = ["data", "recordset", "records", "result", "results"];

/// Returns the result rows of a gateway response.
///
/// Precedence: `data` (array), `data.recordset`, `data.records`, `recordset`,
/// `records`, `result`, `results`. The first candidate that is an array wins;
/// when none is, the response has no rows.
pub fn extract_rows(response: &Value) -> Vec<Value> {
    let data = response.get("data");
    let candidates = [
        data,
        data.and_then(|d| d.get("recordset")),
        data.and_then(|d| d.get("records")),
        response.get("recordset"),
        response.get("records"),
        response.get("result"),
        response.get("results"),
    ];

    candidates
        .into_iter()
        .flatten()
        .find_map(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Finds a numeric id named `key` in a gateway response.
///
/// `response[key]` is used when it is a number or a numeric string.
/// Otherwise each of `data`, `recordset`, `records`, `result`, `results` is
/// tried in order: a non-empty array contributes its first element's `key`,
/// an object is searched recursively.
pub fn extract_id(response: &Value, key: &str) -> Option<i64> {
    let object = response.as_object()?;

    if let Some(id) = object.get(key).and_then(as_id) {
        return Some(id);
    }

    for field in ID_CANDIDATES {
        match object.get(field) {
            Some(Value::Array(items)) => {
                if let Some(id) = items.first().and_then(|first| first.get(key)).and_then(as_id) {
                    return Some(id);
                }
            }
            Some(nested @ Value::Object(_)) => {
                if let Some(id) = extract_id(nested, key) {
                    return Some(id);
                }
            }
            _ => {}
        }
    }

    None
}

fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => {
            let parsed = s.trim().parse::<f64>().ok()?;
            (parsed.fract() == 0.0).then_some(parsed as i64)
        }
        _ => None,
    }
}
