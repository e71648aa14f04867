//! Dotted path lookups into JSON responses.
//!
//! Paths use `.` between object keys and `[n]` for array indices, for
//! example `company.members[0].person.name`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d+)\]|([^.\[\]]+)").expect("valid segment regex")
});

/// Value at `path`, or `None` when any segment is missing or the value is `null`.
pub fn extract<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.trim().is_empty() {
        return None;
    }

    let mut current = value;
    for caps in SEGMENT.captures_iter(path) {
        current = if let Some(index) = caps.get(1) {
            let index: usize = index.as_str().parse().ok()?;
            current.as_array()?.get(index)?
        } else {
            let key = caps.get(2)?.as_str().trim();
            if key.is_empty() {
                continue;
            }
            current.as_object()?.get(key)?
        };
    }

    (!current.is_null()).then_some(current)
}

/// String at `path`. Numbers are rendered; anything else reads as `""`.
pub fn extract_string(value: &Value, path: &str) -> String {
    match extract(value, path) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Boolean at `path`, if it is one.
pub fn extract_bool(value: &Value, path: &str) -> Option<bool> {
    extract(value, path).and_then(Value::as_bool)
}

/// Array at `path`, or an empty slice.
pub fn extract_array<'a>(value: &'a Value, path: &str) -> &'a [Value] {
    extract(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "establishment": {
                "cnpj": "123456",
                "registrations": [
                    {"state": "SP", "number": "111222333"},
                    {"state": "PR", "number": "999888777"}
                ]
            },
            "name": "Empresa Teste",
            "capital": 1500,
            "closed": null
        })
    }

    #[test]
    fn follows_keys_and_indices() {
        let data = sample();
        assert_eq!(
            extract_string(&data, "establishment.registrations[0].number"),
            "111222333"
        );
        assert_eq!(extract_string(&data, "establishment.registrations[1].state"), "PR");
        assert_eq!(extract_string(&data, "name"), "Empresa Teste");
    }

    #[test]
    fn missing_paths_fall_back() {
        let data = sample();
        assert_eq!(extract_string(&data, "establishment.city"), "");
        assert_eq!(extract_string(&data, "establishment.registrations[2].state"), "");
        assert!(extract(&data, "missing").is_none());
        assert!(extract(&data, "").is_none());
    }

    #[test]
    fn null_reads_as_missing() {
        assert!(extract(&sample(), "closed").is_none());
    }

    #[test]
    fn indexing_a_non_array_fails() {
        assert!(extract(&sample(), "name[0]").is_none());
        assert!(extract(&sample(), "establishment.registrations.state").is_none());
    }

    #[test]
    fn numbers_render_as_strings() {
        assert_eq!(extract_string(&sample(), "capital"), "1500");
    }

    #[test]
    fn typed_helpers() {
        let data = json!({"simples": {"optant": true}, "members": [1, 2]});
        assert_eq!(extract_bool(&data, "simples.optant"), Some(true));
        assert_eq!(extract_bool(&data, "simples"), None);
        assert_eq!(extract_array(&data, "members").len(), 2);
        assert!(extract_array(&data, "partners").is_empty());
    }
}
