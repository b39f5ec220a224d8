use serde_json::{Map, Value};

/// A validated metrics payload for one refresh cycle.
///
/// Only `validate::validate` builds one, so holding a `MetricsDataset` means every
/// section required by the active chart set is present.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsDataset {
    root: Map<String, Value>,
}

impl MetricsDataset {
    pub(crate) fn from_validated(root: Map<String, Value>) -> Self {
        Self { root }
    }

    pub fn section(&self, name: &str) -> Option<&Value> {
        self.root.get(name)
    }

    /// Looks up a nested value by JSON pointer, e.g. `/summary/pre_avg`.
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        let rest = path.strip_prefix('/')?;
        let (head, tail) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        let section = self.section(head)?;
        if tail.is_empty() {
            Some(section)
        } else {
            section.pointer(tail)
        }
    }

    pub fn number_at(&self, path: &str) -> f64 {
        self.pointer(path).map(coerce_number).unwrap_or(0.0)
    }

    pub fn text_at(&self, path: &str) -> Option<&str> {
        self.pointer(path).and_then(Value::as_str)
    }

    /// Generation stamp from either payload flavour.
    pub fn generated_at(&self) -> Option<&str> {
        self.text_at("/generated_at")
            .or_else(|| self.text_at("/metadata/generated_at_utc"))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }
}

/// Numeric coercion used by every projection: malformed values become 0.
pub fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                0.0
            } else {
                t.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Text coercion for category and department names.
pub fn coerce_label(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
