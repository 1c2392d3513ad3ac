//! Output formatting

use serde::Serialize;
use serde_json::{Map, Value};

/// Output builder: human-readable lines, or one JSON object with `--json`
pub struct Output {
    json_mode: bool,
    fields: Map<String, Value>,
    lines: Vec<String>,
}

impl Output {
    /// Create a new output builder
    pub fn new(json_mode: bool) -> Self {
        Self {
            json_mode,
            fields: Map::new(),
            lines: Vec::new(),
        }
    }

    /// Add a string field
    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    /// Add a u64 field
    pub fn field_u64(mut self, key: &str, value: u64) -> Self {
        self.fields.insert(key.to_string(), Value::Number(value.into()));
        self
    }

    /// Add any serializable value; skipped if it cannot be represented
    pub fn field_value<T: Serialize>(mut self, key: &str, value: &T) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.fields.insert(key.to_string(), value);
        }
        self
    }

    /// Merge every top-level field of a serializable object
    pub fn fields_of<T: Serialize>(mut self, value: &T) -> Self {
        if let Ok(Value::Object(map)) = serde_json::to_value(value) {
            self.fields.extend(map);
        }
        self
    }

    /// Append a human-readable line
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Render without printing
    pub fn render(&self) -> String {
        if self.json_mode {
            serde_json::to_string_pretty(&self.fields).unwrap_or_default()
        } else {
            self.lines.join("\n")
        }
    }

    /// Print the output
    pub fn print(self) {
        let rendered = self.render();
        if !rendered.is_empty() {
            println!("{rendered}");
        }
    }
}
