//! Output formatting

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CliError;

/// Output builder for formatted CLI output
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

    /// Add a string field to the output
    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    /// Add a u64 field to the output
    pub fn field_u64(mut self, key: &str, value: u64) -> Self {
        self.fields.insert(key.to_string(), Value::Number(value.into()));
        self
    }

    /// Add any serializable value as a field
    pub fn field_serialized<T: Serialize>(mut self, key: &str, value: &T) -> Result<Self, CliError> {
        self.fields.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    /// Append a line to the human-readable output
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Print the output
    pub fn print(self) {
        if self.json_mode {
            let json = Value::Object(self.fields);
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        } else {
            for line in self.lines {
                println!("{}", line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_keep_values() {
        let output = Output::new(true)
            .field("status", "ok")
            .field_u64("network", 33)
            .field_serialized("list", &vec![1, 2])
            .unwrap();
        assert_eq!(output.fields["status"], "ok");
        assert_eq!(output.fields["network"], 33);
        assert_eq!(output.fields["list"], serde_json::json!([1, 2]));
        assert!(output.lines.is_empty());
    }
}
