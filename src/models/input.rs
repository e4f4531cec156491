use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named numeric/categorical fields submitted to an advisory service.
///
/// Only the presence of required keys is checked (`ensure_present`);
/// values are not range-checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionInput(Map<String, Value>);

impl PredictionInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(v) if !v.is_null())
    }

    /// Fail with the list of every missing key
    pub fn ensure_present(&self, keys: &[&str]) -> Result<()> {
        let missing: Vec<&str> = keys.iter().copied().filter(|k| !self.contains(k)).collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// Numeric field. Numeric strings are accepted.
    pub fn number(&self, key: &str) -> Result<f64> {
        match self.0.get(key) {
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| AppError::Validation(format!("Field '{}' is not a finite number", key))),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| AppError::Validation(format!("Field '{}' is not a number: {}", key, s))),
            Some(Value::Null) | None => Err(AppError::Validation(format!("Missing field '{}'", key))),
            Some(other) => Err(AppError::Validation(format!(
                "Field '{}' must be a number, got {}",
                key, other
            ))),
        }
    }

    pub fn number_or(&self, key: &str, default: f64) -> Result<f64> {
        if self.contains(key) {
            self.number(key)
        } else {
            Ok(default)
        }
    }

    pub fn text(&self, key: &str) -> Result<String> {
        match self.0.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Null) | None => Err(AppError::Validation(format!("Missing field '{}'", key))),
            Some(other) => Err(AppError::Validation(format!(
                "Field '{}' must be a string, got {}",
                key, other
            ))),
        }
    }

    /// Non-empty text field, `None` when absent or unusable
    pub fn text_opt(&self, key: &str) -> Option<String> {
        self.text(key).ok().filter(|s| !s.trim().is_empty())
    }

    /// Boolean field. Accepts JSON booleans, 0/1 and the usual form strings.
    pub fn flag(&self, key: &str) -> Result<bool> {
        match self.0.get(key) {
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::Number(n)) => Ok(n.as_f64().map(|v| v != 0.0).unwrap_or(false)),
            Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" | "oui" => Ok(true),
                "false" | "0" | "no" | "off" | "non" | "" => Ok(false),
                other => Err(AppError::Validation(format!(
                    "Field '{}' is not a boolean: {}",
                    key, other
                ))),
            },
            Some(Value::Null) | None => Err(AppError::Validation(format!("Missing field '{}'", key))),
            Some(other) => Err(AppError::Validation(format!(
                "Field '{}' must be a boolean, got {}",
                key, other
            ))),
        }
    }

    pub fn flag_or(&self, key: &str, default: bool) -> Result<bool> {
        if self.contains(key) {
            self.flag(key)
        } else {
            Ok(default)
        }
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for PredictionInput {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> PredictionInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_ensure_present_lists_missing_keys() {
        let input = parse(json!({"temperature": 28.5, "humidity": null}));
        let err = input
            .ensure_present(&["temperature", "humidity", "rainfall"])
            .unwrap_err();

        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("humidity, rainfall"));
        assert!(input.ensure_present(&["temperature"]).is_ok());
    }

    #[test]
    fn test_number_accepts_numeric_strings() {
        let input = parse(json!({"a": 1200, "b": "6.5", "c": "abc", "d": true}));
        assert_eq!(input.number("a").unwrap(), 1200.0);
        assert_eq!(input.number("b").unwrap(), 6.5);
        assert!(input.number("c").is_err());
        assert!(input.number("d").is_err());
        assert!(input.number("missing").is_err());
    }

    #[test]
    fn test_flag_variants() {
        let input = parse(json!({"a": true, "b": 0, "c": "on", "d": "maybe"}));
        assert!(input.flag("a").unwrap());
        assert!(!input.flag("b").unwrap());
        assert!(input.flag("c").unwrap());
        assert!(input.flag("d").is_err());
        assert!(!input.flag_or("missing", false).unwrap());
    }

    #[test]
    fn test_text_opt_skips_blank_values() {
        let input = parse(json!({"user_id": "amina", "blank": "  ", "n": 7}));
        assert_eq!(input.text_opt("user_id").as_deref(), Some("amina"));
        assert_eq!(input.text_opt("n").as_deref(), Some("7"));
        assert!(input.text_opt("blank").is_none());
        assert!(input.text_opt("missing").is_none());
    }

    #[test]
    fn test_defaults_only_apply_when_absent() {
        let input = PredictionInput::new().with("fertilizer_npk", "lots");
        assert!(input.number_or("fertilizer_npk", 0.0).is_err());
        assert_eq!(input.number_or("other", 3.0).unwrap(), 3.0);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let input = PredictionInput::new().with("crop", "Maïs").with("area_hectares", 2.5);
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value, json!({"crop": "Maïs", "area_hectares": 2.5}));
        assert_eq!(input.as_value(), value);
    }
}
