use super::ConversionRule;
use crate::types::RawValue;
use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]` mapped to a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRange {
    pub min: f64,
    pub max: f64,
    pub text: String,
}

/// What a text rule yields when no entry matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextFallback {
    Text(String),
    /// A nested conversion applied to the raw value.
    Rule(Box<ConversionRule>),
}

pub(super) fn lookup_text(entries: &[(f64, String)], raw: f64) -> Option<&str> {
    entries
        .iter()
        .find(|(key, _)| *key == raw)
        .map(|(_, text)| text.as_str())
}

pub(super) fn lookup_text_range(ranges: &[TextRange], raw: f64) -> Option<&str> {
    ranges
        .iter()
        .find(|r| raw >= r.min && raw <= r.max)
        .map(|r| r.text.as_str())
}

/// Without a default the raw value is rendered as text.
pub(super) fn fallback(default: Option<&TextFallback>, raw: &RawValue) -> RawValue {
    match default {
        Some(TextFallback::Text(text)) => RawValue::String(text.clone()),
        Some(TextFallback::Rule(rule)) => match rule.apply(raw) {
            RawValue::String(s) => RawValue::String(s),
            other => RawValue::String(format_value(&other)),
        },
        None => RawValue::String(format_value(raw)),
    }
}

pub(crate) fn format_value(value: &RawValue) -> String {
    match value {
        RawValue::UnsignedInteger(v) => v.to_string(),
        RawValue::SignedInteger(v) => v.to_string(),
        RawValue::Float(v) => v.to_string(),
        RawValue::String(s) => s.clone(),
        RawValue::ByteArray(b) => b.iter().map(|x| format!("{x:02X}")).collect(),
    }
}
