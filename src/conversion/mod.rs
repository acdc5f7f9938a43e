//! Raw-to-physical value conversion.
//!
//! A [`ConversionRule`] is resolved once from the file (all referenced texts
//! and nested conversions already read) and is then evaluated per sample with
//! no I/O. Rules are serializable so that a column can carry its rule inside
//! the data model.

mod linear;
mod table_lookup;
mod text;

pub use linear::Formula;
pub use table_lookup::ValueRange;
pub use text::{TextFallback, TextRange};

use crate::types::RawValue;
use serde::{Deserialize, Serialize};

/// Maximum nesting of conversions referenced from other conversions.
pub const MAX_CONVERSION_DEPTH: usize = 20;

/// What kind of values a rule produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutput {
    /// Values pass through with their raw type.
    Raw,
    /// Values become `f64`.
    Numeric,
    /// Values become strings.
    Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversionRule {
    #[default]
    Identity,
    /// `offset + factor * raw`
    Linear { offset: f64, factor: f64 },
    /// `(p1 x² + p2 x + p3) / (p4 x² + p5 x + p6)`
    Rational { coefficients: [f64; 6] },
    /// Arithmetic expression in `X`.
    Algebraic { formula: Formula },
    /// Key/value pairs sorted by key; interpolated or nearest key.
    ValueTable {
        entries: Vec<(f64, f64)>,
        interpolate: bool,
    },
    ValueRangeTable { ranges: Vec<ValueRange>, default: f64 },
    /// Exact raw key to text.
    TextTable {
        entries: Vec<(f64, String)>,
        default: Option<TextFallback>,
    },
    /// First closed interval containing the raw value, in definition order.
    TextRangeTable {
        ranges: Vec<TextRange>,
        default: Option<TextFallback>,
    },
}

impl ConversionRule {
    pub fn is_identity(&self) -> bool {
        matches!(self, ConversionRule::Identity)
    }

    pub fn output(&self) -> RuleOutput {
        match self {
            ConversionRule::Identity => RuleOutput::Raw,
            ConversionRule::Linear { .. }
            | ConversionRule::Rational { .. }
            | ConversionRule::Algebraic { .. }
            | ConversionRule::ValueTable { .. }
            | ConversionRule::ValueRangeTable { .. } => RuleOutput::Numeric,
            ConversionRule::TextTable { .. } | ConversionRule::TextRangeTable { .. } => {
                RuleOutput::Text
            }
        }
    }

    /// Evaluate a numeric rule. Text rules and identity return `raw`.
    pub fn apply_f64(&self, raw: f64) -> f64 {
        match self {
            ConversionRule::Linear { offset, factor } => offset + factor * raw,
            ConversionRule::Rational { coefficients } => linear::rational(coefficients, raw),
            ConversionRule::Algebraic { formula } => formula.eval(raw).unwrap_or(raw),
            ConversionRule::ValueTable {
                entries,
                interpolate,
            } => table_lookup::lookup_table(entries, raw, *interpolate).unwrap_or(raw),
            ConversionRule::ValueRangeTable { ranges, default } => {
                table_lookup::lookup_range(ranges, raw).unwrap_or(*default)
            }
            ConversionRule::Identity
            | ConversionRule::TextTable { .. }
            | ConversionRule::TextRangeTable { .. } => raw,
        }
    }

    /// Convert one decoded raw value.
    ///
    /// Non-numeric raw values (strings, byte arrays) pass through unchanged
    /// since no rule is defined over them.
    pub fn apply(&self, raw: &RawValue) -> RawValue {
        let Some(x) = raw.as_f64() else {
            return raw.clone();
        };
        match self {
            ConversionRule::Identity => raw.clone(),
            ConversionRule::TextTable { entries, default } => {
                match text::lookup_text(entries, x) {
                    Some(t) => RawValue::String(t.to_string()),
                    None => text::fallback(default.as_ref(), raw),
                }
            }
            ConversionRule::TextRangeTable { ranges, default } => {
                match text::lookup_text_range(ranges, x) {
                    Some(t) => RawValue::String(t.to_string()),
                    None => text::fallback(default.as_ref(), raw),
                }
            }
            numeric => RawValue::Float(numeric.apply_f64(x)),
        }
    }

    /// Nesting depth of rules referenced through text defaults (1 for a flat rule).
    pub fn depth(&self) -> usize {
        match self {
            ConversionRule::TextTable {
                default: Some(TextFallback::Rule(inner)),
                ..
            }
            | ConversionRule::TextRangeTable {
                default: Some(TextFallback::Rule(inner)),
                ..
            } => 1 + inner.depth(),
            _ => 1,
        }
    }

    /// Store as JSON, the form used for the `conversion_rule` column attribute.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
