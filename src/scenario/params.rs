//! Parameter editing: format tags, text coercion, and the three local edit
//! operations (update, delete, add) applied to a step's parameter map.
//!
//! Coercion is the only validation the panel performs. Numbers follow the
//! browser's `Number(text)` conversion.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::Params;

/// Largest integer an `f64` holds exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

// ---------------------------------------------------------------------------
// Format tags
// ---------------------------------------------------------------------------

/// The format an existing parameter had when its row was rendered.
///
/// Confirming an edited row re-parses the input text according to this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamFormat {
    /// Objects, arrays and `null`: edited as JSON text.
    Object,
    String,
    Number,
    /// Booleans render but have no parser; confirming leaves them unchanged.
    Boolean,
}

impl ParamFormat {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Object(_) | Value::Array(_) | Value::Null => Self::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Parse input text into a value. `Ok(None)` means the format has no
    /// parser and the stored value must stay as it is.
    pub fn parse(self, text: &str) -> Result<Option<Value>> {
        match self {
            Self::Object => parse_json(text).map(Some),
            Self::String => Ok(Some(Value::String(text.to_string()))),
            Self::Number => Ok(Some(coerce_number(text))),
            Self::Boolean => Ok(None),
        }
    }
}

impl fmt::Display for ParamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type chosen in the add-new-parameter row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewParamKind {
    #[default]
    Json,
    Str,
    Num,
}

impl NewParamKind {
    pub const ALL: [Self; 3] = [Self::Json, Self::Str, Self::Num];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Str => "str",
            Self::Num => "num",
        }
    }

    pub fn parse(self, text: &str) -> Result<Value> {
        match self {
            Self::Json => parse_json(text),
            Self::Str => Ok(Value::String(text.to_string())),
            Self::Num => Ok(coerce_number(text)),
        }
    }
}

impl fmt::Display for NewParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewParamKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "str" | "string" => Ok(Self::Str),
            "num" | "number" => Ok(Self::Num),
            other => Err(format!("unknown parameter type '{other}' (json, str, num)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Edits
// ---------------------------------------------------------------------------

/// One local mutation of a step's parameter map.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamEdit {
    /// Overwrite `param` with `text` parsed per the row's captured format.
    Update {
        param: String,
        format: ParamFormat,
        text: String,
    },
    Delete {
        param: String,
    },
    /// Insert `param` with `text` parsed per the selected type.
    Add {
        param: String,
        kind: NewParamKind,
        text: String,
    },
}

impl ParamEdit {
    /// Apply the edit in place. Parsing happens before any mutation, so an
    /// error leaves `params` untouched.
    pub fn apply(&self, params: &mut Params) -> Result<()> {
        match self {
            Self::Update {
                param,
                format,
                text,
            } => {
                let parsed = format
                    .parse(text)
                    .with_context(|| format!("invalid value for '{param}'"))?;
                if let Some(value) = parsed {
                    params.insert(param.clone(), value);
                }
            }
            Self::Delete { param } => {
                params.shift_remove(param);
            }
            Self::Add { param, kind, text } => {
                let value = kind
                    .parse(text)
                    .with_context(|| format!("invalid value for new parameter '{param}'"))?;
                params.insert(param.clone(), value);
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

fn parse_json(text: &str) -> Result<Value> {
    serde_json::from_str(text).context("value is not valid JSON")
}

/// Convert text to a JSON number the way a browser's `Number(text)` does.
///
/// NaN and the infinities have no JSON form and become `null`, which is what
/// the browser would have sent. Integral results are stored as integers.
pub fn coerce_number(text: &str) -> Value {
    let n = js_number(text);
    if !n.is_finite() {
        return Value::Null;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

fn js_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let prefixed = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)];
    for (prefix, radix) in prefixed {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_alphanumeric()) {
                return f64::NAN;
            }
            return u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
        }
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    // Rust accepts "inf" and "NaN" spellings that the browser rejects.
    if trimmed
        .bytes()
        .any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E')
    {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Text shown in a parameter's input: JSON for objects, arrays and `null`,
/// the plain string form for everything else.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => display_number(n),
        Value::Object(_) | Value::Array(_) | Value::Null => value.to_string(),
    }
}

fn display_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => format!("{}", f as i64),
        Some(f) => format!("{f}"),
        None => n.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
