//! Common types for tabular values.

/// Value of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Absent or empty field
    Empty,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point number
    Float(f64),
    /// String value
    String(String),
}

impl CellValue {
    /// Wrap field text without interpretation.
    pub fn from_text(text: Option<&str>) -> Self {
        match text {
            None | Some("") => CellValue::Empty,
            Some(text) => CellValue::String(text.to_string()),
        }
    }

    /// Guess the type of field text: integer, then float, then boolean words,
    /// falling back to a string.
    pub fn infer(text: Option<&str>) -> Self {
        let Some(text) = text else {
            return CellValue::Empty;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        if let Ok(int_val) = atoi_simd::parse::<i64, true, true>(trimmed.as_bytes()) {
            return CellValue::Int(int_val);
        }
        if let Ok(float_val) = fast_float2::parse::<f64, _>(trimmed) {
            return CellValue::Float(float_val);
        }
        match trimmed.to_lowercase().as_str() {
            "true" | "yes" | "on" => CellValue::Bool(true),
            "false" | "no" | "off" => CellValue::Bool(false),
            _ => CellValue::String(text.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Text of a `String` value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::String(s) => f.write_str(s),
        }
    }
}
