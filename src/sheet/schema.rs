//! Column schema description for generic tabular consumers.

use serde::Serialize;

/// Declared type of a column.
///
/// Text sources carry no type information, so every column is text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DeclaredType {
    #[default]
    Text,
}

/// Description of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    /// Header name, or the synthesized default name
    pub name: String,
    /// Zero-based position
    pub ordinal: usize,
    pub data_type: DeclaredType,
    /// Fields may be absent after recovery
    pub nullable: bool,
}

impl ColumnSchema {
    pub fn text(name: impl Into<String>, ordinal: usize) -> Self {
        ColumnSchema {
            name: name.into(),
            ordinal,
            data_type: DeclaredType::Text,
            nullable: true,
        }
    }
}
