use serde::{Deserialize, Serialize};

/// Document styling configuration for declaration exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStyles {
    /// Font for body text (e.g. "Times New Roman", "Calibri").
    pub body_font: String,

    /// Body text font size in points.
    pub body_size: usize,

    /// Heading 1 font size in points (clinic name, document title).
    pub heading1_size: usize,

    /// Heading 2 font size in points (section titles).
    pub heading2_size: usize,

    /// Footer font size in points.
    pub footer_size: usize,

    /// Hex color for critical labels and the legal warning box.
    pub critical_color: String,

    /// Hex color for footer metadata.
    pub muted_color: String,
}

impl Default for DocumentStyles {
    fn default() -> Self {
        Self {
            body_font: "Times New Roman".to_string(),
            body_size: 11,
            heading1_size: 18,
            heading2_size: 14,
            footer_size: 9,
            critical_color: "e74c3c".to_string(),
            muted_color: "7f8c8d".to_string(),
        }
    }
}
