//! kdsubsls canonicalization. Shared by the master loader and the geometry
//! scanner so both sides of the join normalize identically.

use crate::model::AnomalyReason;

/// Canonical code width.
pub const CODE_WIDTH: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCode {
    pub normalized: String,
    /// Trimmed input, or empty when the input was missing.
    pub original: String,
    pub anomaly: Option<AnomalyReason>,
}

/// Normalize a raw sub-area code.
///
/// Missing/empty and `"0"` become `"00"`. A single other character is
/// zero-padded and flagged `TooShort`. Anything longer than two characters
/// is kept verbatim and flagged `TooLong`.
pub fn normalize_code(raw: Option<&str>) -> NormalizedCode {
    let trimmed = raw.map(str::trim).unwrap_or("");

    if trimmed.is_empty() {
        return NormalizedCode {
            normalized: "00".into(),
            original: String::new(),
            anomaly: None,
        };
    }

    let len = trimmed.chars().count();
    let (normalized, anomaly) = if trimmed == "0" {
        ("00".to_string(), None)
    } else if len == 1 {
        (format!("{trimmed:0>CODE_WIDTH$}"), Some(AnomalyReason::TooShort))
    } else if len > CODE_WIDTH {
        (trimmed.to_string(), Some(AnomalyReason::TooLong))
    } else {
        (trimmed.to_string(), None)
    };

    NormalizedCode {
        normalized,
        original: trimmed.to_string(),
        anomaly,
    }
}
