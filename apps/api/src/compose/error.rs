use serde::Serialize;
use thiserror::Error;

use crate::models::quotation::SectionKey;

/// Errors surfaced by the composition engine.
///
/// Missing dimensions are deliberately absent: they are reported as
/// `MissingDimension` values alongside a successful result.
#[derive(Debug, Error)]
pub enum CompositionError {
    /// User-visible input problem. `group` and `option` are 1-based.
    #[error("tank {group}, option {option}: invalid {field}: {message}")]
    Validation {
        group: usize,
        option: usize,
        field: &'static str,
        message: String,
    },

    /// An enabled section has neither caller content nor a usable default.
    #[error("section '{}' could not be resolved", .section.as_str())]
    SectionResolution { section: SectionKey },

    #[error("composition failed: {0}")]
    Failure(String),
}

/// Position of one option inside the quotation, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionLoc {
    pub group: usize,
    pub option: usize,
}

impl OptionLoc {
    pub fn invalid(&self, field: &'static str, message: impl Into<String>) -> CompositionError {
        CompositionError::Validation {
            group: self.group,
            option: self.option,
            field,
            message: message.into(),
        }
    }
}

/// A dimension that was left empty. Geometry derived from it is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MissingDimension {
    pub group: usize,
    pub option: usize,
    pub field: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_location() {
        let err = OptionLoc { group: 2, option: 3 }.invalid("length", "not a number: 'abc'");
        assert_eq!(
            err.to_string(),
            "tank 2, option 3: invalid length: not a number: 'abc'"
        );
    }

    #[test]
    fn test_section_resolution_message() {
        let err = CompositionError::SectionResolution {
            section: SectionKey::Terms,
        };
        assert_eq!(err.to_string(), "section 'terms' could not be resolved");
    }
}
