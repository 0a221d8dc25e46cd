//! Shared value types for acrostic text arrangement.
//!
//! An acrostic arrangement lays a sequence of phrases into a grid of fixed
//! width so that a keyword can be read vertically, one character per row,
//! down a single column. This crate holds the types shared by the search
//! engine and its callers:
//!
//! - [`keyword`] -- the target character sequence
//! - [`slot`] -- phrase slots with their surface variants and keyword index
//! - [`grid`] -- grid positions, the lazy write cursor, and rendered grids
//! - [`result`] -- accepted arrangements and their provenance

pub mod grid;
pub mod keyword;
pub mod result;
pub mod slot;

pub use grid::{Cursor, Grid, Position};
pub use keyword::Keyword;
pub use result::{ArrangeResult, Branch, Choice};
pub use slot::{KeywordPositions, PhraseSlot};

/// Error type for invalid values passed to the shared constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("keyword must contain at least one character")]
    EmptyKeyword,
    #[error("width must be at least 1, got {0}")]
    InvalidWidth(usize),
    #[error("phrase slot has no surface variants")]
    NoVariants,
    #[error("variant index {index} out of range for slot with {len} variants")]
    VariantOutOfRange { index: usize, len: usize },
}

/// Validate a render width.
pub fn check_width(width: usize) -> Result<usize, CoreError> {
    if width == 0 {
        return Err(CoreError::InvalidWidth(width));
    }
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_width_is_rejected() {
        assert_eq!(check_width(0), Err(CoreError::InvalidWidth(0)));
        assert_eq!(check_width(12), Ok(12));
    }
}
