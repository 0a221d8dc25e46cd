// Keyword: the character sequence read vertically down one grid column.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// The target character sequence of an acrostic.
///
/// Character `i` of the keyword is matched on grid row `i` when length
/// matching is required. Always holds at least one character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Keyword {
    chars: Vec<char>,
}

impl Keyword {
    /// Create a keyword from text. Surrounding whitespace is trimmed.
    pub fn new(text: &str) -> Result<Self, CoreError> {
        let chars: Vec<char> = text.trim().chars().collect();
        if chars.is_empty() {
            return Err(CoreError::EmptyKeyword);
        }
        Ok(Self { chars })
    }

    /// The keyword characters in reading order.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Number of characters (and, with length matching, grid rows).
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Character at keyword position `index`.
    pub fn get(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// Index of the last keyword character.
    pub fn last_index(&self) -> usize {
        self.chars.len() - 1
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Keyword {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Keyword::new(&value)
    }
}

impl From<Keyword> for String {
    fn from(value: Keyword) -> Self {
        value.to_string()
    }
}
