// PhraseSlot: one linear position of a sentence and its interchangeable
// surface variants (kanji form, kana form, synonyms, paraphrases, ...).

use std::collections::BTreeMap;

use crate::CoreError;
use crate::keyword::Keyword;

// ---------------------------------------------------------------------------
// Keyword position index
// ---------------------------------------------------------------------------

/// Where each keyword character occurs inside a slot's variants.
///
/// `positions[k][offset]` lists the indices of the variants that contain
/// keyword character `k` at character offset `offset`, in variant order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordPositions {
    positions: Vec<BTreeMap<usize, Vec<usize>>>,
}

impl KeywordPositions {
    /// Index every occurrence of every keyword character in `variants`.
    pub fn build(variants: &[Vec<char>], keyword: &Keyword) -> Self {
        let positions = keyword
            .chars()
            .iter()
            .map(|&kc| {
                let mut by_offset: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
                for (vi, variant) in variants.iter().enumerate() {
                    for (offset, &c) in variant.iter().enumerate() {
                        if c == kc {
                            by_offset.entry(offset).or_default().push(vi);
                        }
                    }
                }
                by_offset
            })
            .collect();
        Self { positions }
    }

    /// Variants holding keyword character `k_index` exactly at `offset`.
    pub fn at(&self, k_index: usize, offset: usize) -> &[usize] {
        self.positions
            .get(k_index)
            .and_then(|m| m.get(&offset))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether any variant contains keyword character `k_index` anywhere.
    pub fn contains(&self, k_index: usize) -> bool {
        self.positions.get(k_index).is_some_and(|m| !m.is_empty())
    }

    /// Number of keyword characters indexed.
    pub fn keyword_len(&self) -> usize {
        self.positions.len()
    }
}

// ---------------------------------------------------------------------------
// PhraseSlot
// ---------------------------------------------------------------------------

/// One position in the text with its candidate surface variants.
///
/// Built once per sentence and read-only during search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseSlot {
    /// Surface variants, as characters. Index 0 is the literal surface.
    variants: Vec<Vec<char>>,
    /// Length of the longest variant in characters.
    max_len: usize,
    /// Whether this slot must start on a new output line.
    newline: bool,
    /// Keyword character positions within the variants.
    positions: KeywordPositions,
}

impl PhraseSlot {
    /// Create a slot from its variants, indexing positions of `keyword`.
    ///
    /// Duplicate variants are kept: each is a distinct choice.
    pub fn new<S: AsRef<str>>(
        variants: &[S],
        newline: bool,
        keyword: &Keyword,
    ) -> Result<Self, CoreError> {
        if variants.is_empty() {
            return Err(CoreError::NoVariants);
        }
        let variants: Vec<Vec<char>> = variants
            .iter()
            .map(|v| v.as_ref().chars().collect())
            .collect();
        let max_len = variants.iter().map(Vec::len).max().unwrap_or(0);
        let positions = KeywordPositions::build(&variants, keyword);
        Ok(Self {
            variants,
            max_len,
            newline,
            positions,
        })
    }

    /// Number of variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Always `false` for a constructed slot.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Characters of variant `index`.
    pub fn variant(&self, index: usize) -> Result<&[char], CoreError> {
        self.variants
            .get(index)
            .map(Vec::as_slice)
            .ok_or(CoreError::VariantOutOfRange {
                index,
                len: self.variants.len(),
            })
    }

    /// All variants in order.
    pub fn variants(&self) -> impl Iterator<Item = &[char]> {
        self.variants.iter().map(Vec::as_slice)
    }

    /// Variant `index` as a string.
    pub fn variant_text(&self, index: usize) -> Result<String, CoreError> {
        Ok(self.variant(index)?.iter().collect())
    }

    /// The literal surface (first variant).
    pub fn surface(&self) -> String {
        self.variants[0].iter().collect()
    }

    /// Length of variant `index` in characters (0 if out of range).
    pub fn variant_len(&self, index: usize) -> usize {
        self.variants.get(index).map_or(0, Vec::len)
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn newline(&self) -> bool {
        self.newline
    }

    pub fn positions(&self) -> &KeywordPositions {
        &self.positions
    }

    /// Copy of this slot with a different newline flag.
    pub fn with_newline(&self, newline: bool) -> Self {
        Self {
            newline,
            ..self.clone()
        }
    }
}
