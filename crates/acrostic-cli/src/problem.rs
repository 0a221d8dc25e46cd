// Problem files: the sentences to arrange, read from JSON.
//
// A problem file lists sentences in output order. Each sentence lists its
// slots in literal order, the attachment edges between them (`[dependent,
// head]` pairs), coordinate groups, and orderings known to be invalid.
// A sentence without `edges` and `groups` is kept in its literal order.
//
//     {
//       "width": 4,
//       "keywords": ["CAT"],
//       "sentences": [
//         { "slots": [ { "variants": ["C", "X"] }, { "variants": ["AT"] } ],
//           "edges": [[0, 1]] }
//       ]
//     }

use std::path::{Path, PathBuf};
use std::sync::Arc;

use acrostic_arrange::{
    ArrangeError, CoordinateGroup, DependencyGraph, GroupMember, OrderingFilter, RejectOrderings,
    SentenceInput, SlotInput,
};
use serde::{Deserialize, Serialize};

/// Error loading a problem or keyword file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("sentence {sentence}: {source}")]
    Sentence {
        sentence: usize,
        source: ArrangeError,
    },
}

/// A whole problem file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProblemFile {
    /// Render width; the command line may override it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    pub sentences: Vec<SentenceSpec>,
}

/// One sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SentenceSpec {
    pub slots: Vec<SlotSpec>,
    /// `[dependent, head]` pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<(usize, usize)>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Vec<GroupSpec>>,
    /// Orderings that must not be used.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reject: Vec<Vec<usize>>,
    /// `[a, b]`: no ordering may place slot `a` before slot `b`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forbid_before: Vec<(usize, usize)>,
}

/// One slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlotSpec {
    /// Surface variants, literal text first.
    pub variants: Vec<String>,
    #[serde(default)]
    pub newline: bool,
}

/// A coordinate group member: a slot index or a nested group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupSpec {
    Slot(usize),
    Group(Vec<GroupSpec>),
}

impl GroupSpec {
    fn member(&self) -> GroupMember {
        match self {
            GroupSpec::Slot(slot) => GroupMember::Slot(*slot),
            GroupSpec::Group(members) => GroupMember::Group(group(members)),
        }
    }
}

fn group(members: &[GroupSpec]) -> CoordinateGroup {
    CoordinateGroup::nested(members.iter().map(GroupSpec::member).collect())
}

impl SentenceSpec {
    /// Build the engine input for this sentence.
    pub fn to_input(&self) -> Result<SentenceInput, ArrangeError> {
        let slots = self
            .slots
            .iter()
            .map(|s| SlotInput::new(s.variants.iter().cloned(), s.newline))
            .collect();
        let groups: Vec<CoordinateGroup> = self.groups.iter().map(|g| group(g)).collect();
        let graph = if self.edges.is_some() || !groups.is_empty() {
            let edges = self.edges.as_deref().unwrap_or_default();
            Some(DependencyGraph::from_edges(self.slots.len(), edges)?)
        } else {
            None
        };

        let mut reject = RejectOrderings::new();
        for order in &self.reject {
            reject = reject.reject(order.clone());
        }
        for &(a, b) in &self.forbid_before {
            reject = reject.forbid_before(a, b);
        }
        let filter = if reject.is_empty() {
            None
        } else {
            Some(Arc::new(reject) as Arc<dyn OrderingFilter>)
        };

        Ok(SentenceInput {
            slots,
            graph,
            groups,
            filter,
        })
    }
}

impl ProblemFile {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Engine input for every sentence, in file order.
    pub fn inputs(&self) -> Result<Vec<SentenceInput>, LoadError> {
        self.sentences
            .iter()
            .enumerate()
            .map(|(sentence, s)| s.to_input().map_err(|source| LoadError::Sentence { sentence, source }))
            .collect()
    }
}

/// Read keywords from a file, one per line. Blank lines and lines starting
/// with `#` are skipped.
pub fn load_keywords(path: &Path) -> Result<Vec<String>, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_keywords(&contents))
}

fn parse_keywords(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect()
}
