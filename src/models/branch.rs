//! Branch selection and the branch filter parameter derived from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ordered set of selected branch ids, first-seen order preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BranchSelection(Vec<u32>);

impl BranchSelection {
    pub fn new(ids: impl IntoIterator<Item = u32>) -> Self {
        let mut selected = Vec::new();
        for id in ids {
            if !selected.contains(&id) {
                selected.push(id);
            }
        }
        Self(selected)
    }

    pub fn ids(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve the selection into the filter sent to the backend.
    ///
    /// Zero and exactly two selected branches both mean "all branches".
    /// The two-branch collapse mirrors the mobile client and is kept until
    /// the backend owners confirm the intended rule.
    pub fn resolve(&self) -> BranchFilter {
        match self.0.as_slice() {
            [] | [_, _] => BranchFilter::All,
            [id] => BranchFilter::Single(*id),
            ids => BranchFilter::Many(ids.to_vec()),
        }
    }
}

impl FromStr for BranchSelection {
    type Err = String;

    /// Parse a comma-separated id list such as `"3,7,9"`. Blank input is empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ids = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| format!("invalid branch id: {part}"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(ids))
    }
}

/// Effective branch filter for a backend query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchFilter {
    All,
    Single(u32),
    Many(Vec<u32>),
}

impl BranchFilter {
    /// Value of the `Branch_Id` query parameter; empty for no filter.
    pub fn as_param(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BranchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => Ok(()),
            Self::Single(id) => write!(f, "{id}"),
            Self::Many(ids) => {
                let joined = ids
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                f.write_str(&joined)
            }
        }
    }
}
