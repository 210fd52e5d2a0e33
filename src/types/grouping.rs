//! The dimension rows are bucketed by when computing grouped statistics.

use crate::types::measurement::{COL_COMMENTS, COL_REGION};
use serde::Serialize;
use std::fmt;

/// Which column a grouped view is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GroupingKey {
    /// Group by the free-text `Comments` column.
    ByComments,
    /// Group by the region key column.
    ByRegion,
}

impl GroupingKey {
    pub fn column_name(&self) -> &'static str {
        match self {
            GroupingKey::ByComments => COL_COMMENTS,
            GroupingKey::ByRegion => COL_REGION,
        }
    }
}

impl fmt::Display for GroupingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}
