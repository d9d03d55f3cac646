use serde::{Deserialize, Serialize};

/// Sort order for query results, always by document id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Asc,   // Ascending: oldest insert first
    Desc,  // Descending: newest insert first
}
