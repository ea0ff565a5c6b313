use serde::{Deserialize, Serialize};

/// Describes one dashboard tile: count the rows of `table` by the value of `column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSpec {
    pub title: String,
    pub table: String,
    pub column: String,
    pub buckets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount {
    pub bucket: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub title: String,
    pub table: String,
    pub column: String,
    pub counts: Vec<BucketCount>,
    /// Rows carrying a value outside the declared buckets.
    pub other: u64,
    /// Rows without the column, or with a null value.
    pub missing: u64,
    pub total: u64,
}

impl Tile {
    pub fn count(&self, bucket: &str) -> Option<u64> {
        self.counts
            .iter()
            .find(|c| c.bucket.eq_ignore_ascii_case(bucket))
            .map(|c| c.count)
    }
}
