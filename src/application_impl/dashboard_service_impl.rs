use crate::application_port::DashboardService;
use crate::domain_model::*;
use crate::domain_port::TableClient;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Builds dashboard tiles by counting rows into buckets on the client.
pub struct RealDashboardService {
    tables: Arc<dyn TableClient>,
}

impl RealDashboardService {
    pub fn new(tables: Arc<dyn TableClient>) -> Self {
        Self { tables }
    }
}

#[async_trait::async_trait]
impl DashboardService for RealDashboardService {
    async fn tile(&self, spec: &TileSpec) -> QueryResult<Tile> {
        let rows = self
            .tables
            .query(
                &spec.table,
                TableOp::Select {
                    filters: Vec::new(),
                    limit: None,
                },
            )
            .await?;
        debug!(table = %spec.table, rows = rows.len(), "tallying tile");
        Ok(tally(spec, &rows))
    }

    async fn tiles(&self, specs: &[TileSpec]) -> QueryResult<Vec<Tile>> {
        let mut tiles = Vec::with_capacity(specs.len());
        for spec in specs {
            tiles.push(self.tile(spec).await?);
        }
        Ok(tiles)
    }
}

fn bucket_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Counts `rows` into the buckets declared by `spec`, in declared order.
pub fn tally(spec: &TileSpec, rows: &[Row]) -> Tile {
    let mut counts: Vec<BucketCount> = spec
        .buckets
        .iter()
        .map(|bucket| BucketCount {
            bucket: bucket.clone(),
            count: 0,
        })
        .collect();
    let mut other = 0;
    let mut missing = 0;

    for row in rows {
        let Some(value) = row.get(&spec.column).filter(|v| !v.is_null()) else {
            missing += 1;
            continue;
        };
        let slot = match bucket_key(value) {
            Some(key) => counts
                .iter_mut()
                .find(|c| c.bucket.eq_ignore_ascii_case(&key)),
            None => None,
        };
        match slot {
            Some(slot) => slot.count += 1,
            None => other += 1,
        }
    }

    Tile {
        title: spec.title.clone(),
        table: spec.table.clone(),
        column: spec.column.clone(),
        counts,
        other,
        missing,
        total: rows.len() as u64,
    }
}
