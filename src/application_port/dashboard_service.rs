use crate::domain_model::*;

#[async_trait::async_trait]
pub trait DashboardService: Send + Sync {
    async fn tile(&self, spec: &TileSpec) -> QueryResult<Tile>;
    async fn tiles(&self, specs: &[TileSpec]) -> QueryResult<Vec<Tile>>;
}
