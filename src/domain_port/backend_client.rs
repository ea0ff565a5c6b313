use crate::domain_model::*;

/// Table-scoped CRUD against the hosted backend.
#[async_trait::async_trait]
pub trait TableClient: Send + Sync {
    async fn query(&self, table: &str, op: TableOp) -> QueryResult<Vec<Row>>;
}

/// Session accessor and refresher of the hosted backend's auth API.
#[async_trait::async_trait]
pub trait SessionClient: Send + Sync {
    async fn get_session(&self) -> QueryResult<Option<Session>>;
    /// Exchange the current refresh token for a new session.
    async fn refresh_session(&self) -> QueryResult<Option<Session>>;
}
