use crate::application_impl::SessionInterceptor;
use crate::domain_model::*;
use crate::domain_port::TableClient;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// A [`TableClient`] that sends every call through the [`SessionInterceptor`].
pub struct RetryingTableClient {
    inner: Arc<dyn TableClient>,
    interceptor: Arc<SessionInterceptor>,
}

impl RetryingTableClient {
    pub fn new(inner: Arc<dyn TableClient>, interceptor: Arc<SessionInterceptor>) -> Self {
        Self { inner, interceptor }
    }

    pub async fn select(&self, table: &str, filters: Vec<Filter>) -> QueryResult<Vec<Row>> {
        self.query(table, TableOp::Select { filters, limit: None })
            .await
    }

    pub async fn insert(&self, table: &str, rows: Vec<Row>) -> QueryResult<Vec<Row>> {
        self.query(table, TableOp::Insert { rows }).await
    }

    pub async fn update(
        &self,
        table: &str,
        filters: Vec<Filter>,
        values: Map<String, Value>,
    ) -> QueryResult<Vec<Row>> {
        self.query(table, TableOp::Update { filters, values })
            .await
    }

    pub async fn delete(&self, table: &str, filters: Vec<Filter>) -> QueryResult<Vec<Row>> {
        self.query(table, TableOp::Delete { filters }).await
    }
}

#[async_trait::async_trait]
impl TableClient for RetryingTableClient {
    async fn query(&self, table: &str, op: TableOp) -> QueryResult<Vec<Row>> {
        debug!(table, op = op.name(), "query");
        let inner = &self.inner;
        self.interceptor
            .execute(move || inner.query(table, op.clone()))
            .await
    }
}
