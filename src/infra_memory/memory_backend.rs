use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid seed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("table {table}: row {index} is not an object")]
    NotAnObject { table: String, index: usize },
}

/// In-process stand-in for the hosted backend.
///
/// Holds one signed-in session and a set of tables. Queries require a session
/// with an unexpired access token, like a row-level-security backend would.
pub struct MemoryBackend {
    tables: DashMap<String, Vec<Row>>,
    session: Mutex<Option<Session>>,
    refresh_revoked: Mutex<bool>,
    access_ttl: Duration,
}

impl MemoryBackend {
    pub fn new(access_ttl: std::time::Duration) -> Self {
        Self {
            tables: DashMap::new(),
            session: Mutex::new(None),
            refresh_revoked: Mutex::new(false),
            access_ttl: Duration::from_std(access_ttl).unwrap_or_else(|_| Duration::hours(1)),
        }
    }

    fn issue_session(&self, user_id: UserId, email: &str) -> Session {
        Session {
            user_id,
            email: email.to_owned(),
            access_token: AccessToken(nanoid::nanoid!(32)),
            refresh_token: RefreshToken(nanoid::nanoid!(16)),
            expires_at: Utc::now() + self.access_ttl,
        }
    }

    pub fn sign_in(&self, email: &str) -> Session {
        let user_id = UserId(uuid::Uuid::new_v4());
        let session = self.issue_session(user_id, email);
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        *self.refresh_revoked.lock().unwrap_or_else(PoisonError::into_inner) = false;
        info!(%user_id, email, "signed in");
        session
    }

    pub fn sign_out(&self) {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Backdates the access token so the next query fails with an expired JWT.
    pub fn expire_access_token(&self) {
        if let Some(session) = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            session.expires_at = Utc::now() - Duration::seconds(1);
        }
    }

    pub fn revoke_refresh_token(&self) {
        *self.refresh_revoked.lock().unwrap_or_else(PoisonError::into_inner) = true;
    }

    pub fn seed(&self, table: &str, rows: Vec<Row>) {
        self.tables.entry(table.to_owned()).or_default().extend(rows);
    }

    pub fn seed_from_json(&self, json: &str) -> Result<usize, SeedError> {
        let tables: HashMap<String, Vec<Value>> = serde_json::from_str(json)?;
        let mut seeded = 0;
        for (table, rows) in tables {
            if let Some(index) = rows.iter().position(|r| !r.is_object()) {
                return Err(SeedError::NotAnObject { table, index });
            }
            seeded += rows.len();
            self.seed(&table, rows);
        }
        Ok(seeded)
    }

    pub fn seed_from_file(&self, path: impl AsRef<Path>) -> Result<usize, SeedError> {
        let json = std::fs::read_to_string(path)?;
        self.seed_from_json(&json)
    }

    fn authorize(&self) -> QueryResult<()> {
        let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        match session.as_ref() {
            None => Err(QueryError::response("unauthorized: no active session")
                .with_code("401")
                .with_hint("sign in before querying")),
            Some(s) if s.is_expired_at(Utc::now()) => Err(QueryError::response("JWT expired")
                .with_code("PGRST301")
                .with_details(format!("access token expired at {}", s.expires_at.to_rfc3339()))),
            Some(_) => Ok(()),
        }
    }

    fn run(&self, table: &str, op: TableOp) -> Vec<Row> {
        let matches_all = |filters: &[Filter], row: &Row| filters.iter().all(|f| f.matches(row));
        match op {
            TableOp::Select { filters, limit } => {
                let Some(rows) = self.tables.get(table) else {
                    return Vec::new();
                };
                rows.iter()
                    .filter(|row| matches_all(&filters, row))
                    .take(limit.unwrap_or(usize::MAX))
                    .cloned()
                    .collect()
            }
            TableOp::Insert { rows } => {
                let rows: Vec<Row> = rows
                    .into_iter()
                    .map(|mut row| {
                        if let Some(obj) = row.as_object_mut() {
                            obj.entry("id")
                                .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
                        }
                        row
                    })
                    .collect();
                self.tables
                    .entry(table.to_owned())
                    .or_default()
                    .extend(rows.iter().cloned());
                rows
            }
            TableOp::Update { filters, values } => {
                let Some(mut rows) = self.tables.get_mut(table) else {
                    return Vec::new();
                };
                let mut updated = Vec::new();
                for row in rows.iter_mut().filter(|row| matches_all(&filters, row)) {
                    if let Some(obj) = row.as_object_mut() {
                        apply(obj, &values);
                    }
                    updated.push(row.clone());
                }
                updated
            }
            TableOp::Delete { filters } => {
                let Some(mut rows) = self.tables.get_mut(table) else {
                    return Vec::new();
                };
                let (deleted, kept): (Vec<Row>, Vec<Row>) = std::mem::take(&mut *rows)
                    .into_iter()
                    .partition(|row| matches_all(&filters, row));
                *rows = kept;
                deleted
            }
        }
    }
}

fn apply(row: &mut Map<String, Value>, values: &Map<String, Value>) {
    for (column, value) in values {
        row.insert(column.clone(), value.clone());
    }
}

#[async_trait::async_trait]
impl TableClient for MemoryBackend {
    async fn query(&self, table: &str, op: TableOp) -> QueryResult<Vec<Row>> {
        self.authorize()?;
        let name = op.name();
        let rows = self.run(table, op);
        debug!(table, op = name, rows = rows.len(), "memory query");
        Ok(rows)
    }
}

#[async_trait::async_trait]
impl SessionClient for MemoryBackend {
    async fn get_session(&self) -> QueryResult<Option<Session>> {
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn refresh_session(&self) -> QueryResult<Option<Session>> {
        let revoked = *self.refresh_revoked.lock().unwrap_or_else(PoisonError::into_inner);
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        match session.as_ref() {
            Some(current) if !revoked => {
                let rotated = self.issue_session(current.user_id, &current.email);
                *session = Some(rotated.clone());
                Ok(Some(rotated))
            }
            _ => Err(
                QueryError::response("Invalid Refresh Token: Refresh Token Not Found")
                    .with_code("refresh_token_not_found")
                    .with_hint("sign in again"),
            ),
        }
    }
}
