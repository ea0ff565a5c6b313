use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single table row, always a JSON object.
pub type Row = Value;

pub type QueryResult<T> = Result<T, QueryError>;

const SESSION_MESSAGE_MARKERS: [&str; 4] = ["jwt", "token", "unauthorized", "unauthenticated"];
const SESSION_CODE_MARKERS: [&str; 3] = ["401", "jwt", "token"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryErrorKind {
    /// The backend answered with an error value.
    Response,
    /// The call itself failed before an answer was produced.
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{}", describe(.message, .code))]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub message: Option<String>,
    pub code: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

fn describe(message: &Option<String>, code: &Option<String>) -> String {
    let message = message.as_deref().unwrap_or("unknown backend error");
    match code {
        Some(code) => format!("{message} ({code})"),
        None => message.to_owned(),
    }
}

impl QueryError {
    pub fn response(message: impl Into<String>) -> Self {
        Self {
            kind: QueryErrorKind::Response,
            message: Some(message.into()),
            code: None,
            details: None,
            hint: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: QueryErrorKind::Transport,
            ..Self::response(message)
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn is_transport(&self) -> bool {
        self.kind == QueryErrorKind::Transport
    }

    /// Whether the error means the current auth session is invalid or expired.
    ///
    /// Matches case-insensitively on the message and the code. Transport
    /// failures never count, whatever their text says.
    pub fn is_session_error(&self) -> bool {
        if self.is_transport() {
            return false;
        }
        let message_hit = self.message.as_deref().is_some_and(|m| {
            let m = m.to_lowercase();
            SESSION_MESSAGE_MARKERS.iter().any(|p| m.contains(p))
        });
        let code_hit = self.code.as_deref().is_some_and(|c| {
            let c = c.to_lowercase();
            SESSION_CODE_MARKERS.iter().any(|p| c.contains(p))
        });
        message_hit || code_hit
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.column) == Some(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TableOp {
    Select {
        filters: Vec<Filter>,
        limit: Option<usize>,
    },
    Insert {
        rows: Vec<Row>,
    },
    Update {
        filters: Vec<Filter>,
        values: Map<String, Value>,
    },
    Delete {
        filters: Vec<Filter>,
    },
}

impl TableOp {
    pub fn name(&self) -> &'static str {
        match self {
            TableOp::Select { .. } => "select",
            TableOp::Insert { .. } => "insert",
            TableOp::Update { .. } => "update",
            TableOp::Delete { .. } => "delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_markers_are_case_insensitive() {
        assert!(QueryError::response("JWT expired").is_session_error());
        assert!(QueryError::response("Invalid Token").is_session_error());
        assert!(QueryError::response("request was UNAUTHORIZED").is_session_error());
        assert!(QueryError::response("Unauthenticated").is_session_error());
    }

    #[test]
    fn code_markers_are_matched() {
        let err = QueryError::response("permission denied").with_code("HTTP_401");
        assert!(err.is_session_error());
        let err = QueryError::response("bad request").with_code("invalid_JWT");
        assert!(err.is_session_error());
        let err = QueryError::response("bad request").with_code("refresh_token_not_found");
        assert!(err.is_session_error());
    }

    #[test]
    fn other_errors_pass_through() {
        let err = QueryError::response("row not found").with_code("PGRST116");
        assert!(!err.is_session_error());
        let err = QueryError::response("duplicate key value violates unique constraint")
            .with_code("23505");
        assert!(!err.is_session_error());
        let err = QueryError {
            message: None,
            ..QueryError::response("")
        };
        assert!(!err.is_session_error());
    }

    #[test]
    fn transport_errors_are_not_session_errors() {
        let err = QueryError::transport("connection reset while sending token");
        assert!(!err.is_session_error());
        assert!(err.is_transport());
    }

    #[test]
    fn display_includes_code() {
        let err = QueryError::response("row not found").with_code("PGRST116");
        assert_eq!(err.to_string(), "row not found (PGRST116)");
        assert_eq!(QueryError::response("boom").to_string(), "boom");
        let err = QueryError {
            message: None,
            ..QueryError::response("")
        };
        assert_eq!(err.to_string(), "unknown backend error");
    }

    #[test]
    fn filter_matches_on_equality() {
        let row = json!({ "status": "open", "score": 3 });
        assert!(Filter::eq("status", "open").matches(&row));
        assert!(Filter::eq("score", 3).matches(&row));
        assert!(!Filter::eq("status", "closed").matches(&row));
        assert!(!Filter::eq("owner", "ana").matches(&row));
    }
}
