//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::role::ColumnRole;

/// Core library error type
///
/// The first three variants are the load outcomes a presentation layer must
/// distinguish; the rest are infrastructure failures.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unreadable file: {0}")]
    UnreadableFile(String),

    #[error("Missing columns: {}", join_roles(.missing))]
    MissingColumns {
        missing: Vec<ColumnRole>,
        detected: Vec<String>,
    },

    #[error("No rows with a valid date")]
    EmptyResult,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

fn join_roles(roles: &[ColumnRole]) -> String {
    roles
        .iter()
        .map(|r| r.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Create an unreadable file error
    pub fn unreadable(msg: impl Into<String>) -> Self {
        Self::UnreadableFile(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Error::UnreadableFile(_) => "unreadable_file",
            Error::MissingColumns { .. } => "missing_columns",
            Error::EmptyResult => "empty_result",
            Error::Validation(_) => "validation",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Other(_) => "other",
        }
    }

    /// True for the valid-but-empty outcome, which renders as a zero state
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Error::EmptyResult)
    }

    /// Structured context for reporting (missing roles and detected columns)
    pub fn context(&self) -> HashMap<String, serde_json::Value> {
        let mut context = HashMap::new();
        context.insert("code".to_string(), serde_json::Value::from(self.code()));
        if let Error::MissingColumns { missing, detected } = self {
            context.insert(
                "missing".to_string(),
                serde_json::Value::from(missing.iter().map(|r| r.label()).collect::<Vec<_>>()),
            );
            context.insert("detected".to_string(), serde_json::Value::from(detected.clone()));
        }
        context
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for `--json` output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail_with_context(e.to_string(), e.context()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_result_ok() {
        let result: OperationResult<i32> = OperationResult::ok(42);
        assert!(result.success);
        assert_eq!(result.data, Some(42));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_missing_columns_message_names_roles() {
        let err = Error::MissingColumns {
            missing: vec![ColumnRole::Installs, ColumnRole::Spend],
            detected: vec!["Date".to_string(), "Campaign Name".to_string()],
        };
        assert_eq!(err.to_string(), "Missing columns: Installs, Spend");
        assert_eq!(err.code(), "missing_columns");
    }

    #[test]
    fn test_from_result_carries_context() {
        let err: Result<i32> = Err(Error::MissingColumns {
            missing: vec![ColumnRole::Date],
            detected: vec!["Foo".to_string()],
        });
        let result: OperationResult<i32> = err.into();
        assert!(!result.success);

        let context = result.context.unwrap();
        assert_eq!(context["code"], "missing_columns");
        assert_eq!(context["missing"], serde_json::json!(["Date"]));
        assert_eq!(context["detected"], serde_json::json!(["Foo"]));
    }

    #[test]
    fn test_empty_result_is_flagged() {
        assert!(Error::EmptyResult.is_empty_result());
        assert!(!Error::validation("bad").is_empty_result());
    }
}
