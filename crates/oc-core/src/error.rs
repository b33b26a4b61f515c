//! Core error types for the Ops Console
//!
//! Fetch failures come from the engine collaborator and are passed through
//! untouched. Schema problems are collected per filter id.

use std::collections::BTreeMap;
use thiserror::Error;

/// Standard Result type for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Core error type for all console operations
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Fetch failed for {resource}: {message}")]
    Fetch { resource: String, message: String },

    #[error("Invalid filter schema: {0}")]
    Schema(#[from] SchemaErrors),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    pub fn fetch(resource: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ConsoleError::Fetch {
            resource: resource.into(),
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ConsoleError::Fetch { .. } => "fetch_failed",
            ConsoleError::Schema(_) => "invalid_schema",
            ConsoleError::Config(_) => "configuration_error",
            ConsoleError::Serialization(_) => "serialization_error",
            ConsoleError::Internal(_) => "internal_error",
        }
    }
}

/// Schema validation errors, keyed by filter id
#[derive(Error, Debug, Default, Clone, PartialEq, Eq)]
#[error("{}", self.full_messages().join("; "))]
pub struct SchemaErrors {
    /// Filter id -> messages
    pub errors: BTreeMap<String, Vec<String>>,
    /// Errors not tied to a single filter
    pub base_errors: Vec<String>,
}

impl SchemaErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, filter_id: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(filter_id.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific filter
    pub fn has_error(&self, filter_id: &str) -> bool {
        self.errors.contains_key(filter_id)
    }

    pub fn get(&self, filter_id: &str) -> Option<&Vec<String>> {
        self.errors.get(filter_id)
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (filter_id, filter_messages) in &self.errors {
            for msg in filter_messages {
                messages.push(format!("{} {}", filter_id, msg));
            }
        }
        messages
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> ConsoleResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ConsoleError::Schema(self))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_errors_collect_per_filter() {
        let mut errors = SchemaErrors::new();
        assert!(errors.is_empty());

        errors.add("state", "is defined twice");
        errors.add("state", "collides with a reserved parameter");
        errors.add_base("schema is empty");

        assert!(errors.has_error("state"));
        assert_eq!(errors.get("state").map(|m| m.len()), Some(2));
        assert_eq!(
            errors.full_messages(),
            vec![
                "schema is empty".to_string(),
                "state is defined twice".to_string(),
                "state collides with a reserved parameter".to_string(),
            ]
        );
    }

    #[test]
    fn test_into_result() {
        assert!(SchemaErrors::new().into_result().is_ok());

        let mut errors = SchemaErrors::new();
        errors.add("", "id must not be empty");
        let err = errors.into_result().unwrap_err();
        assert_eq!(err.error_code(), "invalid_schema");
    }

    #[test]
    fn test_fetch_error_message() {
        let err = ConsoleError::fetch("jobs", "connection refused");
        assert_eq!(err.to_string(), "Fetch failed for jobs: connection refused");
        assert_eq!(err.error_code(), "fetch_failed");
    }
}
