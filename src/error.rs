use thiserror::Error;

use crate::type_graph::DocumentId;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to resolve prefix {0:?} to a namespace URI")]
    PrefixNotResolved(String),
    #[error("the schema document failed to parse")]
    Parse(#[from] roxmltree::Error),
    #[error("expected a schema document element, found {0:?}")]
    UnexpectedRoot(String),
    #[error("an unspecified error occurred while loading the schema")]
    Load(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Severity of a per-document diagnostic. Diagnostics are collected and
/// attached to the session; they never abort compilation of other documents.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A validation finding recorded against a single schema document.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub document: DocumentId,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn error(document: DocumentId, message: impl Into<String>) -> Self {
        Self {
            document,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(document: DocumentId, message: impl Into<String>) -> Self {
        Self {
            document,
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}
