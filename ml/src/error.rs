//! Lineage extraction error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a lineage run
#[derive(Debug, Error)]
pub enum LineageError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed XML in {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("{path}:{line}: <{element}> is missing required attribute {attribute}")]
    MissingAttribute {
        path: PathBuf,
        line: u32,
        element: String,
        attribute: &'static str,
    },

    #[error(
        "{path}:{line}: connector {from_instance}.{from_field} -> {to_instance}.{to_field} \
         references unknown instance '{instance}'"
    )]
    UnboundInstance {
        path: PathBuf,
        line: u32,
        instance: String,
        from_instance: String,
        from_field: String,
        to_instance: String,
        to_field: String,
    },

    #[error("No {0} configured; pass it on the command line or set it in the config file")]
    MissingInput(&'static str),

    #[error("Failed to write workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}

impl LineageError {
    /// Line in the offending document, when the error points into one
    pub fn line(&self) -> Option<u32> {
        match self {
            LineageError::MissingAttribute { line, .. } | LineageError::UnboundInstance { line, .. } => Some(*line),
            LineageError::Xml { source, .. } => Some(source.pos().row),
            _ => None,
        }
    }

    /// Check if this error was caused by the content of an input document
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            LineageError::Xml { .. } | LineageError::MissingAttribute { .. } | LineageError::UnboundInstance { .. }
        )
    }
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, LineageError>;
