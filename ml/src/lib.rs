//! maplineage - field-level lineage from mapping-tool XML exports
//!
//! Two independent runs share the XML readers and catalog builders:
//!
//! - **Connector lineage** follows the mapping's CONNECTOR elements through
//!   its INSTANCE bindings, giving one edge per connector.
//! - **Inferred lineage** has no connectors to follow. Each target field is
//!   matched by name against transformation OUTPUT ports and source fields,
//!   and is reported with session-log and repository details. The match is
//!   best-effort: same-named fields in unrelated sources are attributed to
//!   whichever source comes first.
//!
//! # Example
//!
//! ```ignore
//! use maplineage::{ConnectorJob, UnboundPolicy, run_connector_lineage};
//!
//! let summary = run_connector_lineage(&ConnectorJob {
//!     mapping: "SDE_WC_AR_BRXACT_FS.XML".into(),
//!     output: "connector_lineage.xlsx".into(),
//!     on_unbound: UnboundPolicy::Abort,
//! })?;
//! println!("{} edges", summary.lineage_rows);
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod connector;
pub mod encoding;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod report;
pub mod repo_metadata;
pub mod session_log;
pub mod workbook;
pub mod xml;

pub use catalog::{FieldCatalog, PortDirection, SourceCatalog, TargetCatalog, TransformField, TransformationCatalog};
pub use connector::{Connector, ConnectorLineage, InstanceBinding, LineageEdge, UnboundPolicy};
pub use error::{LineageError, Result};
pub use inference::{LineageRecord, infer_lineage};
pub use pipeline::{
    ConnectorJob, ConnectorReport, InferenceJob, InferenceReport, RunSummary, analyze_connectors, analyze_inference,
    run_connector_lineage, run_inferred_lineage,
};
pub use report::{Sheet, TARGET_DEFINITION};
pub use repo_metadata::RepoInfo;
pub use session_log::SessionInfo;
