//! Tabular report assembly
//!
//! Turns catalogs and lineage into plain string tables. Nothing here touches
//! the filesystem; see [`crate::workbook`] for that.

use serde::Serialize;

use crate::catalog::{SourceCatalog, TransformationCatalog};
use crate::connector::LineageEdge;
use crate::inference::LineageRecord;
use crate::repo_metadata::{REPO_COLUMNS, RepoInfo};
use crate::session_log::{SESSION_COLUMNS, SessionInfo};

/// Type shown for an edge whose destination is not a transformation
pub const TARGET_DEFINITION: &str = "Target Definition";

/// Marker placed between the two sides of an edge row
pub const EDGE_ARROW: &str = "->";

pub const CONNECTOR_SHEET: &str = "Lineage";

pub const CONNECTOR_COLUMNS: [&str; 7] = [
    "Source/Transformation",
    "Field",
    "",
    "Target Transformation",
    "Target Field",
    "Transformation Type",
    "",
];

pub const LINEAGE_SHEET: &str = "Data Lineage";
pub const SESSION_SHEET: &str = "Session Info";
pub const REPO_SHEET: &str = "Repo Info";

pub const LINEAGE_COLUMNS: [&str; 6] = [
    "Source Name",
    "Source Field",
    "Transformation Name",
    "Transformation Type",
    "Target Name",
    "Target Field",
];

/// A named table of string cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            name: name.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Source field rows followed by one row per edge
pub fn connector_sheet(
    sources: &SourceCatalog,
    transformations: &TransformationCatalog,
    edges: &[LineageEdge],
) -> Sheet {
    let mut sheet = Sheet::new(CONNECTOR_SHEET, &CONNECTOR_COLUMNS);

    for source in sources.iter() {
        for field in &source.fields {
            sheet.push_row([source.name.as_str(), field.as_str(), "", "", "", "", ""]);
        }
    }

    for edge in edges {
        let kind = transformations
            .kind_of(&edge.to_transformation)
            .unwrap_or(TARGET_DEFINITION);
        sheet.push_row([
            edge.from_transformation.as_str(),
            edge.from_field.as_str(),
            EDGE_ARROW,
            edge.to_transformation.as_str(),
            edge.to_field.as_str(),
            kind,
            "",
        ]);
    }

    sheet
}

/// The lineage, session and repository sheets, in that order
pub fn inference_sheets(records: &[LineageRecord], session: &SessionInfo, repo: &RepoInfo) -> Vec<Sheet> {
    let mut lineage = Sheet::new(LINEAGE_SHEET, &LINEAGE_COLUMNS);
    for r in records {
        lineage.push_row([
            r.source_name.as_str(),
            r.source_field.as_str(),
            r.transformation_name.as_str(),
            r.transformation_type.as_str(),
            r.target_name.as_str(),
            r.target_field.as_str(),
        ]);
    }

    let mut session_sheet = Sheet::new(SESSION_SHEET, &SESSION_COLUMNS);
    session_sheet.push_row(session.values().map(|v| v.unwrap_or_default()));

    let mut repo_sheet = Sheet::new(REPO_SHEET, &REPO_COLUMNS);
    repo_sheet.push_row(repo.values().map(|v| v.unwrap_or_default()));

    vec![lineage, session_sheet, repo_sheet]
}
