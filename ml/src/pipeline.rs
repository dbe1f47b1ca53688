//! End-to-end lineage runs
//!
//! Each run reads its inputs, builds catalogs, resolves lineage, assembles
//! sheets and writes one workbook. Nothing is shared between runs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use crate::catalog::{FieldCatalog, SourceCatalog, TargetCatalog, TransformField, TransformationCatalog, transform_fields};
use crate::connector::{ConnectorLineage, UnboundPolicy, connector_lineage};
use crate::error::Result;
use crate::inference::{LineageRecord, infer_lineage};
use crate::repo_metadata::RepoInfo;
use crate::report::{Sheet, connector_sheet, inference_sheets};
use crate::session_log::SessionInfo;
use crate::workbook::write_workbook;
use crate::xml::XmlFile;

/// Inputs and output of a connector lineage run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorJob {
    pub mapping: PathBuf,
    pub output: PathBuf,
    pub on_unbound: UnboundPolicy,
}

/// Inputs and output of an inferred lineage run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceJob {
    pub mapping: PathBuf,
    pub repo_metadata: Option<PathBuf>,
    pub session_log: Option<PathBuf>,
    pub output: PathBuf,
}

/// Counts reported after a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub output: PathBuf,
    pub sources: usize,
    pub transformations: usize,
    pub targets: usize,
    /// Edges (connector lineage) or records (inferred lineage)
    pub lineage_rows: usize,
    /// Skipped connectors, or records with no matching transformation output
    pub unresolved: usize,
}

/// Everything extracted for connector lineage
#[derive(Debug, Clone)]
pub struct ConnectorReport {
    pub sources: SourceCatalog,
    pub transformations: TransformationCatalog,
    pub lineage: ConnectorLineage,
}

impl ConnectorReport {
    pub fn sheet(&self) -> Sheet {
        connector_sheet(&self.sources, &self.transformations, &self.lineage.edges)
    }
}

/// Everything extracted for inferred lineage
#[derive(Debug, Clone)]
pub struct InferenceReport {
    pub sources: SourceCatalog,
    pub targets: TargetCatalog,
    pub transforms: Vec<TransformField>,
    pub records: Vec<LineageRecord>,
    pub session: SessionInfo,
    pub repo: RepoInfo,
}

impl InferenceReport {
    pub fn sheets(&self) -> Vec<Sheet> {
        inference_sheets(&self.records, &self.session, &self.repo)
    }

    pub fn unresolved(&self) -> usize {
        self.records.iter().filter(|r| !r.is_resolved()).count()
    }
}

/// Extract catalogs and connector edges from a mapping document
pub fn analyze_connectors(mapping: &Path, policy: UnboundPolicy) -> Result<ConnectorReport> {
    let file = XmlFile::read(mapping)?;
    let doc = file.parse()?;

    let sources = FieldCatalog::sources(&doc)?;
    let transformations = TransformationCatalog::extract(&doc)?;
    let lineage = connector_lineage(&doc, policy)?;

    info!(
        "{}: {} sources, {} transformations, {} edges",
        mapping.display(),
        sources.len(),
        transformations.len(),
        lineage.edges.len()
    );
    Ok(ConnectorReport {
        sources,
        transformations,
        lineage,
    })
}

/// Extract catalogs, infer lineage and load the optional session and repository inputs
pub fn analyze_inference(
    mapping: &Path,
    repo_metadata: Option<&Path>,
    session_log: Option<&Path>,
) -> Result<InferenceReport> {
    let file = XmlFile::read(mapping)?;
    let doc = file.parse()?;

    let sources = FieldCatalog::sources(&doc)?;
    let targets = FieldCatalog::targets(&doc)?;
    let transforms = transform_fields(&doc)?;
    let records = infer_lineage(&sources, &targets, &transforms);

    let repo = match repo_metadata {
        Some(path) => {
            let file = XmlFile::read(path)?;
            RepoInfo::extract(&file.parse()?)
        }
        None => {
            debug!("No repository metadata file given");
            RepoInfo::default()
        }
    };

    let session = match session_log {
        Some(path) => SessionInfo::read(path)?,
        None => {
            debug!("No session log given");
            SessionInfo::default()
        }
    };

    let report = InferenceReport {
        sources,
        targets,
        transforms,
        records,
        session,
        repo,
    };
    info!(
        "{}: {} targets, {} lineage records ({} unresolved)",
        mapping.display(),
        report.targets.len(),
        report.records.len(),
        report.unresolved()
    );
    Ok(report)
}

/// Run connector lineage and write its workbook
pub fn run_connector_lineage(job: &ConnectorJob) -> Result<RunSummary> {
    let report = analyze_connectors(&job.mapping, job.on_unbound)?;
    write_workbook(&job.output, &[report.sheet()])?;

    Ok(RunSummary {
        output: job.output.clone(),
        sources: report.sources.len(),
        transformations: report.transformations.len(),
        targets: 0,
        lineage_rows: report.lineage.edges.len(),
        unresolved: report.lineage.skipped.len(),
    })
}

/// Run inferred lineage and write its workbook
pub fn run_inferred_lineage(job: &InferenceJob) -> Result<RunSummary> {
    if job.repo_metadata.is_none() {
        warn!("No repository metadata file given, Repo Info will be empty");
    }
    if job.session_log.is_none() {
        warn!("No session log given, Session Info will be empty");
    }
    let report = analyze_inference(&job.mapping, job.repo_metadata.as_deref(), job.session_log.as_deref())?;
    write_workbook(&job.output, &report.sheets())?;

    let transformations: HashSet<&str> = report.transforms.iter().map(|t| t.transformation.as_str()).collect();

    Ok(RunSummary {
        output: job.output.clone(),
        sources: report.sources.len(),
        transformations: transformations.len(),
        targets: report.targets.len(),
        lineage_rows: report.records.len(),
        unresolved: report.unresolved(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LineageError;
    use std::fs;
    use tempfile::TempDir;

    const MAPPING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE POWERMART SYSTEM "powrmart.dtd">
<POWERMART>
<REPOSITORY NAME="DEV" DATABASETYPE="Oracle">
<FOLDER NAME="SDE" DESCRIPTION="Extract">
  <SOURCE NAME="S1"><SOURCEFIELD NAME="A"/><SOURCEFIELD NAME="B"/></SOURCE>
  <TARGET NAME="TGT"><TARGETFIELD NAME="A"/><TARGETFIELD NAME="Z"/></TARGET>
  <MAPPING NAME="M">
    <TRANSFORMATION NAME="T1" TYPE="Expression">
      <TRANSFORMFIELD NAME="A" PORTTYPE="OUTPUT"/>
    </TRANSFORMATION>
    <INSTANCE NAME="SQ" TRANSFORMATION_NAME="S1"/>
    <INSTANCE NAME="I1" TRANSFORMATION_NAME="T1"/>
    <INSTANCE NAME="SINK" TRANSFORMATION_NAME="TGT"/>
    <CONNECTOR FROMINSTANCE="SQ" FROMFIELD="A" TOINSTANCE="I1" TOFIELD="A"/>
    <CONNECTOR FROMINSTANCE="I1" FROMFIELD="A" TOINSTANCE="SINK" TOFIELD="A"/>
  </MAPPING>
</FOLDER>
</REPOSITORY>
</POWERMART>"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_run_connector_lineage() {
        let temp = TempDir::new().unwrap();
        let job = ConnectorJob {
            mapping: write(&temp, "mapping.xml", MAPPING),
            output: temp.path().join("connectors.xlsx"),
            on_unbound: UnboundPolicy::Abort,
        };
        let summary = run_connector_lineage(&job).unwrap();
        assert_eq!(summary.sources, 1);
        assert_eq!(summary.transformations, 1);
        assert_eq!(summary.lineage_rows, 2);
        assert_eq!(summary.unresolved, 0);
        assert!(job.output.exists());
    }

    #[test]
    fn test_connector_sheet_from_file() {
        let temp = TempDir::new().unwrap();
        let mapping = write(&temp, "mapping.xml", MAPPING);
        let sheet = analyze_connectors(&mapping, UnboundPolicy::Abort).unwrap().sheet();
        assert_eq!(sheet.rows[2], vec!["S1", "A", "->", "T1", "A", "Expression", ""]);
        assert_eq!(sheet.rows[3], vec!["T1", "A", "->", "TGT", "A", "Target Definition", ""]);
    }

    #[test]
    fn test_run_inferred_lineage_with_all_inputs() {
        let temp = TempDir::new().unwrap();
        let job = InferenceJob {
            mapping: write(&temp, "mapping.xml", MAPPING),
            repo_metadata: Some(write(&temp, "repo.xml", MAPPING)),
            session_log: Some(write(&temp, "session.log", "Session status: Succeeded\nRows Inserted: 3\n")),
            output: temp.path().join("inferred.xlsx"),
        };
        let summary = run_inferred_lineage(&job).unwrap();
        assert_eq!(summary.targets, 1);
        assert_eq!(summary.lineage_rows, 2);
        assert_eq!(summary.unresolved, 1);
        assert!(job.output.exists());
    }

    #[test]
    fn test_inference_without_optional_inputs() {
        let temp = TempDir::new().unwrap();
        let mapping = write(&temp, "mapping.xml", MAPPING);
        let report = analyze_inference(&mapping, None, None).unwrap();
        assert_eq!(report.session, SessionInfo::default());
        assert_eq!(report.repo, RepoInfo::default());
        assert_eq!(report.records[0].source_name, "S1");
        assert_eq!(report.records[0].transformation_name, "T1");
    }

    #[test]
    fn test_configured_but_missing_session_log_is_fatal() {
        let temp = TempDir::new().unwrap();
        let mapping = write(&temp, "mapping.xml", MAPPING);
        let missing = temp.path().join("nope.log");
        let err = analyze_inference(&mapping, None, Some(&missing)).unwrap_err();
        assert!(matches!(err, LineageError::Io { .. }));
    }

    #[test]
    fn test_malformed_mapping_is_fatal() {
        let temp = TempDir::new().unwrap();
        let mapping = write(&temp, "mapping.xml", "<POWERMART><SOURCE NAME=\"S\">");
        assert!(analyze_connectors(&mapping, UnboundPolicy::Abort).is_err());
        assert!(analyze_inference(&mapping, None, None).is_err());
    }

    #[test]
    fn test_analysis_is_repeatable() {
        let temp = TempDir::new().unwrap();
        let mapping = write(&temp, "mapping.xml", MAPPING);
        let first = analyze_connectors(&mapping, UnboundPolicy::Abort).unwrap().sheet();
        let second = analyze_connectors(&mapping, UnboundPolicy::Abort).unwrap().sheet();
        assert_eq!(first, second);

        let first = analyze_inference(&mapping, Some(&mapping), None).unwrap().sheets();
        let second = analyze_inference(&mapping, Some(&mapping), None).unwrap().sheets();
        assert_eq!(first, second);
    }
}
