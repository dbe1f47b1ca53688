//! Inferred lineage by field-name matching
//!
//! There are no connectors to follow here. A target field is attributed to the
//! first transformation that exposes an OUTPUT port of the same name, and to
//! the first source that has a field of that name. This is a best-effort
//! heuristic: when unrelated sources share a field name, the field is
//! attributed to whichever source comes first.

use log::debug;
use serde::Serialize;

use crate::catalog::{SourceCatalog, TargetCatalog, TransformField};

/// Inferred lineage for one target field. Unresolved attribution is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineageRecord {
    pub source_name: String,
    pub source_field: String,
    pub transformation_name: String,
    pub transformation_type: String,
    pub target_name: String,
    pub target_field: String,
}

impl LineageRecord {
    fn unresolved(target_name: &str, target_field: &str) -> Self {
        Self {
            target_name: target_name.to_string(),
            target_field: target_field.to_string(),
            ..Self::default()
        }
    }

    /// True when a transformation output was matched
    pub fn is_resolved(&self) -> bool {
        !self.transformation_name.is_empty()
    }

    /// True when a source was matched as well
    pub fn has_source(&self) -> bool {
        !self.source_name.is_empty()
    }
}

/// One record per (target, target field), in target catalog order
pub fn infer_lineage(
    sources: &SourceCatalog,
    targets: &TargetCatalog,
    transforms: &[TransformField],
) -> Vec<LineageRecord> {
    let mut records = Vec::with_capacity(targets.field_count());

    for target in targets.iter() {
        for target_field in &target.fields {
            let mut record = LineageRecord::unresolved(&target.name, target_field);

            let output = transforms
                .iter()
                .find(|t| t.port.is_output() && &t.field == target_field);

            match output {
                Some(output) => {
                    record.transformation_name = output.transformation.clone();
                    record.transformation_type = output.kind.clone();
                    if let Some(source) = sources.owner_of(&output.field) {
                        record.source_name = source.to_string();
                        record.source_field = output.field.clone();
                    }
                }
                None => debug!("No OUTPUT port named {} for {}", target_field, target.name),
            }

            records.push(record);
        }
    }

    records
}
