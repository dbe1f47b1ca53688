//! Connector lineage: instance bindings and connector edge resolution

use std::collections::HashMap;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{LineageError, Result};
use crate::xml::XmlDoc;

/// What to do with a connector that references an instance with no binding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnboundPolicy {
    /// Fail the run, naming the connector
    #[default]
    Abort,
    /// Drop the connector and log a warning
    Skip,
}

/// Instance name to transformation name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceBinding {
    instances: HashMap<String, String>,
}

impl InstanceBinding {
    /// Bind every INSTANCE in the document. A later instance with the same name wins.
    pub fn extract(doc: &XmlDoc<'_>) -> Result<Self> {
        let mut binding = Self::default();
        for node in doc.elements("INSTANCE") {
            let name = doc.required_attr(node, "NAME")?;
            let transformation = doc.required_attr(node, "TRANSFORMATION_NAME")?;
            binding.bind(name, transformation);
        }
        debug!("INSTANCE bindings: {}", binding.len());
        Ok(binding)
    }

    pub fn bind(&mut self, instance: impl Into<String>, transformation: impl Into<String>) {
        self.instances.insert(instance.into(), transformation.into());
    }

    /// Transformation bound to `instance`, or `None` when the instance is unknown
    pub fn resolve(&self, instance: &str) -> Option<&str> {
        self.instances.get(instance).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// A CONNECTOR element as written in the mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connector {
    pub from_instance: String,
    pub from_field: String,
    pub to_instance: String,
    pub to_field: String,
    /// Line of the element in its document
    pub line: u32,
}

impl Connector {
    /// Every CONNECTOR in the document, in document order
    pub fn extract_all(doc: &XmlDoc<'_>) -> Result<Vec<Self>> {
        doc.elements("CONNECTOR")
            .map(|node| -> Result<Self> {
                Ok(Self {
                    from_instance: doc.required_attr(node, "FROMINSTANCE")?.to_string(),
                    from_field: doc.required_attr(node, "FROMFIELD")?.to_string(),
                    to_instance: doc.required_attr(node, "TOINSTANCE")?.to_string(),
                    to_field: doc.required_attr(node, "TOFIELD")?.to_string(),
                    line: doc.line_of(node),
                })
            })
            .collect()
    }

    fn unbound(&self, path: &Path, instance: &str) -> LineageError {
        LineageError::UnboundInstance {
            path: path.to_path_buf(),
            line: self.line,
            instance: instance.to_string(),
            from_instance: self.from_instance.clone(),
            from_field: self.from_field.clone(),
            to_instance: self.to_instance.clone(),
            to_field: self.to_field.clone(),
        }
    }
}

/// One field-level hop between two transformations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineageEdge {
    pub from_transformation: String,
    pub from_field: String,
    pub to_transformation: String,
    pub to_field: String,
}

/// Edges resolved from a mapping's connectors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectorLineage {
    /// One edge per resolved connector, in document order
    pub edges: Vec<LineageEdge>,
    /// Connectors dropped under [`UnboundPolicy::Skip`]
    pub skipped: Vec<Connector>,
}

/// Resolve each connector's instances to transformations.
///
/// `path` is the mapping document the connectors came from and only feeds diagnostics.
pub fn resolve_connectors(
    path: &Path,
    binding: &InstanceBinding,
    connectors: &[Connector],
    policy: UnboundPolicy,
) -> Result<ConnectorLineage> {
    let mut lineage = ConnectorLineage::default();

    for connector in connectors {
        let from = binding.resolve(&connector.from_instance);
        let to = binding.resolve(&connector.to_instance);

        match (from, to) {
            (Some(from), Some(to)) => {
                debug!("{}.{} -> {}.{}", from, connector.from_field, to, connector.to_field);
                lineage.edges.push(LineageEdge {
                    from_transformation: from.to_string(),
                    from_field: connector.from_field.clone(),
                    to_transformation: to.to_string(),
                    to_field: connector.to_field.clone(),
                });
            }
            _ => {
                let missing = if from.is_none() {
                    &connector.from_instance
                } else {
                    &connector.to_instance
                };
                let err = connector.unbound(path, missing);
                match policy {
                    UnboundPolicy::Abort => return Err(err),
                    UnboundPolicy::Skip => {
                        warn!("Skipping connector: {}", err);
                        lineage.skipped.push(connector.clone());
                    }
                }
            }
        }
    }

    Ok(lineage)
}

/// Extract bindings and connectors from `doc` and resolve them
pub fn connector_lineage(doc: &XmlDoc<'_>, policy: UnboundPolicy) -> Result<ConnectorLineage> {
    let binding = InstanceBinding::extract(doc)?;
    let connectors = Connector::extract_all(doc)?;
    resolve_connectors(doc.path(), &binding, &connectors, policy)
}
