//! Source, target and transformation catalogs extracted from a mapping document
//!
//! Each catalog is built by its own pass over the whole document. Element and
//! field names are required; a missing NAME makes the document malformed.
//! TYPE and PORTTYPE are optional and default to empty/unspecified.

use log::{debug, warn};
use serde::Serialize;

use crate::error::Result;
use crate::xml::{XmlDoc, children_named};

/// A named owner (source or target) and its fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub fields: Vec<String>,
}

/// Ordered mapping of owner name to field names, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldCatalog {
    entries: Vec<CatalogEntry>,
}

/// Sources and their fields
pub type SourceCatalog = FieldCatalog;

/// Targets and their fields
pub type TargetCatalog = FieldCatalog;

impl FieldCatalog {
    /// Catalog of every SOURCE and its SOURCEFIELDs
    pub fn sources(doc: &XmlDoc<'_>) -> Result<SourceCatalog> {
        Self::extract(doc, "SOURCE", "SOURCEFIELD")
    }

    /// Catalog of every TARGET and its TARGETFIELDs
    pub fn targets(doc: &XmlDoc<'_>) -> Result<TargetCatalog> {
        Self::extract(doc, "TARGET", "TARGETFIELD")
    }

    fn extract(doc: &XmlDoc<'_>, owner_tag: &'static str, field_tag: &'static str) -> Result<Self> {
        let mut catalog = Self::default();
        for owner in doc.elements(owner_tag) {
            let name = doc.required_attr(owner, "NAME")?;
            let index = catalog.entry_index(name);
            for field in children_named(owner, field_tag) {
                let field_name = doc.required_attr(field, "NAME")?;
                catalog.entries[index].fields.push(field_name.to_string());
            }
        }
        debug!(
            "{} catalog: {} entries, {} fields",
            owner_tag,
            catalog.len(),
            catalog.field_count()
        );
        Ok(catalog)
    }

    /// Index of the entry for `name`, appending an empty one if needed.
    /// Repeated owners with the same name share one entry.
    fn entry_index(&mut self, name: &str) -> usize {
        match self.entries.iter().position(|e| e.name == name) {
            Some(index) => index,
            None => {
                self.entries.push(CatalogEntry {
                    name: name.to_string(),
                    fields: Vec::new(),
                });
                self.entries.len() - 1
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Number of owners
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of fields across all owners
    pub fn field_count(&self) -> usize {
        self.entries.iter().map(|e| e.fields.len()).sum()
    }

    pub fn fields(&self, name: &str) -> Option<&[String]> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.fields.as_slice())
    }

    /// First owner, in catalog order, that exposes a field with this name
    pub fn owner_of(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.fields.iter().any(|f| f == field))
            .map(|e| e.name.as_str())
    }
}

/// A transformation definition with its fields, as used for connector lineage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transformation {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub fields: Vec<String>,
}

/// Transformations keyed by name, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformationCatalog {
    transformations: Vec<Transformation>,
}

impl TransformationCatalog {
    /// Catalog of every TRANSFORMATION and its TRANSFORMFIELDs.
    /// A later definition with the same name replaces an earlier one.
    pub fn extract(doc: &XmlDoc<'_>) -> Result<Self> {
        let mut catalog = Self::default();
        for node in doc.elements("TRANSFORMATION") {
            let name = doc.required_attr(node, "NAME")?;
            let kind = transformation_type(doc, node, name);
            let fields = children_named(node, "TRANSFORMFIELD")
                .map(|f| doc.required_attr(f, "NAME").map(str::to_string))
                .collect::<Result<Vec<_>>>()?;

            let transformation = Transformation {
                name: name.to_string(),
                kind,
                fields,
            };
            match catalog.transformations.iter_mut().find(|t| t.name == name) {
                Some(existing) => {
                    debug!("Transformation {} redefined, keeping the later definition", name);
                    *existing = transformation;
                }
                None => catalog.transformations.push(transformation),
            }
        }
        debug!("TRANSFORMATION catalog: {} entries", catalog.len());
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&Transformation> {
        self.transformations.iter().find(|t| t.name == name)
    }

    /// Transformation type for `name`, if it is a known transformation
    pub fn kind_of(&self, name: &str) -> Option<&str> {
        self.get(name).map(|t| t.kind.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transformation> {
        self.transformations.iter()
    }

    pub fn len(&self) -> usize {
        self.transformations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }
}

/// Direction of a transformation port
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PortDirection {
    Input,
    Output,
    /// Any other PORTTYPE value, e.g. "INPUT/OUTPUT" or "LOCAL VARIABLE"
    Other(String),
    /// No PORTTYPE attribute
    Unspecified,
}

impl PortDirection {
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("INPUT") => PortDirection::Input,
            Some("OUTPUT") => PortDirection::Output,
            Some(other) => PortDirection::Other(other.to_string()),
            None => PortDirection::Unspecified,
        }
    }

    /// Only ports declared exactly OUTPUT count as outputs
    pub fn is_output(&self) -> bool {
        matches!(self, PortDirection::Output)
    }

    pub fn as_str(&self) -> &str {
        match self {
            PortDirection::Input => "INPUT",
            PortDirection::Output => "OUTPUT",
            PortDirection::Other(value) => value,
            PortDirection::Unspecified => "",
        }
    }
}

/// One transformation field, flattened with its owning transformation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformField {
    pub transformation: String,
    #[serde(rename = "transformation_type")]
    pub kind: String,
    pub field: String,
    pub port: PortDirection,
}

/// Every TRANSFORMFIELD in the document, in document order
pub fn transform_fields(doc: &XmlDoc<'_>) -> Result<Vec<TransformField>> {
    let mut records = Vec::new();
    for node in doc.elements("TRANSFORMATION") {
        let name = doc.required_attr(node, "NAME")?;
        let kind = transformation_type(doc, node, name);
        for field in children_named(node, "TRANSFORMFIELD") {
            records.push(TransformField {
                transformation: name.to_string(),
                kind: kind.clone(),
                field: doc.required_attr(field, "NAME")?.to_string(),
                port: PortDirection::from_attr(field.attribute("PORTTYPE")),
            });
        }
    }
    debug!("TRANSFORMFIELD records: {}", records.len());
    Ok(records)
}

fn transformation_type(doc: &XmlDoc<'_>, node: roxmltree::Node<'_, '_>, name: &str) -> String {
    match node.attribute("TYPE") {
        Some(kind) => kind.to_string(),
        None => {
            warn!(
                "{}:{}: transformation {} has no TYPE",
                doc.path().display(),
                doc.line_of(node),
                name
            );
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LineageError;
    use crate::xml::XmlFile;

    const MAPPING: &str = r#"<POWERMART>
<FOLDER NAME="SDE">
  <SOURCE NAME="W_AR_XACT_FS">
    <SOURCEFIELD NAME="INTEGRATION_ID"/>
    <SOURCEFIELD NAME="AMOUNT"/>
  </SOURCE>
  <SOURCE NAME="W_CUSTOMER_D">
    <SOURCEFIELD NAME="INTEGRATION_ID"/>
  </SOURCE>
  <TARGET NAME="W_AR_XACT_F">
    <TARGETFIELD NAME="INTEGRATION_ID"/>
    <TARGETFIELD NAME="DOC_AMT"/>
  </TARGET>
  <MAPPING NAME="SDE_WC_AR_BRXACT_FS">
    <TRANSFORMATION NAME="EXP_AR" TYPE="Expression">
      <TRANSFORMFIELD NAME="AMOUNT" PORTTYPE="INPUT"/>
      <TRANSFORMFIELD NAME="DOC_AMT" PORTTYPE="OUTPUT"/>
      <TRANSFORMFIELD NAME="INTEGRATION_ID" PORTTYPE="INPUT/OUTPUT"/>
    </TRANSFORMATION>
    <TRANSFORMATION NAME="SQ_AR" TYPE="Source Qualifier">
      <TRANSFORMFIELD NAME="AMOUNT"/>
    </TRANSFORMATION>
  </MAPPING>
</FOLDER>
</POWERMART>"#;

    fn with_doc<T>(text: &str, f: impl FnOnce(&XmlDoc<'_>) -> T) -> T {
        let file = XmlFile::from_text("mapping.xml", text);
        let doc = file.parse().unwrap();
        f(&doc)
    }

    #[test]
    fn test_sources_in_document_order() {
        let sources = with_doc(MAPPING, |doc| FieldCatalog::sources(doc).unwrap());
        let names: Vec<_> = sources.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["W_AR_XACT_FS", "W_CUSTOMER_D"]);
        assert_eq!(
            sources.fields("W_AR_XACT_FS").unwrap(),
            &["INTEGRATION_ID".to_string(), "AMOUNT".to_string()]
        );
        assert_eq!(sources.field_count(), 3);
    }

    #[test]
    fn test_targets() {
        let targets = with_doc(MAPPING, |doc| FieldCatalog::targets(doc).unwrap());
        assert_eq!(targets.len(), 1);
        assert_eq!(targets.fields("W_AR_XACT_F").unwrap().len(), 2);
    }

    #[test]
    fn test_owner_of_prefers_first_source() {
        let sources = with_doc(MAPPING, |doc| FieldCatalog::sources(doc).unwrap());
        assert_eq!(sources.owner_of("INTEGRATION_ID"), Some("W_AR_XACT_FS"));
        assert_eq!(sources.owner_of("MISSING"), None);
    }

    #[test]
    fn test_repeated_source_name_shares_entry() {
        let text = r#"<R><SOURCE NAME="S"><SOURCEFIELD NAME="A"/></SOURCE><SOURCE NAME="S"><SOURCEFIELD NAME="B"/></SOURCE></R>"#;
        let sources = with_doc(text, |doc| FieldCatalog::sources(doc).unwrap());
        assert_eq!(sources.len(), 1);
        assert_eq!(sources.fields("S").unwrap(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_missing_field_name_is_malformed() {
        let text = "<R>\n<SOURCE NAME=\"S\">\n<SOURCEFIELD/>\n</SOURCE></R>";
        let err = with_doc(text, |doc| FieldCatalog::sources(doc).unwrap_err());
        assert!(matches!(err, LineageError::MissingAttribute { line: 3, .. }));
    }

    #[test]
    fn test_transformation_catalog() {
        let catalog = with_doc(MAPPING, |doc| TransformationCatalog::extract(doc).unwrap());
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.kind_of("EXP_AR"), Some("Expression"));
        assert_eq!(catalog.kind_of("W_AR_XACT_F"), None);
        assert_eq!(catalog.get("EXP_AR").unwrap().fields.len(), 3);
    }

    #[test]
    fn test_transformation_redefinition_replaces() {
        let text = r#"<R>
<TRANSFORMATION NAME="T" TYPE="Filter"><TRANSFORMFIELD NAME="A"/></TRANSFORMATION>
<TRANSFORMATION NAME="T" TYPE="Expression"/>
</R>"#;
        let catalog = with_doc(text, |doc| TransformationCatalog::extract(doc).unwrap());
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.kind_of("T"), Some("Expression"));
        assert!(catalog.get("T").unwrap().fields.is_empty());
    }

    #[test]
    fn test_missing_type_defaults_to_empty() {
        let text = r#"<R><TRANSFORMATION NAME="T"><TRANSFORMFIELD NAME="A" PORTTYPE="OUTPUT"/></TRANSFORMATION></R>"#;
        let records = with_doc(text, |doc| transform_fields(doc).unwrap());
        assert_eq!(records[0].kind, "");
    }

    #[test]
    fn test_transform_fields_flattened() {
        let records = with_doc(MAPPING, |doc| transform_fields(doc).unwrap());
        assert_eq!(records.len(), 4);
        assert_eq!(records[1].transformation, "EXP_AR");
        assert_eq!(records[1].field, "DOC_AMT");
        assert_eq!(records[1].port, PortDirection::Output);
        assert_eq!(records[2].port, PortDirection::Other("INPUT/OUTPUT".to_string()));
        assert_eq!(records[3].kind, "Source Qualifier");
        assert_eq!(records[3].port, PortDirection::Unspecified);
    }

    #[test]
    fn test_port_direction() {
        assert!(PortDirection::from_attr(Some("OUTPUT")).is_output());
        assert!(!PortDirection::from_attr(Some("INPUT/OUTPUT")).is_output());
        assert!(!PortDirection::from_attr(None).is_output());
        assert_eq!(PortDirection::from_attr(Some("LOCAL VARIABLE")).as_str(), "LOCAL VARIABLE");
        assert_eq!(PortDirection::Unspecified.as_str(), "");
    }
}
