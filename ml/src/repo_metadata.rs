//! Repository metadata extraction

use log::warn;
use serde::Serialize;

use crate::xml::XmlDoc;

/// Column headers for the repository sheet, in [`RepoInfo::values`] order
pub const REPO_COLUMNS: [&str; 4] = ["Repository Name", "Database Type", "Folder Name", "Description"];

/// Repository and folder details from a repository metadata export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoInfo {
    pub repository_name: Option<String>,
    pub database_type: Option<String>,
    pub folder_name: Option<String>,
    pub description: Option<String>,
}

impl RepoInfo {
    /// Read the first REPOSITORY and first FOLDER elements. Anything absent stays `None`.
    pub fn extract(doc: &XmlDoc<'_>) -> Self {
        let mut info = Self::default();

        match doc.first_element("REPOSITORY") {
            Some(repo) => {
                info.repository_name = attr(doc, repo, "NAME");
                info.database_type = attr(doc, repo, "DATABASETYPE");
            }
            None => warn!("{}: no REPOSITORY element", doc.path().display()),
        }

        match doc.first_element("FOLDER") {
            Some(folder) => {
                info.folder_name = attr(doc, folder, "NAME");
                info.description = attr(doc, folder, "DESCRIPTION");
            }
            None => warn!("{}: no FOLDER element", doc.path().display()),
        }

        info
    }

    /// Values in [`REPO_COLUMNS`] order
    pub fn values(&self) -> [Option<&str>; 4] {
        [
            self.repository_name.as_deref(),
            self.database_type.as_deref(),
            self.folder_name.as_deref(),
            self.description.as_deref(),
        ]
    }
}

fn attr(doc: &XmlDoc<'_>, node: roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    let value = node.attribute(name).map(str::to_string);
    if value.is_none() {
        warn!(
            "{}:{}: <{}> has no {}",
            doc.path().display(),
            doc.line_of(node),
            node.tag_name().name(),
            name
        );
    }
    value
}
