//! XML document loading and element lookup helpers

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use roxmltree::{Document, Node, ParsingOptions};

use crate::encoding::decode_xml;
use crate::error::{LineageError, Result};

/// Raw XML text read from disk, kept alive for the parsed document to borrow
#[derive(Debug, Clone)]
pub struct XmlFile {
    path: PathBuf,
    text: String,
}

impl XmlFile {
    /// Read an XML file fully into memory, decoded by its declared encoding
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bytes = fs::read(&path).map_err(|source| LineageError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        let text = decode_xml(&path, &bytes);
        Ok(Self { path, text })
    }

    /// Wrap XML text that did not come from disk; `path` is only used in diagnostics
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Parse the text. Mapping exports usually carry a DOCTYPE, so DTDs are allowed.
    pub fn parse(&self) -> Result<XmlDoc<'_>> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(&self.text, options).map_err(|source| LineageError::Xml {
            path: self.path.clone(),
            source,
        })?;
        Ok(XmlDoc { path: &self.path, doc })
    }
}

/// A parsed document plus the path it came from
pub struct XmlDoc<'a> {
    path: &'a Path,
    doc: Document<'a>,
}

impl<'a> XmlDoc<'a> {
    pub fn path(&self) -> &Path {
        self.path
    }

    /// All elements with the given tag anywhere in the document, in document order
    pub fn elements<'s>(&'s self, tag: &'static str) -> impl Iterator<Item = Node<'s, 'a>> + 's {
        self.doc.descendants().filter(move |n| n.has_tag_name(tag))
    }

    /// First element with the given tag anywhere in the document
    pub fn first_element<'s>(&'s self, tag: &'static str) -> Option<Node<'s, 'a>> {
        self.elements(tag).next()
    }

    /// 1-based line on which the element starts
    pub fn line_of(&self, node: Node<'_, '_>) -> u32 {
        self.doc.text_pos_at(node.range().start).row
    }

    /// Attribute that must be present; its absence makes the document malformed
    pub fn required_attr<'s>(&'s self, node: Node<'s, 'a>, attribute: &'static str) -> Result<&'s str> {
        node.attribute(attribute).ok_or_else(|| LineageError::MissingAttribute {
            path: self.path.to_path_buf(),
            line: self.line_of(node),
            element: node.tag_name().name().to_string(),
            attribute,
        })
    }
}

/// Elements with the given tag below `node`, in document order
pub fn children_named<'s, 'a>(node: Node<'s, 'a>, tag: &'static str) -> impl Iterator<Item = Node<'s, 'a>> {
    node.descendants().skip(1).filter(move |n| n.has_tag_name(tag))
}
