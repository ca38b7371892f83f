//! Core type definitions for the parsed document
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for small arrays (avoid heap allocation)
//! 3. Keep attributes in source order so serialization round-trips

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Node identifier (index into arena)
/// u32 allows 4 billion nodes, enough for any webpage
pub type NodeId = u32;

/// Lookup attribute carrying a tree node id in the augmented markup
pub const LOOKUP_ATTR: &str = "data-inspector-id";

/// Marker attribute toggled on the hovered element
pub const HOVER_ATTR: &str = "data-inspector-hover";

/// Marker attribute toggled on the selected element
pub const SELECTED_ATTR: &str = "data-inspector-selected";

/// Value written into a marker attribute while it is active
pub const MARKER_VALUE: &str = "true";

/// Attributes never copied into a tree node's `attrs`
pub const EXCLUDED_ATTRIBUTES: &[&str] = &["style", LOOKUP_ATTR, HOVER_ATTR, SELECTED_ATTR];

/// Node type matching DOM specification numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
}

/// A node of the parsed document
///
/// Design philosophy:
/// - Small fixed-size fields first (better packing)
/// - Use indices instead of pointers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType, // 1 byte

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>, // Most nodes have <4 children

    /// Tag name as parsed (lowercase for HTML elements), `#text` / `#comment` /
    /// `#document` otherwise, doctype name for doctypes
    pub node_name: String,
    /// Character data for text and comment nodes
    pub node_value: String,
    pub attributes: Vec<(String, String)>,
}

impl DomNode {
    pub fn new(node_id: NodeId, node_type: NodeType, node_name: impl Into<String>) -> Self {
        Self {
            node_id,
            node_type,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name: node_name.into(),
            node_value: String::new(),
            attributes: Vec::new(),
        }
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Check if node is text
    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set attribute, replacing an existing value in place
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Remove attribute, returning its previous value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(pos).1)
    }

    /// Natural identifier: a non-empty `id` attribute
    pub fn natural_id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    /// Check for one of the elements whose content never reaches the tree
    pub fn is_non_content(&self) -> bool {
        self.is_element()
            && (self.node_name.eq_ignore_ascii_case("script")
                || self.node_name.eq_ignore_ascii_case("style"))
    }
}
