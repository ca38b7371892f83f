//! Immutable, serializable inspector tree
//!
//! Created once per successful parse and replaced wholesale on the next
//! fetch. Hover and selection state live beside it, never inside it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

/// Element node of the inspector tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    /// Lowercase tag name
    pub tag: String,
    /// Source attributes minus `style` and the inspector's own attributes
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<TreeChild>,
    /// Inline text preview; last non-empty text child wins
    pub text: String,
}

/// Marker for the text variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    Text,
}

/// Trimmed, non-empty text child
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextNode {
    pub kind: TextKind,
    pub content: String,
}

impl TextNode {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            kind: TextKind::Text,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeChild {
    Text(TextNode),
    Element(TreeNode),
}

impl TreeChild {
    pub fn as_element(&self) -> Option<&TreeNode> {
        match self {
            TreeChild::Element(node) => Some(node),
            TreeChild::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TreeChild::Text(text) => Some(&text.content),
            TreeChild::Element(_) => None,
        }
    }
}

impl TreeNode {
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    /// Element children only
    pub fn elements(&self) -> impl Iterator<Item = &TreeNode> {
        self.children.iter().filter_map(TreeChild::as_element)
    }

    /// Text children only
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(TreeChild::as_text)
    }

    /// Nodes in the tree, this one included; text children count as one each
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            for child in &node.children {
                match child {
                    TreeChild::Element(element) => stack.push(element),
                    TreeChild::Text(_) => count += 1,
                }
            }
        }
        count
    }

    /// Pre-order search by id
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        self.pre_order().find(|node| node.id == id)
    }

    /// Element ids in pre-order
    pub fn ids(&self) -> Vec<&str> {
        self.pre_order().map(|node| node.id.as_str()).collect()
    }

    /// This node and every element below it, parents before children
    pub fn pre_order(&self) -> impl Iterator<Item = &TreeNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev().filter_map(TreeChild::as_element));
            Some(node)
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// Deep trees would otherwise recurse once per level in drop glue
impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(child) = pending.pop() {
            if let TreeChild::Element(mut node) = child {
                pending.append(&mut node.children);
            }
        }
    }
}
