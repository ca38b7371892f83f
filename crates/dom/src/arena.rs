//! Arena-based DOM tree storage
//!
//! Every parsed document lives in one `Vec<DomNode>` addressed by `u32`
//! indices. No Rc/RefCell, so the identity pass can annotate nodes while a
//! borrowed view of the same tree is still being walked by index.
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType, HOVER_ATTR, LOOKUP_ATTR, SELECTED_ATTR};
use ahash::AHashMap;

/// Arena allocator for DOM nodes
///
/// Design:
/// - Single Vec<DomNode> for sequential allocation
/// - HashMap for lookup attribute → NodeId (the augmented markup's query key)
/// - No Rc/Arc: use indices everywhere
#[derive(Debug, Clone)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,

    /// Lookup id → NodeId, first element wins on duplicates
    lookup_map: AHashMap<String, NodeId>,

    /// Document (or fragment) node
    root_id: Option<NodeId>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(1024) // Pre-allocate for typical page
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            lookup_map: AHashMap::with_capacity(capacity),
            root_id: None,
        }
    }

    /// Add a node to the arena, returns its ID
    ///
    /// The node's own `node_id` is overwritten with its arena position.
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        if let Some(lookup) = node.attr(LOOKUP_ATTR) {
            self.lookup_map.entry(lookup.to_string()).or_insert(node_id);
        }
        self.nodes.push(node);
        node_id
    }

    /// Append `child` to `parent`'s children
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get_mut(child)?.parent_id = Some(parent);
        self.get_mut(parent)?.children_ids.push(child);
        Ok(())
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node ID by lookup attribute value
    pub fn node_id_by_lookup(&self, lookup_id: &str) -> Option<NodeId> {
        self.lookup_map.get(lookup_id).copied()
    }

    /// Write the lookup attribute onto an element and index it
    pub fn set_lookup_id(&mut self, node_id: NodeId, lookup_id: &str) -> Result<()> {
        let node = self.get_mut(node_id)?;
        if !node.is_element() {
            return Err(DomError::InvalidNodeType {
                expected: "element".to_string(),
                actual: node.node_name.clone(),
            });
        }
        let previous = node.attr(LOOKUP_ATTR).map(str::to_string);
        node.set_attr(LOOKUP_ATTR, lookup_id);

        if let Some(previous) = previous {
            if self.lookup_map.get(&previous) == Some(&node_id) {
                self.lookup_map.remove(&previous);
            }
        }
        self.lookup_map.insert(lookup_id.to_string(), node_id);
        Ok(())
    }

    /// Remove the lookup and marker attributes from every element
    ///
    /// Leaves the lookup index empty; ids are written back with
    /// [`DomArena::set_lookup_id`].
    pub fn strip_inspector_attributes(&mut self) {
        for node in self.nodes.iter_mut().filter(|node| node.is_element()) {
            for name in [LOOKUP_ATTR, HOVER_ATTR, SELECTED_ATTR] {
                node.remove_attr(name);
            }
        }
        self.lookup_map.clear();
    }

    /// Set root node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        // Verify node exists
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Get root node
    pub fn root(&self) -> Result<&DomNode> {
        let root_id = self.root_id.ok_or(DomError::NoRootElement)?;
        self.get(root_id)
    }

    /// Element children of the root node
    pub fn top_level_elements(&self) -> Result<Vec<NodeId>> {
        let root = self.root()?;
        Ok(root
            .children_ids
            .iter()
            .copied()
            .filter(|&id| self.get(id).map(DomNode::is_element).unwrap_or(false))
            .collect())
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over all nodes
    pub fn iter(&self) -> impl Iterator<Item = &DomNode> {
        self.nodes.iter()
    }

    /// Find nodes matching predicate
    pub fn find<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.nodes
            .iter()
            .filter(|node| predicate(node))
            .map(|node| node.node_id)
            .collect()
    }

    /// Find first node matching predicate
    pub fn find_one<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.nodes
            .iter()
            .find(|node| predicate(node))
            .map(|node| node.node_id)
    }

    /// Find all elements by tag name
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.find(|node| node.is_element() && node.node_name.eq_ignore_ascii_case(tag))
    }

    /// Find element by ID attribute
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_one(|node| node.is_element() && node.attr("id") == Some(id))
    }

    /// All elements carrying the given lookup attribute value
    ///
    /// Scans instead of using the index so duplicates are visible.
    pub fn find_all_by_lookup(&self, lookup_id: &str) -> Vec<NodeId> {
        self.find(|node| node.is_element() && node.attr(LOOKUP_ATTR) == Some(lookup_id))
    }

    /// Clear arena (reuse allocation)
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.lookup_map.clear();
        self.root_id = None;
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an arena by hand: document → html → children
#[cfg(test)]
pub(crate) fn sample_arena() -> DomArena {
    let mut arena = DomArena::new();
    let doc = arena.add_node(DomNode::new(0, NodeType::Document, "#document"));
    arena.set_root(doc).unwrap();

    let html = arena.add_node(DomNode::new(0, NodeType::Element, "html"));
    arena.append_child(doc, html).unwrap();

    let mut div = DomNode::new(0, NodeType::Element, "div");
    div.set_attr("id", "x");
    let div = arena.add_node(div);
    arena.append_child(html, div).unwrap();

    let span = arena.add_node(DomNode::new(0, NodeType::Element, "span"));
    arena.append_child(div, span).unwrap();

    let mut text = DomNode::new(0, NodeType::Text, "#text");
    text.node_value = "Yo".to_string();
    let text = arena.add_node(text);
    arena.append_child(span, text).unwrap();

    arena
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_basic() {
        let mut arena = DomArena::new();

        let id = arena.add_node(DomNode::new(42, NodeType::Element, "div"));
        assert_eq!(id, 0);

        let retrieved = arena.get(id).unwrap();
        assert_eq!(retrieved.node_name, "div");
        assert_eq!(retrieved.node_id, 0);
        assert!(matches!(arena.get(7), Err(DomError::NodeNotFound(7))));
    }

    #[test]
    fn test_lookup_index() {
        let mut arena = sample_arena();
        let span = arena.find_by_tag("span")[0];

        assert!(arena.node_id_by_lookup("n-abc").is_none());
        arena.set_lookup_id(span, "n-abc").unwrap();
        assert_eq!(arena.node_id_by_lookup("n-abc"), Some(span));

        // Re-keying drops the stale entry
        arena.set_lookup_id(span, "n-def").unwrap();
        assert_eq!(arena.node_id_by_lookup("n-abc"), None);
        assert_eq!(arena.node_id_by_lookup("n-def"), Some(span));
    }

    #[test]
    fn test_lookup_rejects_text_nodes() {
        let mut arena = sample_arena();
        let text = arena.find_one(|n| n.is_text()).unwrap();
        assert!(matches!(
            arena.set_lookup_id(text, "n-1"),
            Err(DomError::InvalidNodeType { .. })
        ));
    }

    #[test]
    fn test_lookup_indexed_on_add() {
        let mut arena = DomArena::new();
        let mut node = DomNode::new(0, NodeType::Element, "p");
        node.set_attr(LOOKUP_ATTR, "n-123456789");
        let id = arena.add_node(node);
        assert_eq!(arena.node_id_by_lookup("n-123456789"), Some(id));
    }

    #[test]
    fn test_children_and_top_level() {
        let arena = sample_arena();
        let div = arena.find_by_id("x").unwrap();
        assert_eq!(arena.get(div).unwrap().parent_id, arena.find_by_tag("html").first().copied());
        let span = arena.get(div).unwrap().children_ids[0];
        assert_eq!(arena.get(span).unwrap().node_name, "span");
        assert_eq!(arena.top_level_elements().unwrap().len(), 1);
    }

    #[test]
    fn test_strip_inspector_attributes() {
        let mut arena = sample_arena();
        let div = arena.find_by_id("x").unwrap();
        arena.set_lookup_id(div, "x").unwrap();
        arena.get_mut(div).unwrap().set_attr(HOVER_ATTR, "true");
        arena.get_mut(div).unwrap().set_attr(SELECTED_ATTR, "true");

        arena.strip_inspector_attributes();

        let node = arena.get(div).unwrap();
        assert_eq!(node.attributes, vec![("id".to_string(), "x".to_string())]);
        assert_eq!(arena.node_id_by_lookup("x"), None);
    }
}
