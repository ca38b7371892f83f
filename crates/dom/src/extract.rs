//! Tree extraction
//!
//! Pre-order, depth-first walk over the arena that produces the inspector
//! tree. Identity is assigned as each element is entered and recorded into an
//! [`IdentityMap`]; nothing in the arena is mutated here.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::identity::{IdSource, IdentityAssigner, IdentityMap, RandomIds};
use crate::tree::{TextNode, TreeChild, TreeNode};
use crate::types::{NodeId, NodeType, EXCLUDED_ATTRIBUTES};
use crate::utils;

/// Extraction configuration
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Characters kept in an element's inline `text`
    pub text_preview_len: usize,
    /// Appended to `text` when it was truncated
    pub ellipsis: String,
    /// Attribute names left out of `attrs`
    pub excluded_attributes: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            text_preview_len: 20,
            ellipsis: "...".to_string(),
            excluded_attributes: EXCLUDED_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Tree plus the ids chosen while building it
#[derive(Debug, Clone)]
pub struct Extraction {
    pub tree: TreeNode,
    pub ids: IdentityMap,
}

/// One unit of work in the extraction walk
enum Step {
    Enter(NodeId),
    Child(NodeId),
    Exit,
}

/// Walks one arena, handing out ids as it goes
pub struct TreeExtractor<'a, S: IdSource = RandomIds> {
    arena: &'a DomArena,
    config: &'a ExtractConfig,
    assigner: IdentityAssigner<S>,
    ids: IdentityMap,
}

impl<'a> TreeExtractor<'a, RandomIds> {
    pub fn new(arena: &'a DomArena, config: &'a ExtractConfig) -> Self {
        Self::with_assigner(arena, config, IdentityAssigner::new())
    }
}

impl<'a, S: IdSource> TreeExtractor<'a, S> {
    pub fn with_assigner(
        arena: &'a DomArena,
        config: &'a ExtractConfig,
        assigner: IdentityAssigner<S>,
    ) -> Self {
        Self {
            arena,
            config,
            assigner,
            ids: IdentityMap::new(),
        }
    }

    /// Extract the tree rooted at `root`, which must be an element
    ///
    /// The walk keeps its own stack of open tree nodes; each finished node is
    /// attached to its parent when its exit step is popped.
    pub fn extract(mut self, root: NodeId) -> Result<Extraction> {
        let root_node = self.arena.get(root)?;
        if !root_node.is_element() {
            return Err(DomError::InvalidNodeType {
                expected: "element".to_string(),
                actual: root_node.node_name.clone(),
            });
        }

        let arena = self.arena;
        let mut steps = vec![Step::Enter(root)];
        let mut open: Vec<TreeNode> = Vec::new();
        let mut finished = None;

        while let Some(step) = steps.pop() {
            match step {
                Step::Enter(node_id) => {
                    let node = arena.get(node_id)?;
                    open.push(self.open_element(node_id)?);
                    steps.push(Step::Exit);
                    steps.extend(node.children_ids.iter().rev().map(|&id| Step::Child(id)));
                }
                Step::Child(child_id) => {
                    let child = arena.get(child_id)?;
                    match child.node_type {
                        NodeType::Element if !child.is_non_content() => {
                            steps.push(Step::Enter(child_id));
                        }
                        NodeType::Text => {
                            let text = child.node_value.trim();
                            if text.is_empty() {
                                continue;
                            }
                            if let Some(parent) = open.last_mut() {
                                // each non-empty text child overwrites the preview
                                parent.text = utils::preview_text(
                                    text,
                                    self.config.text_preview_len,
                                    &self.config.ellipsis,
                                );
                                parent.children.push(TreeChild::Text(TextNode::new(text)));
                            }
                        }
                        _ => {}
                    }
                }
                Step::Exit => {
                    if let Some(done) = open.pop() {
                        match open.last_mut() {
                            Some(parent) => parent.children.push(TreeChild::Element(done)),
                            None => finished = Some(done),
                        }
                    }
                }
            }
        }

        let tree = finished.ok_or(DomError::NodeNotFound(root))?;

        tracing::debug!(
            elements = self.ids.len(),
            nodes = tree.node_count(),
            "Extracted inspector tree"
        );

        Ok(Extraction {
            tree,
            ids: self.ids,
        })
    }

    /// Assign identity and copy attributes; children are filled in by the walk
    fn open_element(&mut self, node_id: NodeId) -> Result<TreeNode> {
        let node = self.arena.get(node_id)?;

        let id = self.assigner.assign(node);
        self.ids.insert(node_id, id.clone());

        let mut tree_node = TreeNode::new(id, node.node_name.to_lowercase());
        for (name, value) in &node.attributes {
            if !self.is_excluded(name) {
                tree_node.attrs.insert(name.clone(), value.clone());
            }
        }
        Ok(tree_node)
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.config
            .excluded_attributes
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(name))
    }
}

/// Extract with a random id source
pub fn extract(arena: &DomArena, root: NodeId, config: &ExtractConfig) -> Result<Extraction> {
    TreeExtractor::new(arena, config).extract(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::sample_arena;
    use crate::types::{DomNode, LOOKUP_ATTR};

    fn html_root(arena: &DomArena) -> NodeId {
        arena.top_level_elements().unwrap()[0]
    }

    fn add(arena: &mut DomArena, parent: NodeId, node: DomNode) -> NodeId {
        let id = arena.add_node(node);
        arena.append_child(parent, id).unwrap();
        id
    }

    fn text(value: &str) -> DomNode {
        let mut node = DomNode::new(0, NodeType::Text, "#text");
        node.node_value = value.to_string();
        node
    }

    #[test]
    fn test_extract_sample() {
        let arena = sample_arena();
        let extraction = extract(&arena, html_root(&arena), &ExtractConfig::default()).unwrap();

        let div = extraction.tree.elements().next().unwrap();
        assert_eq!(div.id, "x");
        assert_eq!(div.attrs.get("id").map(String::as_str), Some("x"));
        let span = div.elements().next().unwrap();
        assert_eq!(span.text, "Yo");
        assert_eq!(span.texts().collect::<Vec<_>>(), vec!["Yo"]);
        assert_eq!(extraction.ids.len(), 3);
    }

    #[test]
    fn test_style_and_inspector_attrs_excluded() {
        let mut arena = sample_arena();
        let div = arena.find_by_id("x").unwrap();
        {
            let node = arena.get_mut(div).unwrap();
            node.set_attr("style", "color: red");
            node.set_attr("class", "box");
            node.set_attr(LOOKUP_ATTR, "x");
        }
        let extraction = extract(&arena, html_root(&arena), &ExtractConfig::default()).unwrap();
        let div = extraction.tree.find("x").unwrap();
        assert_eq!(div.attrs.keys().collect::<Vec<_>>(), vec!["class", "id"]);
    }

    #[test]
    fn test_whitespace_text_dropped() {
        let mut arena = sample_arena();
        let div = arena.find_by_id("x").unwrap();
        add(&mut arena, div, text("   \n\t "));

        let extraction = extract(&arena, html_root(&arena), &ExtractConfig::default()).unwrap();
        let div = extraction.tree.find("x").unwrap();
        assert_eq!(div.text, "");
        assert_eq!(div.texts().count(), 0);
    }

    #[test]
    fn test_last_text_child_wins() {
        let mut arena = sample_arena();
        let div = arena.find_by_id("x").unwrap();
        add(&mut arena, div, text(" first "));
        add(&mut arena, div, text("  "));
        add(&mut arena, div, text("second"));

        let extraction = extract(&arena, html_root(&arena), &ExtractConfig::default()).unwrap();
        let div = extraction.tree.find("x").unwrap();
        assert_eq!(div.text, "second");
        assert_eq!(div.texts().collect::<Vec<_>>(), vec!["first", "second"]);
    }

    #[test]
    fn test_long_text_truncated() {
        let mut arena = sample_arena();
        let div = arena.find_by_id("x").unwrap();
        add(&mut arena, div, text("Hello World this is long text"));

        let extraction = extract(&arena, html_root(&arena), &ExtractConfig::default()).unwrap();
        let div = extraction.tree.find("x").unwrap();
        assert_eq!(div.text, "Hello World this is ...");
        assert_eq!(
            div.texts().collect::<Vec<_>>(),
            vec!["Hello World this is long text"]
        );
    }

    #[test]
    fn test_script_and_style_skipped_siblings_kept() {
        let mut arena = sample_arena();
        let div = arena.find_by_id("x").unwrap();
        let script = add(&mut arena, div, DomNode::new(0, NodeType::Element, "SCRIPT"));
        add(&mut arena, script, text("evil()"));
        let style = add(&mut arena, div, DomNode::new(0, NodeType::Element, "style"));
        add(&mut arena, style, DomNode::new(0, NodeType::Element, "b"));
        add(&mut arena, div, DomNode::new(0, NodeType::Element, "em"));

        let extraction = extract(&arena, html_root(&arena), &ExtractConfig::default()).unwrap();
        let div = extraction.tree.find("x").unwrap();
        let tags: Vec<_> = div.elements().map(|n| n.tag.as_str()).collect();
        assert_eq!(tags, vec!["span", "em"]);
        assert_eq!(extraction.tree.node_count(), 5);
        assert_eq!(extraction.ids.len(), 4);
    }

    #[test]
    fn test_comments_ignored() {
        let mut arena = sample_arena();
        let div = arena.find_by_id("x").unwrap();
        let mut comment = DomNode::new(0, NodeType::Comment, "#comment");
        comment.node_value = "note".to_string();
        add(&mut arena, div, comment);

        let extraction = extract(&arena, html_root(&arena), &ExtractConfig::default()).unwrap();
        assert_eq!(extraction.tree.find("x").unwrap().children.len(), 1);
    }

    #[test]
    fn test_non_element_root_rejected() {
        let arena = sample_arena();
        let text = arena.find_one(|n| n.is_text()).unwrap();
        assert!(matches!(
            extract(&arena, text, &ExtractConfig::default()),
            Err(DomError::InvalidNodeType { .. })
        ));
    }

    #[test]
    fn test_custom_preview_length() {
        let mut arena = sample_arena();
        let div = arena.find_by_id("x").unwrap();
        add(&mut arena, div, text("abcdef"));
        let config = ExtractConfig {
            text_preview_len: 3,
            ellipsis: "…".to_string(),
            ..ExtractConfig::default()
        };
        let extraction = extract(&arena, html_root(&arena), &config).unwrap();
        assert_eq!(extraction.tree.find("x").unwrap().text, "abc…");
    }

    #[test]
    fn test_deeply_nested_arena() {
        let mut arena = sample_arena();
        let mut parent = arena.find_by_id("x").unwrap();
        for _ in 0..50_000 {
            parent = add(&mut arena, parent, DomNode::new(0, NodeType::Element, "div"));
        }
        add(&mut arena, parent, text("bottom"));

        let extraction = extract(&arena, html_root(&arena), &ExtractConfig::default()).unwrap();
        assert_eq!(extraction.ids.len(), 50_003);
        // html, div#x, span, "Yo", the nested divs, "bottom"
        assert_eq!(extraction.tree.node_count(), 50_005);
        assert_eq!(extraction.tree.ids()[1], "x");
    }
}
