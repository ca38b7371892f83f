//! DOM Service - Main entry point for DOM operations
//!
//! This handles:
//! - Parsing raw markup (html5ever via `scraper`) into the arena
//! - Picking the extraction root for document or fragment input
//! - Running extraction and rewriting as one all-or-nothing step

use ego_tree::NodeRef;
use scraper::{Html, Node};

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::extract::{ExtractConfig, TreeExtractor};
use crate::identity::{IdSource, IdentityAssigner};
use crate::rewriter::MarkupRewriter;
use crate::serializer::SerializerConfig;
use crate::tree::TreeNode;
use crate::types::*;

/// How raw markup is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Full page; the tree root is the document element
    #[default]
    Document,
    /// Markup snippet with exactly one top-level element
    Fragment,
}

/// Configuration for DOM service
#[derive(Debug, Clone)]
pub struct DomServiceConfig {
    pub mode: ParseMode,
    pub extract: ExtractConfig,
    pub serializer: SerializerConfig,
    /// Serialize the whole document (doctype, top-level comments) instead of
    /// only the root element's outer markup
    pub whole_document: bool,
}

impl Default for DomServiceConfig {
    fn default() -> Self {
        Self {
            mode: ParseMode::Document,
            extract: ExtractConfig::default(),
            serializer: SerializerConfig::default(),
            whole_document: false,
        }
    }
}

/// Result of one successful inspection: the tree and its matching markup
#[derive(Debug, Clone)]
pub struct Inspection {
    pub tree: TreeNode,
    /// Original document with a lookup attribute on every tree element
    pub augmented_markup: String,
    /// Annotated arena; mirrors what the rendering surface shows
    pub document: DomArena,
}

/// Main DOM service
pub struct DomService {
    config: DomServiceConfig,
    arena: DomArena,
}

impl DomService {
    /// Create new DOM service with default config
    pub fn new() -> Self {
        Self::with_config(DomServiceConfig::default())
    }

    /// Create DOM service with custom config
    pub fn with_config(config: DomServiceConfig) -> Self {
        Self {
            config,
            arena: DomArena::new(),
        }
    }

    pub fn config(&self) -> &DomServiceConfig {
        &self.config
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    /// Get mutable reference to internal arena
    pub fn arena_mut(&mut self) -> &mut DomArena {
        &mut self.arena
    }

    /// Parse markup and build the arena, returning the document node
    pub fn parse_html(&mut self, markup: &str) -> Result<NodeId> {
        if markup.trim().is_empty() {
            return Err(DomError::EmptyDocument);
        }

        let html = match self.config.mode {
            ParseMode::Document => Html::parse_document(markup),
            ParseMode::Fragment => Html::parse_fragment(markup),
        };
        if let Some(first) = html.errors.first() {
            tracing::debug!(
                count = html.errors.len(),
                first = %first,
                "Recovered from malformed markup"
            );
        }

        self.arena.clear();
        let root_id = match self.config.mode {
            ParseMode::Document => self.import_node(html.tree.root(), None)?,
            ParseMode::Fragment => {
                // html5ever wraps fragment content in an <html> context element
                let fragment = self.arena.add_node(DomNode::new(
                    0,
                    NodeType::DocumentFragment,
                    "#document-fragment",
                ));
                for child in html.root_element().children() {
                    self.import_node(child, Some(fragment))?;
                }
                fragment
            }
        };
        self.arena.set_root(root_id)?;

        Ok(root_id)
    }

    /// Copy a parsed subtree into the arena, returning the id of its root
    ///
    /// Iterative so nesting depth is bounded by the heap, not the stack.
    fn import_node(&mut self, node: NodeRef<'_, Node>, parent_id: Option<NodeId>) -> Result<NodeId> {
        let mut stack = vec![(node, parent_id)];
        let mut root_id = None;

        while let Some((node, parent_id)) = stack.pop() {
            let node_id = self.arena.add_node(convert_node(node.value()));
            if let Some(parent_id) = parent_id {
                self.arena.append_child(parent_id, node_id)?;
            }
            root_id.get_or_insert(node_id);

            // Push children in reverse order so they're appended left-to-right
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev().map(|child| (child, Some(node_id))));
        }

        root_id.ok_or(DomError::NoRootElement)
    }

    /// Element the tree is built from, per parse mode
    pub fn extraction_root(&self) -> Result<NodeId> {
        let elements = self.arena.top_level_elements()?;
        match (self.config.mode, elements.as_slice()) {
            (_, []) => Err(DomError::NoRootElement),
            (ParseMode::Document, [root, ..]) => Ok(*root),
            (ParseMode::Fragment, [root]) => Ok(*root),
            (ParseMode::Fragment, many) => Err(DomError::MultipleRoots(many.len())),
        }
    }

    /// Parse, extract and rewrite with random ids
    pub fn inspect(&mut self, markup: &str) -> Result<Inspection> {
        self.inspect_with(markup, IdentityAssigner::new())
    }

    /// Parse, extract and rewrite using the given id assigner
    ///
    /// Either everything succeeds or nothing is returned; the arena keeps the
    /// annotated document afterwards.
    pub fn inspect_with<S: IdSource>(
        &mut self,
        markup: &str,
        assigner: IdentityAssigner<S>,
    ) -> Result<Inspection> {
        self.parse_html(markup)?;
        let root = self.extraction_root()?;

        let extraction =
            TreeExtractor::with_assigner(&self.arena, &self.config.extract, assigner).extract(root)?;

        let rewriter = MarkupRewriter::with_config(self.config.serializer.clone());
        let augmented_markup = if self.config.whole_document {
            rewriter.rewrite_document(&mut self.arena, &extraction.ids)?
        } else {
            rewriter.rewrite(&mut self.arena, root, &extraction.ids)?
        };

        tracing::debug!(
            nodes = self.arena.len(),
            tree_nodes = extraction.tree.node_count(),
            "Inspection complete"
        );

        Ok(Inspection {
            tree: extraction.tree,
            augmented_markup,
            document: self.arena.clone(),
        })
    }
}

impl Default for DomService {
    fn default() -> Self {
        Self::new()
    }
}

/// Arena node for one parsed node, without links
fn convert_node(node: &Node) -> DomNode {
    match node {
        Node::Document => DomNode::new(0, NodeType::Document, "#document"),
        Node::Fragment => DomNode::new(0, NodeType::DocumentFragment, "#document-fragment"),
        Node::Doctype(doctype) => DomNode::new(0, NodeType::DocumentType, doctype.name()),
        Node::Comment(comment) => {
            let mut dom_node = DomNode::new(0, NodeType::Comment, "#comment");
            dom_node.node_value = String::from(&**comment);
            dom_node
        }
        Node::Text(text) => {
            let mut dom_node = DomNode::new(0, NodeType::Text, "#text");
            dom_node.node_value = String::from(&**text);
            dom_node
        }
        Node::Element(element) => {
            let mut dom_node = DomNode::new(0, NodeType::Element, element.name());
            // keep foreign prefixes (xlink:href, xml:lang) in the attribute name
            dom_node.attributes = element
                .attrs
                .iter()
                .map(|(name, value)| {
                    let qualified = match name.prefix.as_deref() {
                        Some(prefix) => format!("{}:{}", prefix, &*name.local),
                        None => name.local.to_string(),
                    };
                    (qualified, value.to_string())
                })
                .collect();
            dom_node
        }
        // the HTML parser never yields these; keep the data as a comment
        Node::ProcessingInstruction(pi) => {
            let mut dom_node = DomNode::new(0, NodeType::Comment, "#comment");
            dom_node.node_value = String::from(&**pi);
            dom_node
        }
    }
}

/// Inspect a full page with default settings
pub fn inspect(markup: &str) -> Result<Inspection> {
    DomService::new().inspect(markup)
}

/// Inspect a single-rooted markup fragment with default settings
pub fn inspect_fragment(markup: &str) -> Result<Inspection> {
    DomService::with_config(DomServiceConfig {
        mode: ParseMode::Fragment,
        ..DomServiceConfig::default()
    })
    .inspect(markup)
}
