//! DOM Serializer - Convert the arena back to HTML markup
//!
//! This module handles:
//! - outerHTML of a single element (what the preview surface renders)
//! - whole-document output with an optional doctype
//! - HTML escaping rules for text and attribute values
//! - void and raw-text elements

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::*;

/// Elements that never have an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text children are written without escaping
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "xmp",
];

/// Serializer configuration
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    /// Emit `<!DOCTYPE ...>` when serializing a whole document
    pub include_doctype: bool,
    pub include_comments: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            include_doctype: true,
            include_comments: true,
        }
    }
}

/// HTML serializer over a [`DomArena`]
pub struct DomSerializer {
    config: SerializerConfig,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Serialize the whole document starting at the arena root
    pub fn serialize(&self, arena: &DomArena) -> Result<String> {
        let mut output = String::with_capacity(4096);

        if let Some(root_id) = arena.root_id() {
            self.serialize_node(arena, root_id, &mut output)?;
        }

        Ok(output)
    }

    /// Serialize one node including its own tags (outerHTML)
    pub fn serialize_outer(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(4096);
        self.serialize_node(arena, node_id, &mut output)?;
        Ok(output)
    }

    /// Serialize a node and its subtree with an explicit work stack
    fn serialize_node(&self, arena: &DomArena, node_id: NodeId, output: &mut String) -> Result<()> {
        let mut stack = vec![Step::Open(node_id)];

        while let Some(step) = stack.pop() {
            let node_id = match step {
                Step::Open(node_id) => node_id,
                Step::RawText(node_id) => {
                    output.push_str(&arena.get(node_id)?.node_value);
                    continue;
                }
                Step::Close(node_id) => {
                    output.push_str("</");
                    output.push_str(&arena.get(node_id)?.node_name);
                    output.push('>');
                    continue;
                }
            };
            let node = arena.get(node_id)?;

            match node.node_type {
                NodeType::Element => {
                    output.push('<');
                    output.push_str(&node.node_name);
                    for (name, value) in &node.attributes {
                        output.push(' ');
                        output.push_str(name);
                        output.push_str("=\"");
                        escape_attribute(value, output);
                        output.push('"');
                    }
                    output.push('>');

                    if is_void(&node.node_name) {
                        continue;
                    }

                    stack.push(Step::Close(node_id));
                    let raw = is_raw_text(&node.node_name);
                    for &child_id in node.children_ids.iter().rev() {
                        if raw && arena.get(child_id)?.is_text() {
                            stack.push(Step::RawText(child_id));
                        } else {
                            stack.push(Step::Open(child_id));
                        }
                    }
                }
                NodeType::Text => escape_text(&node.node_value, output),
                NodeType::Comment => {
                    if self.config.include_comments {
                        output.push_str("<!--");
                        output.push_str(&node.node_value);
                        output.push_str("-->");
                    }
                }
                NodeType::DocumentType => {
                    if self.config.include_doctype {
                        output.push_str("<!DOCTYPE ");
                        output.push_str(&node.node_name);
                        output.push('>');
                    }
                }
                NodeType::Document | NodeType::DocumentFragment => {
                    // Document nodes only contribute their children
                    stack.extend(node.children_ids.iter().rev().map(|&id| Step::Open(id)));
                }
            }
        }

        Ok(())
    }
}

enum Step {
    Open(NodeId),
    RawText(NodeId),
    Close(NodeId),
}

impl Default for DomSerializer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}

fn escape_attribute(value: &str, output: &mut String) {
    for c in value.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::sample_arena;

    fn add(arena: &mut DomArena, parent: NodeId, node: DomNode) -> NodeId {
        let id = arena.add_node(node);
        arena.append_child(parent, id).unwrap();
        id
    }

    #[test]
    fn test_serialize_simple_dom() {
        let arena = sample_arena();
        let output = DomSerializer::new().serialize(&arena).unwrap();
        assert_eq!(output, r#"<html><div id="x"><span>Yo</span></div></html>"#);
    }

    #[test]
    fn test_outer_html_of_inner_element() {
        let arena = sample_arena();
        let span = arena.find_by_tag("span")[0];
        let output = DomSerializer::new().serialize_outer(&arena, span).unwrap();
        assert_eq!(output, "<span>Yo</span>");
    }

    #[test]
    fn test_escaping() {
        let mut arena = sample_arena();
        let div = arena.find_by_id("x").unwrap();
        arena
            .get_mut(div)
            .unwrap()
            .set_attr("title", "a \"quoted\" & <b>");
        let mut text = DomNode::new(0, NodeType::Text, "#text");
        text.node_value = "1 < 2 & 3 > 0\u{a0}".to_string();
        add(&mut arena, div, text);

        let output = DomSerializer::new().serialize_outer(&arena, div).unwrap();
        assert_eq!(
            output,
            r#"<div id="x" title="a &quot;quoted&quot; &amp; <b>"><span>Yo</span>1 &lt; 2 &amp; 3 &gt; 0&nbsp;</div>"#
        );
    }

    #[test]
    fn test_void_and_raw_text() {
        let mut arena = sample_arena();
        let div = arena.find_by_id("x").unwrap();
        let mut img = DomNode::new(0, NodeType::Element, "img");
        img.set_attr("src", "a.png");
        add(&mut arena, div, img);
        let script = add(&mut arena, div, DomNode::new(0, NodeType::Element, "script"));
        let mut code = DomNode::new(0, NodeType::Text, "#text");
        code.node_value = "if (a < b && c) {}".to_string();
        add(&mut arena, script, code);

        let output = DomSerializer::new().serialize_outer(&arena, div).unwrap();
        assert_eq!(
            output,
            r#"<div id="x"><span>Yo</span><img src="a.png"><script>if (a < b && c) {}</script></div>"#
        );
    }

    #[test]
    fn test_doctype_and_comments_configurable() {
        let mut arena = sample_arena();
        let root = arena.root_id().unwrap();
        let doctype = arena.add_node(DomNode::new(0, NodeType::DocumentType, "html"));
        arena.get_mut(doctype).unwrap().parent_id = Some(root);
        arena.get_mut(root).unwrap().children_ids.insert(0, doctype);
        let div = arena.find_by_id("x").unwrap();
        let mut comment = DomNode::new(0, NodeType::Comment, "#comment");
        comment.node_value = " note ".to_string();
        add(&mut arena, div, comment);

        let full = DomSerializer::new().serialize(&arena).unwrap();
        assert_eq!(
            full,
            r#"<!DOCTYPE html><html><div id="x"><span>Yo</span><!-- note --></div></html>"#
        );

        let bare = DomSerializer::with_config(SerializerConfig {
            include_doctype: false,
            include_comments: false,
        })
        .serialize(&arena)
        .unwrap();
        assert_eq!(bare, r#"<html><div id="x"><span>Yo</span></div></html>"#);
    }

    #[test]
    fn test_deep_nesting_serialized() {
        let depth = 50_000;
        let mut arena = DomArena::new();
        let mut parent = arena.add_node(DomNode::new(0, NodeType::Element, "div"));
        arena.set_root(parent).unwrap();
        for _ in 1..depth {
            parent = add(&mut arena, parent, DomNode::new(0, NodeType::Element, "div"));
        }
        let mut text = DomNode::new(0, NodeType::Text, "#text");
        text.node_value = "a<b".to_string();
        add(&mut arena, parent, text);

        let html = DomSerializer::new().serialize(&arena).unwrap();
        assert_eq!(html.len(), depth * "<div></div>".len() + "a&lt;b".len());
        assert!(html.starts_with("<div><div>"));
        assert!(html.contains("<div>a&lt;b</div>"));
        assert!(html.ends_with("</div></div>"));
    }
}
