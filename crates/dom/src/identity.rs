//! Node identity assignment
//!
//! Every element that reaches the tree gets an id that is unique within one
//! traversal. Natural `id` attributes are reused verbatim, an existing lookup
//! attribute is reused next (so re-extracting augmented markup is stable),
//! and only then is a fresh `n-xxxxxxxxx` token drawn.
//!
//! Assignment is recorded into an [`IdentityMap`] keyed by arena index; the
//! rewriter applies it to the document in a second pass.

use ahash::{AHashMap, AHashSet};
use uuid::Uuid;

use crate::types::{DomNode, NodeId, LOOKUP_ATTR};

/// Prefix of synthesized ids
pub const SYNTHETIC_PREFIX: &str = "n-";

/// Length of the random token after the prefix
pub const TOKEN_LEN: usize = 9;

/// After this many collisions a counter suffix is appended to the token.
const MAX_RANDOM_ATTEMPTS: usize = 16;

/// Source of random alphanumeric tokens
pub trait IdSource {
    fn next_token(&mut self) -> String;
}

/// Default token source: lowercase hex taken from a v4 UUID
#[derive(Debug, Clone)]
pub struct RandomIds {
    len: usize,
}

impl RandomIds {
    pub fn new(len: usize) -> Self {
        // a simple-format UUID has 32 hex digits
        Self { len: len.clamp(1, 32) }
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new(TOKEN_LEN)
    }
}

impl IdSource for RandomIds {
    fn next_token(&mut self) -> String {
        let mut token = Uuid::new_v4().simple().to_string();
        token.truncate(self.len);
        token
    }
}

/// Ids chosen during one traversal, keyed by arena index
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    ids: AHashMap<NodeId, String>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node_id: NodeId, id: String) {
        self.ids.insert(node_id, id);
    }

    pub fn get(&self, node_id: NodeId) -> Option<&str> {
        self.ids.get(&node_id).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &str)> {
        self.ids.iter().map(|(&node_id, id)| (node_id, id.as_str()))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Hands out unique ids for the elements of one traversal
pub struct IdentityAssigner<S: IdSource = RandomIds> {
    source: S,
    prefix: String,
    assigned: AHashSet<String>,
}

impl IdentityAssigner<RandomIds> {
    pub fn new() -> Self {
        Self::with_source(RandomIds::default(), SYNTHETIC_PREFIX)
    }
}

impl Default for IdentityAssigner<RandomIds> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: IdSource> IdentityAssigner<S> {
    pub fn with_source(source: S, prefix: impl Into<String>) -> Self {
        Self {
            source,
            prefix: prefix.into(),
            assigned: AHashSet::new(),
        }
    }

    /// Choose the id for `node`. Never returns an id already handed out.
    pub fn assign(&mut self, node: &DomNode) -> String {
        if let Some(natural) = node.natural_id() {
            if self.claim(natural) {
                return natural.to_string();
            }
            tracing::warn!(
                id = natural,
                tag = %node.node_name,
                "Duplicate natural id, synthesizing a replacement"
            );
        }

        if let Some(existing) = node.attr(LOOKUP_ATTR).filter(|id| !id.is_empty()) {
            if self.claim(existing) {
                return existing.to_string();
            }
        }

        self.synthesize()
    }

    /// Number of ids handed out so far
    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }

    fn synthesize(&mut self) -> String {
        let mut attempt = 0usize;
        loop {
            let token = self.source.next_token();
            let candidate = if attempt < MAX_RANDOM_ATTEMPTS {
                format!("{}{}", self.prefix, token)
            } else {
                format!("{}{}-{}", self.prefix, token, attempt)
            };
            if self.claim(&candidate) {
                return candidate;
            }
            tracing::debug!(candidate = %candidate, attempt, "Synthesized id collided, retrying");
            attempt += 1;
        }
    }

    fn claim(&mut self, id: &str) -> bool {
        if self.assigned.contains(id) {
            return false;
        }
        self.assigned.insert(id.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeType;

    /// Replays a fixed list of tokens, repeating the last one forever
    struct ScriptedIds {
        tokens: Vec<&'static str>,
        next: usize,
    }

    impl IdSource for ScriptedIds {
        fn next_token(&mut self) -> String {
            let idx = self.next.min(self.tokens.len() - 1);
            self.next += 1;
            self.tokens[idx].to_string()
        }
    }

    fn element(attrs: &[(&str, &str)]) -> DomNode {
        let mut node = DomNode::new(0, NodeType::Element, "div");
        for (k, v) in attrs {
            node.set_attr(k, *v);
        }
        node
    }

    #[test]
    fn test_reuses_natural_id() {
        let mut assigner = IdentityAssigner::new();
        assert_eq!(assigner.assign(&element(&[("id", "hero")])), "hero");
    }

    #[test]
    fn test_synthesized_shape() {
        let mut assigner = IdentityAssigner::new();
        let id = assigner.assign(&element(&[]));
        assert!(id.starts_with(SYNTHETIC_PREFIX));
        assert_eq!(id.len(), SYNTHETIC_PREFIX.len() + TOKEN_LEN);
        assert!(id[2..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_reuses_lookup_attribute() {
        let mut assigner = IdentityAssigner::new();
        let node = element(&[(LOOKUP_ATTR, "n-abcdefghi")]);
        assert_eq!(assigner.assign(&node), "n-abcdefghi");
    }

    #[test]
    fn test_natural_id_wins_over_lookup_attribute() {
        let mut assigner = IdentityAssigner::new();
        let node = element(&[(LOOKUP_ATTR, "n-abcdefghi"), ("id", "x")]);
        assert_eq!(assigner.assign(&node), "x");
    }

    #[test]
    fn test_collision_retries() {
        let source = ScriptedIds {
            tokens: vec!["aaa", "aaa", "aaa", "bbb"],
            next: 0,
        };
        let mut assigner = IdentityAssigner::with_source(source, "n-");
        assert_eq!(assigner.assign(&element(&[])), "n-aaa");
        assert_eq!(assigner.assign(&element(&[])), "n-bbb");
        assert_eq!(assigner.assigned_count(), 2);
    }

    #[test]
    fn test_stuck_source_still_terminates() {
        let source = ScriptedIds {
            tokens: vec!["same"],
            next: 0,
        };
        let mut assigner = IdentityAssigner::with_source(source, "n-");
        let first = assigner.assign(&element(&[]));
        let second = assigner.assign(&element(&[]));
        assert_eq!(first, "n-same");
        assert_ne!(first, second);
        assert!(second.starts_with("n-same-"));
    }

    #[test]
    fn test_duplicate_natural_id_is_replaced() {
        let source = ScriptedIds {
            tokens: vec!["zzz"],
            next: 0,
        };
        let mut assigner = IdentityAssigner::with_source(source, "n-");
        assert_eq!(assigner.assign(&element(&[("id", "dup")])), "dup");
        assert_eq!(assigner.assign(&element(&[("id", "dup")])), "n-zzz");
    }

    #[test]
    fn test_identity_map() {
        let mut map = IdentityMap::new();
        assert!(map.is_empty());
        map.insert(3, "x".to_string());
        assert_eq!(map.get(3), Some("x"));
        assert_eq!(map.get(4), None);
        assert_eq!(map.len(), 1);
    }
}
