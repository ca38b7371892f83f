//! Markup rewriter
//!
//! Second pass after extraction: writes every chosen id onto its element as
//! the lookup attribute, then serializes the annotated document. Script and
//! style elements stay in the markup; they are only absent from the tree.

use crate::arena::DomArena;
use crate::error::Result;
use crate::identity::IdentityMap;
use crate::serializer::{DomSerializer, SerializerConfig};
use crate::types::NodeId;

pub struct MarkupRewriter {
    serializer: DomSerializer,
}

impl MarkupRewriter {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self {
            serializer: DomSerializer::with_config(config),
        }
    }

    /// Apply the identity map onto the arena
    ///
    /// Inspector attributes carried in from the source are dropped first, so
    /// afterwards only mapped elements hold a lookup id and no marker is set.
    pub fn annotate(&self, arena: &mut DomArena, ids: &IdentityMap) -> Result<()> {
        arena.strip_inspector_attributes();
        for (node_id, id) in ids.iter() {
            arena.set_lookup_id(node_id, id)?;
        }
        Ok(())
    }

    /// Annotate, then return the outer markup of `root`
    pub fn rewrite(&self, arena: &mut DomArena, root: NodeId, ids: &IdentityMap) -> Result<String> {
        self.annotate(arena, ids)?;
        let markup = self.serializer.serialize_outer(arena, root)?;
        tracing::debug!(
            annotated = ids.len(),
            bytes = markup.len(),
            "Rewrote markup with lookup attributes"
        );
        Ok(markup)
    }

    /// Annotate, then return the whole document (doctype per config)
    pub fn rewrite_document(&self, arena: &mut DomArena, ids: &IdentityMap) -> Result<String> {
        self.annotate(arena, ids)?;
        self.serializer.serialize(arena)
    }
}

impl Default for MarkupRewriter {
    fn default() -> Self {
        Self::new()
    }
}
