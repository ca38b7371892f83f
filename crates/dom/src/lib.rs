//! Wireframe DOM Processing Library
//!
//! Turns fetched page markup into an inspector tree plus an augmented copy of
//! the markup where every tree element carries a lookup attribute, and keeps
//! hover/selection markers on the rendered copy in sync with tree ids.
//!
//! ## Core Design
//!
//! ```text
//! markup → scraper/html5ever → DomArena ─┬─ TreeExtractor → TreeNode
//!                                        │        ↓ IdentityMap
//!                                        └─ MarkupRewriter → augmented markup
//!
//! hover/select id → HighlightSynchronizer → Vec<Mutation> → RenderSurface
//! ```

pub mod arena;
pub mod error;
pub mod extract;
pub mod highlight;
pub mod identity;
pub mod rewriter;
pub mod serializer;
pub mod service;
pub mod style;
pub mod tree;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use error::{DomError, Result};
pub use extract::{ExtractConfig, Extraction, TreeExtractor};
pub use highlight::{
    HighlightState, HighlightSynchronizer, LookupIndex, MarkerSlot, Mutation, RenderSurface,
    ScrollBlock,
};
pub use identity::{IdSource, IdentityAssigner, IdentityMap, RandomIds};
pub use rewriter::MarkupRewriter;
pub use service::{inspect, inspect_fragment, DomService, DomServiceConfig, Inspection, ParseMode};
pub use style::{ComputedStyles, StyleSource};
pub use tree::{TextNode, TreeChild, TreeNode};
pub use types::*;
