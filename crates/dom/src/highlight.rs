//! Highlight synchronization
//!
//! Hover and selection are two independent slots, each either unset or
//! holding one id. A transition is a pure function of the rendered
//! document's lookup index, the previous state and the new id; it yields the
//! next state plus the attribute mutations the rendering surface must apply.
//!
//! ```text
//! unset ──set(id)──▶ set(id) ──set(other)──▶ set(other)
//!   ▲                   │
//!   └──────set(None)────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::arena::DomArena;
use crate::types::{HOVER_ATTR, MARKER_VALUE, SELECTED_ATTR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSlot {
    Hover,
    Selection,
}

impl MarkerSlot {
    /// Marker attribute this slot toggles
    pub fn attribute(self) -> &'static str {
        match self {
            MarkerSlot::Hover => HOVER_ATTR,
            MarkerSlot::Selection => SELECTED_ATTR,
        }
    }
}

/// Current hover and selection ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightState {
    pub hovered: Option<String>,
    pub selected: Option<String>,
}

impl HighlightState {
    pub fn get(&self, slot: MarkerSlot) -> Option<&str> {
        match slot {
            MarkerSlot::Hover => self.hovered.as_deref(),
            MarkerSlot::Selection => self.selected.as_deref(),
        }
    }

    fn set(&mut self, slot: MarkerSlot, id: Option<String>) {
        match slot {
            MarkerSlot::Hover => self.hovered = id,
            MarkerSlot::Selection => self.selected = id,
        }
    }
}

/// Vertical alignment requested when scrolling an element into view
///
/// Selection always centers the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBlock {
    Center,
}

/// Change to apply to the rendered markup; `target` is a lookup id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    SetAttribute {
        target: String,
        name: String,
        value: String,
    },
    RemoveAttribute {
        target: String,
        name: String,
    },
    ScrollIntoView {
        target: String,
        block: ScrollBlock,
    },
}

impl Mutation {
    pub fn target(&self) -> &str {
        match self {
            Mutation::SetAttribute { target, .. }
            | Mutation::RemoveAttribute { target, .. }
            | Mutation::ScrollIntoView { target, .. } => target,
        }
    }
}

/// Answers whether the rendered markup has an element with a lookup id
pub trait LookupIndex {
    fn contains(&self, lookup_id: &str) -> bool;
}

impl LookupIndex for DomArena {
    fn contains(&self, lookup_id: &str) -> bool {
        self.node_id_by_lookup(lookup_id).is_some()
    }
}

/// Something that can apply mutations to a rendered document
pub trait RenderSurface {
    /// Returns false when the target element does not exist
    fn apply(&mut self, mutation: &Mutation) -> bool;

    fn apply_all(&mut self, mutations: &[Mutation]) {
        for mutation in mutations {
            self.apply(mutation);
        }
    }
}

/// In-memory mirror: markers land on arena attributes, scrolling is ignored
impl RenderSurface for DomArena {
    fn apply(&mut self, mutation: &Mutation) -> bool {
        let Some(node_id) = self.node_id_by_lookup(mutation.target()) else {
            return false;
        };
        let Ok(node) = self.get_mut(node_id) else {
            return false;
        };
        match mutation {
            Mutation::SetAttribute { name, value, .. } => node.set_attr(name, value.as_str()),
            Mutation::RemoveAttribute { name, .. } => {
                node.remove_attr(name);
            }
            Mutation::ScrollIntoView { .. } => {}
        }
        true
    }
}

/// Compute one slot transition
///
/// The previous marker is always cleared. A new id with no matching element
/// is still recorded in the state but produces no mutation.
pub fn transition(
    index: &impl LookupIndex,
    state: &HighlightState,
    slot: MarkerSlot,
    id: Option<&str>,
) -> (HighlightState, Vec<Mutation>) {
    let previous = state.get(slot);
    if previous == id {
        return (state.clone(), Vec::new());
    }

    let attribute = slot.attribute();
    let mut mutations = Vec::new();

    if let Some(previous) = previous {
        if index.contains(previous) {
            mutations.push(Mutation::RemoveAttribute {
                target: previous.to_string(),
                name: attribute.to_string(),
            });
        }
    }

    if let Some(id) = id {
        if index.contains(id) {
            mutations.push(Mutation::SetAttribute {
                target: id.to_string(),
                name: attribute.to_string(),
                value: MARKER_VALUE.to_string(),
            });
            if slot == MarkerSlot::Selection {
                mutations.push(Mutation::ScrollIntoView {
                    target: id.to_string(),
                    block: ScrollBlock::Center,
                });
            }
        } else {
            tracing::debug!(id, ?slot, "No rendered element for id");
        }
    }

    let mut next = state.clone();
    next.set(slot, id.map(str::to_string));
    (next, mutations)
}

/// Holds the state between transitions for one rendered document
#[derive(Debug, Clone, Default)]
pub struct HighlightSynchronizer {
    state: HighlightState,
}

impl HighlightSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &HighlightState {
        &self.state
    }

    pub fn set_hovered(&mut self, index: &impl LookupIndex, id: Option<&str>) -> Vec<Mutation> {
        self.update(index, MarkerSlot::Hover, id)
    }

    pub fn set_selected(&mut self, index: &impl LookupIndex, id: Option<&str>) -> Vec<Mutation> {
        self.update(index, MarkerSlot::Selection, id)
    }

    /// Back to unset/unset, for when the rendered markup is replaced
    pub fn reset(&mut self) {
        self.state = HighlightState::default();
    }

    fn update(
        &mut self,
        index: &impl LookupIndex,
        slot: MarkerSlot,
        id: Option<&str>,
    ) -> Vec<Mutation> {
        let (next, mutations) = transition(index, &self.state, slot, id);
        self.state = next;
        mutations
    }
}
