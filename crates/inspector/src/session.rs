//! Inspector Session Management
//!
//! Owns the published document and the highlight state for one preview.
//! Fetches are numbered when they start; a result is only published if no
//! newer fetch has been published already, so the tree and the augmented
//! markup always come from the same pass.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use dom::serializer::{DomSerializer, SerializerConfig};
use dom::{
    ComputedStyles, DomArena, DomService, DomServiceConfig, ExtractConfig, HighlightState,
    HighlightSynchronizer, MarkerSlot, Mutation, RenderSurface, StyleSource, TreeNode,
};

use crate::error::{InspectorError, Result};
use crate::events::{EventBus, InspectorEvent};

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub id: String,
    /// Characters of text kept in a node's preview
    pub text_preview_len: usize,
    /// Publish the whole document (with doctype) instead of the root element
    pub whole_document: bool,
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            text_preview_len: ExtractConfig::default().text_preview_len,
            whole_document: false,
            event_capacity: 1024,
        }
    }
}

impl SessionConfig {
    /// Settings for one extraction pass
    pub fn dom_config(&self) -> DomServiceConfig {
        DomServiceConfig {
            extract: ExtractConfig {
                text_preview_len: self.text_preview_len,
                ..ExtractConfig::default()
            },
            whole_document: self.whole_document,
            ..DomServiceConfig::default()
        }
    }
}

/// Handed out when a fetch starts; newer tickets win
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchTicket {
    pub generation: u64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading {
        url: String,
    },
    Ready,
    Failed {
        message: String,
    },
}

/// What happened to a completed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Published { node_count: usize },
    /// A newer document was already published; the result was dropped
    Stale,
}

/// Tree and augmented markup from a single extraction pass
#[derive(Debug, Clone)]
pub struct PublishedDocument {
    pub url: String,
    pub generation: u64,
    /// Immutable once published; shared with readers
    pub tree: Arc<TreeNode>,
    pub augmented_markup: String,
    whole_document: bool,
    rendered: DomArena,
}

impl PublishedDocument {
    /// In-memory mirror of the rendered markup, markers included
    pub fn rendered(&self) -> &DomArena {
        &self.rendered
    }

    /// Current rendered markup with hover/selection markers applied
    pub fn rendered_markup(&self) -> dom::Result<String> {
        let serializer = DomSerializer::with_config(SerializerConfig::default());
        if self.whole_document {
            return serializer.serialize(&self.rendered);
        }
        let root = self
            .rendered
            .node_id_by_lookup(&self.tree.id)
            .ok_or(dom::DomError::NoRootElement)?;
        serializer.serialize_outer(&self.rendered, root)
    }
}

/// User interaction from the tree panel or the preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Hover(Option<String>),
    Select(Option<String>),
}

struct SessionState {
    latest_generation: u64,
    status: LoadStatus,
    document: Option<PublishedDocument>,
    highlight: HighlightSynchronizer,
    computed_styles: Option<ComputedStyles>,
}

impl SessionState {
    fn is_stale(&self, generation: u64) -> bool {
        self.document
            .as_ref()
            .is_some_and(|doc| generation <= doc.generation)
    }
}

/// Inspector Session - one preview, its tree and its highlights
pub struct InspectorSession {
    pub config: SessionConfig,
    pub event_bus: EventBus,
    state: RwLock<SessionState>,
}

impl InspectorSession {
    pub fn new(config: SessionConfig) -> Self {
        let event_bus = EventBus::with_capacity(config.event_capacity);
        Self {
            config,
            event_bus,
            state: RwLock::new(SessionState {
                latest_generation: 0,
                status: LoadStatus::Idle,
                document: None,
                highlight: HighlightSynchronizer::new(),
                computed_styles: None,
            }),
        }
    }

    /// Register a new fetch
    pub async fn begin_fetch(&self, url: impl Into<String>) -> FetchTicket {
        let url = url.into();
        let ticket = {
            let mut state = self.state.write().await;
            state.latest_generation += 1;
            state.status = LoadStatus::Loading { url: url.clone() };
            FetchTicket {
                generation: state.latest_generation,
                url,
            }
        };

        tracing::debug!(url = %ticket.url, generation = ticket.generation, "Fetch started");
        self.event_bus.publish(InspectorEvent::FetchStarted {
            url: ticket.url.clone(),
            generation: ticket.generation,
        });

        ticket
    }

    /// Extract fetched markup and publish it unless a newer document exists
    ///
    /// On an extraction error the previously published document stays in
    /// place and the error is returned.
    pub async fn complete_fetch(&self, ticket: &FetchTicket, markup: &str) -> Result<FetchOutcome> {
        {
            let state = self.state.read().await;
            if ticket.generation == 0 || ticket.generation > state.latest_generation {
                return Err(InspectorError::UnknownGeneration(ticket.generation));
            }
            if state.is_stale(ticket.generation) {
                drop(state);
                return Ok(self.discard(ticket));
            }
        }

        // extraction runs without holding the lock
        let mut service = DomService::with_config(self.config.dom_config());
        let inspection = match service.inspect(markup) {
            Ok(inspection) => inspection,
            Err(err) => {
                self.fail_fetch(ticket, err.to_string()).await;
                return Err(err.into());
            }
        };

        let node_count = inspection.tree.node_count();
        {
            let mut state = self.state.write().await;
            // a newer fetch may have been published while extracting
            if state.is_stale(ticket.generation) {
                drop(state);
                return Ok(self.discard(ticket));
            }

            state.document = Some(PublishedDocument {
                url: ticket.url.clone(),
                generation: ticket.generation,
                tree: Arc::new(inspection.tree),
                augmented_markup: inspection.augmented_markup,
                whole_document: self.config.whole_document,
                rendered: inspection.document,
            });
            state.highlight.reset();
            state.computed_styles = None;
            if ticket.generation == state.latest_generation {
                state.status = LoadStatus::Ready;
            }
        }

        tracing::debug!(
            url = %ticket.url,
            generation = ticket.generation,
            node_count,
            "Document published"
        );
        self.event_bus.publish(InspectorEvent::DocumentPublished {
            url: ticket.url.clone(),
            generation: ticket.generation,
            node_count,
        });

        Ok(FetchOutcome::Published { node_count })
    }

    /// Record a failed fetch; the last published document is kept
    pub async fn fail_fetch(&self, ticket: &FetchTicket, message: impl Into<String>) {
        let message = message.into();
        {
            let mut state = self.state.write().await;
            if ticket.generation == state.latest_generation {
                state.status = LoadStatus::Failed {
                    message: message.clone(),
                };
            }
        }

        tracing::warn!(url = %ticket.url, generation = ticket.generation, %message, "Fetch failed");
        self.event_bus.publish(InspectorEvent::FetchFailed {
            url: ticket.url.clone(),
            generation: ticket.generation,
            message,
        });
    }

    /// Run a whole fetch: register it, await the body, then publish or fail
    pub async fn load<F, E>(&self, url: impl Into<String>, fetch: F) -> Result<FetchOutcome>
    where
        F: Future<Output = std::result::Result<String, E>>,
        E: Display,
    {
        let ticket = self.begin_fetch(url).await;
        match fetch.await {
            Ok(markup) => self.complete_fetch(&ticket, &markup).await,
            Err(err) => {
                let message = err.to_string();
                self.fail_fetch(&ticket, message.clone()).await;
                Err(InspectorError::FetchFailed(message))
            }
        }
    }

    fn discard(&self, ticket: &FetchTicket) -> FetchOutcome {
        tracing::debug!(
            url = %ticket.url,
            generation = ticket.generation,
            "Discarding result of superseded fetch"
        );
        self.event_bus.publish(InspectorEvent::FetchDiscarded {
            url: ticket.url.clone(),
            generation: ticket.generation,
        });
        FetchOutcome::Stale
    }

    pub async fn set_hovered(&self, id: Option<&str>) -> Result<Vec<Mutation>> {
        self.update_highlight(MarkerSlot::Hover, id, None).await
    }

    /// Changing the selection drops previously captured styles
    pub async fn set_selected(&self, id: Option<&str>) -> Result<Vec<Mutation>> {
        self.update_highlight(MarkerSlot::Selection, id, None).await
    }

    /// Select an element and capture its computed styles from the style source
    pub async fn select_with_styles(
        &self,
        id: &str,
        source: &impl StyleSource,
    ) -> Result<Option<ComputedStyles>> {
        self.set_selected(Some(id)).await?;

        let Some(styles) = source.computed_styles(id) else {
            return Ok(None);
        };
        {
            let mut state = self.state.write().await;
            if state.highlight.state().selected.as_deref() != Some(id) {
                return Ok(None);
            }
            state.computed_styles = Some(styles.clone());
        }

        self.event_bus.publish(InspectorEvent::StylesCaptured {
            id: id.to_string(),
            styles: styles.clone(),
        });
        Ok(Some(styles))
    }

    /// Apply an interaction made against the document of `generation`
    ///
    /// Ids from a document that is no longer published are ignored.
    pub async fn interact(&self, generation: u64, interaction: Interaction) -> Result<Vec<Mutation>> {
        let (slot, id) = match &interaction {
            Interaction::Hover(id) => (MarkerSlot::Hover, id.as_deref()),
            Interaction::Select(id) => (MarkerSlot::Selection, id.as_deref()),
        };
        self.update_highlight(slot, id, Some(generation)).await
    }

    /// Run one highlight transition against the published document
    ///
    /// With `expected_generation` set, the generation check and the
    /// transition happen under the same write guard.
    async fn update_highlight(
        &self,
        slot: MarkerSlot,
        id: Option<&str>,
        expected_generation: Option<u64>,
    ) -> Result<Vec<Mutation>> {
        let (mutations, changed) = {
            let mut guard = self.state.write().await;
            let state = &mut *guard;
            let document = state.document.as_mut().ok_or(InspectorError::NoDocument)?;

            if let Some(generation) = expected_generation.filter(|&g| g != document.generation) {
                tracing::debug!(
                    generation,
                    published = document.generation,
                    "Ignoring interaction on replaced document"
                );
                return Ok(Vec::new());
            }

            let changed = state.highlight.state().get(slot) != id;
            let mutations = match slot {
                MarkerSlot::Hover => state.highlight.set_hovered(&document.rendered, id),
                MarkerSlot::Selection => state.highlight.set_selected(&document.rendered, id),
            };
            document.rendered.apply_all(&mutations);

            if changed && slot == MarkerSlot::Selection {
                state.computed_styles = None;
            }
            (mutations, changed)
        };

        if changed {
            let id = id.map(str::to_string);
            let event = match slot {
                MarkerSlot::Hover => InspectorEvent::HoverChanged {
                    id,
                    mutations: mutations.clone(),
                },
                MarkerSlot::Selection => InspectorEvent::SelectionChanged {
                    id,
                    mutations: mutations.clone(),
                },
            };
            self.event_bus.publish(event);
        }

        Ok(mutations)
    }

    pub async fn status(&self) -> LoadStatus {
        self.state.read().await.status.clone()
    }

    pub async fn published_generation(&self) -> Option<u64> {
        self.state.read().await.document.as_ref().map(|doc| doc.generation)
    }

    /// Snapshot of the published document
    pub async fn document(&self) -> Option<PublishedDocument> {
        self.state.read().await.document.clone()
    }

    pub async fn tree(&self) -> Option<Arc<TreeNode>> {
        self.state
            .read()
            .await
            .document
            .as_ref()
            .map(|doc| Arc::clone(&doc.tree))
    }

    pub async fn augmented_markup(&self) -> Option<String> {
        self.state
            .read()
            .await
            .document
            .as_ref()
            .map(|doc| doc.augmented_markup.clone())
    }

    pub async fn rendered_markup(&self) -> Result<String> {
        let state = self.state.read().await;
        let document = state.document.as_ref().ok_or(InspectorError::NoDocument)?;
        Ok(document.rendered_markup()?)
    }

    pub async fn highlight_state(&self) -> HighlightState {
        self.state.read().await.highlight.state().clone()
    }

    pub async fn computed_styles(&self) -> Option<ComputedStyles> {
        self.state.read().await.computed_styles.clone()
    }

    /// Tree node for the current selection, if it is in the published tree
    pub async fn selected_node(&self) -> Option<TreeNode> {
        let state = self.state.read().await;
        let selected = state.highlight.state().selected.as_deref()?;
        state.document.as_ref()?.tree.find(selected).cloned()
    }
}

impl Default for InspectorSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
