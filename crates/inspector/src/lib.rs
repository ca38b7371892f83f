//! Inspector Session - Rust Implementation
//!
//! Sits on top of the `dom` crate and keeps the state a page inspector needs
//! between user actions: the last published tree/markup pair, the hover and
//! selection markers on the rendered copy, and computed styles for the
//! selected element.
//!
//! # Architecture
//!
//! 1. **One pass, one publish**: tree and augmented markup are swapped in together
//! 2. **Newest fetch wins**: results are ordered by the generation handed out at start
//! 3. **Events, not callbacks**: state changes go out over a broadcast channel

pub mod error;
pub mod events;
pub mod session;

pub use error::{InspectorError, Result};
pub use events::{EventBus, InspectorEvent};
pub use session::{
    FetchOutcome, FetchTicket, InspectorSession, Interaction, LoadStatus, PublishedDocument,
    SessionConfig,
};
