//! # Photo Booking Flow
//!
//! Multi-step booking flow for photo sessions: choose slots, confirm the
//! selection and price, then commit one reservation per slot against a
//! shared capacity ledger.
//!
//! Reservations are independent. Committing three slots may book two and
//! report the third as full; nothing is rolled back and every failure is
//! named in the resulting [`CommitReport`].
//!
//! ## Pieces
//!
//! - [`flow`]: the step machine (`select -> confirm -> complete`) as a
//!   [`Reducer`](photo_booking_core::reducer::Reducer)
//! - [`aggregator`]: commit plan, dispatch and outcome folding
//! - [`catalog`]: the slot snapshot read once at flow entry
//! - [`query`]: step and selection mirrored into query parameters
//! - [`ledger`]: capacity ledger contract, with [`http_ledger`] and
//!   [`memory_ledger`] implementations
//!
//! ## Example
//!
//! ```ignore
//! let ledger = Arc::new(InMemoryLedger::new());
//! let env = BookingFlowEnvironment::new(
//!     Arc::new(SystemClock),
//!     ledger.clone(),
//!     Arc::new(TracingNavigator::new()),
//!     user_id,
//! );
//! let store = enter_flow(&*ledger, session, env, "step=select").await?;
//! store.send(BookingFlowAction::ToggleSlot { slot_id }).await?;
//! ```

pub mod aggregator;
pub mod catalog;
pub mod config;
pub mod error;
pub mod flow;
pub mod http_ledger;
pub mod ledger;
pub mod memory_ledger;
pub mod metrics;
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;
pub mod navigator;
pub mod pricing;
pub mod query;
pub mod selection;
pub mod types;

pub use aggregator::{BookingOutcome, CommitDispatch, CommitReport, CommitTarget};
pub use catalog::{SlotCatalog, SlotCatalogSource};
pub use config::Config;
pub use error::{CatalogError, ConfigError, FailureKind, QueryError, ReservationError, ValidationError};
pub use flow::{
    BookingFlowAction, BookingFlowEnvironment, BookingFlowReducer, FlowState, FlowStep, Notice,
    NoticeLevel,
};
pub use http_ledger::HttpLedger;
pub use ledger::CapacityLedger;
pub use memory_ledger::InMemoryLedger;
pub use navigator::{Navigation, NavigationKind, Navigator, RevisionGate, TracingNavigator};
pub use query::FlowQuery;
pub use selection::{Selection, SelectionMode};
pub use types::{CapacityMode, Money, Session, SessionId, Slot, SlotId, TimeRange, UserId};

use photo_booking_runtime::Store;

/// Store running one booking flow
pub type BookingFlowStore =
    Store<FlowState, BookingFlowAction, BookingFlowEnvironment, BookingFlowReducer>;

/// Enter the flow for `session`
///
/// Loads the slot catalog once, derives the selection mode and hydrates the
/// flow from the page's current query string.
///
/// # Errors
///
/// Returns [`CatalogError`] if the slot list cannot be loaded.
pub async fn enter_flow(
    source: &dyn SlotCatalogSource,
    session: Session,
    env: BookingFlowEnvironment,
    query: &str,
) -> Result<BookingFlowStore, CatalogError> {
    let catalog = SlotCatalog::load(source, session.id).await?;
    let state = FlowState::new(session, catalog);

    tracing::info!(
        session_id = %state.session.id,
        mode = ?state.mode,
        slots = state.catalog.len(),
        "Entering booking flow"
    );

    let store = Store::new(state, BookingFlowReducer::new(), env);
    match store
        .send(BookingFlowAction::Hydrate {
            query: query.to_string(),
        })
        .await
    {
        Ok(mut handle) => handle.wait().await,
        Err(error) => tracing::warn!(%error, "Initial hydrate rejected"),
    }
    Ok(store)
}
