//! Ranked-summary controller.
//!
//! [`SummaryController`] ties a [`ProductSource`] to a [`Lifecycle`]: each
//! activation fetches the product collection once, decodes it, ranks one
//! field, and publishes the result. Activations are independent; a newer one
//! supersedes any still in flight, and [`SummaryController::teardown`] stops
//! all further updates.
//!
//! # Failure policy
//!
//! | Outcome | State | `visible_summaries()` |
//! |---------|-------|-----------------------|
//! | fetch ok, payload decodes | `Ready(ranked)` | ranked (possibly empty) |
//! | fetch ok, unexpected shape | `Ready([])` | empty |
//! | fetch fails | `Failed(reason)` | static fallback, count 0 |
//! | still loading | `Pending` | empty |

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::SummaryConfig;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::lifecycle::{Lifecycle, Ticket};
use crate::models::{decode_collection, LoadState, MaterialSummary, SummaryField};
use crate::summary::{fallback_summaries, rank_by_field, DescriptionCatalog, DEFAULT_TOP_N};

/// Supplies the raw product collection payload.
///
/// [`Gateway`] implements this with `GET /user/furniture`; tests substitute
/// in-memory sources.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn fetch_products(&self) -> Result<Value, GatewayError>;
}

#[async_trait]
impl ProductSource for Gateway {
    async fn fetch_products(&self) -> Result<Value, GatewayError> {
        self.fetch_furniture().await
    }
}

/// What to rank and how many entries to keep.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    pub field: SummaryField,
    pub top_n: usize,
    pub catalog: DescriptionCatalog,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            field: SummaryField::Material,
            top_n: DEFAULT_TOP_N,
            catalog: DescriptionCatalog::builtin(),
        }
    }
}

impl SummaryOptions {
    pub fn from_config(config: &SummaryConfig) -> anyhow::Result<Self> {
        Ok(Self {
            field: config.field.parse()?,
            top_n: config.top_n,
            catalog: DescriptionCatalog::with_overrides(&config.descriptions),
        })
    }
}

pub struct SummaryController {
    source: Arc<dyn ProductSource>,
    options: SummaryOptions,
    lifecycle: Lifecycle<Vec<MaterialSummary>>,
}

impl SummaryController {
    pub fn new(source: Arc<dyn ProductSource>, options: SummaryOptions) -> Self {
        Self {
            source,
            options,
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn options(&self) -> &SummaryOptions {
        &self.options
    }

    /// Start one activation with the controller's own options.
    ///
    /// The activation begins when this is called, not when the returned
    /// future is first polled, so a later call supersedes it even if this
    /// future has not run yet. Resolves to `true` if this activation's outcome
    /// was applied, `false` if it was superseded or the controller was torn
    /// down first.
    pub fn activate(&self) -> impl Future<Output = bool> + Send + '_ {
        self.activate_with(&self.options)
    }

    /// Start one activation with different parameters, e.g. after the view
    /// switched from materials to categories.
    pub fn activate_with<'a>(
        &'a self,
        options: &'a SummaryOptions,
    ) -> impl Future<Output = bool> + Send + 'a {
        let ticket = self.lifecycle.begin();
        self.run(ticket, options)
    }

    /// Start an activation now and drive it on a background task.
    pub fn spawn_activation(self: &Arc<Self>) -> JoinHandle<bool> {
        let ticket = self.lifecycle.begin();
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.run(ticket, &controller.options).await })
    }

    async fn run(&self, ticket: Option<Ticket>, options: &SummaryOptions) -> bool {
        let Some(ticket) = ticket else {
            debug!("activation ignored: controller torn down");
            return false;
        };

        let outcome = match self.source.fetch_products().await {
            Ok(payload) => Ok(summarize(payload, options)),
            Err(e) => {
                warn!(error = %e, "failed to load products");
                Err(format!("failed to load products: {}", e))
            }
        };

        let applied = self.lifecycle.settle(ticket, outcome);
        if !applied {
            debug!(
                generation = ticket.generation(),
                "discarding stale product response"
            );
        }
        applied
    }

    /// Discard every result that arrives from now on.
    pub fn teardown(&self) {
        self.lifecycle.teardown();
    }

    pub fn state(&self) -> LoadState<Vec<MaterialSummary>> {
        self.lifecycle.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState<Vec<MaterialSummary>>> {
        self.lifecycle.subscribe()
    }

    /// Summaries the presentation layer should render for the current state.
    pub fn visible_summaries(&self) -> Vec<MaterialSummary> {
        visible_for(&self.state())
    }
}

/// Map a load state to what gets rendered: the payload, the fallback list
/// on failure, or nothing while pending.
pub fn visible_for(state: &LoadState<Vec<MaterialSummary>>) -> Vec<MaterialSummary> {
    match state {
        LoadState::Pending => Vec::new(),
        LoadState::Ready(summaries) => summaries.clone(),
        LoadState::Failed(_) => fallback_summaries(),
    }
}

fn summarize(payload: Value, options: &SummaryOptions) -> Vec<MaterialSummary> {
    match decode_collection(payload) {
        Ok(records) => rank_by_field(&records, options.field, options.top_n, &options.catalog),
        Err(e) => {
            warn!(error = %e, "unexpected product payload, treating as empty");
            Vec::new()
        }
    }
}
