//! Command-driven query session.
//!
//! A session turns [`Command`]s into state changes and content
//! resolutions. Starting a query is split in two: [`QuerySession::prepare`]
//! runs synchronously, supersedes the previous query and computes the
//! location info, and [`PreparedQuery::run`] performs the probes. The
//! prepared query owns everything it needs, so it can be spawned while the
//! session keeps accepting commands.

use std::sync::Arc;

use tracing::{debug, info};

use super::context::{LayerData, QueryContext};
use super::info::{LocationInfo, QueryInput};
use super::QueryError;
use crate::content::{
    CancelReason, ContentProbe, ContentRequest, ContentResolver, LoadingToken, SlotOutcome,
    SlotResolution, TabSlot, TokenScope,
};
use crate::coord::Coordinate;

/// Inputs a session reacts to.
#[derive(Debug, Clone)]
pub enum Command {
    Query(QueryInput),
    /// Cancel the query in progress.
    Cancel,
    LayerActivated { layer_id: String, data: LayerData },
    LayerDeactivated { layer_id: String },
    /// Abort everything; the session is going away.
    Teardown,
}

/// Result of handling a [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Query(QueryOutcome),
    /// Whether a live query was cancelled.
    Cancelled(bool),
    /// Whether the layer is now active. `false` for unknown ids.
    LayerActivated(bool),
    /// Whether the layer had been active.
    LayerDeactivated(bool),
    /// Number of probes aborted.
    TornDown(usize),
}

/// Finished query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub token_id: u64,
    pub info: LocationInfo,
    pub slots: Vec<(TabSlot, SlotResolution)>,
}

impl QueryOutcome {
    pub fn slot(&self, slot: TabSlot) -> Option<&SlotResolution> {
        self.slots.iter().find(|(s, _)| *s == slot).map(|(_, r)| r)
    }

    pub fn outcome(&self, slot: TabSlot) -> Option<&SlotOutcome> {
        self.slot(slot).and_then(SlotResolution::outcome)
    }

    /// True if no slot completed.
    pub fn is_cancelled(&self) -> bool {
        self.slots.iter().all(|(_, r)| r.is_cancelled())
    }
}

/// A query whose synchronous part is done.
pub struct PreparedQuery<P> {
    info: LocationInfo,
    request: ContentRequest,
    token: LoadingToken,
    resolver: Arc<ContentResolver<P>>,
}

impl<P: ContentProbe> PreparedQuery<P> {
    pub fn info(&self) -> &LocationInfo {
        &self.info
    }

    pub fn request(&self) -> &ContentRequest {
        &self.request
    }

    pub fn token(&self) -> &LoadingToken {
        &self.token
    }

    /// Resolves all content slots.
    pub async fn run(self) -> QueryOutcome {
        let slots = self.resolver.resolve_all(&self.request, &self.token).await;
        if self.token.is_cancelled() {
            debug!(
                token = self.token.id(),
                reason = ?self.token.reason(),
                "query finished after cancellation"
            );
        }
        QueryOutcome {
            token_id: self.token.id(),
            info: self.info,
            slots,
        }
    }
}

/// Query state machine over a [`QueryContext`].
pub struct QuerySession<P> {
    context: QueryContext,
    resolver: Arc<ContentResolver<P>>,
    tokens: TokenScope,
}

impl<P: ContentProbe> QuerySession<P> {
    pub fn new(context: QueryContext, probe: P) -> Self {
        let settings = context.content_settings().clone();
        Self {
            context,
            resolver: Arc::new(ContentResolver::new(probe, settings)),
            tokens: TokenScope::new(),
        }
    }

    pub fn context(&self) -> &QueryContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut QueryContext {
        &mut self.context
    }

    pub fn resolver(&self) -> &Arc<ContentResolver<P>> {
        &self.resolver
    }

    /// Token of the latest query.
    pub fn current_token(&self) -> Option<LoadingToken> {
        self.tokens.current()
    }

    /// Starts a query, superseding the one in progress.
    ///
    /// An invalid coordinate is rejected before anything changes.
    pub fn prepare(&mut self, input: QueryInput) -> Result<PreparedQuery<P>, QueryError> {
        let coordinate = Coordinate::new(input.lat, input.lon)?;

        let token = self.tokens.begin();
        let info = self.context.location_info(coordinate, &input);
        let request = self.context.content_request(&info);
        info!(
            token = token.id(),
            lat = coordinate.lat,
            lon = coordinate.lon,
            key = request.key.as_ref().map(|k| k.key.as_str()).unwrap_or("-"),
            candidates = request.candidates.len(),
            "query started"
        );

        Ok(PreparedQuery {
            info,
            request,
            token,
            resolver: Arc::clone(&self.resolver),
        })
    }

    /// Prepares and runs a query.
    pub async fn query(&mut self, input: QueryInput) -> Result<QueryOutcome, QueryError> {
        Ok(self.prepare(input)?.run().await)
    }

    /// Cancels the query in progress.
    pub fn cancel(&self) -> bool {
        self.tokens.cancel_current(CancelReason::Explicit)
    }

    /// Aborts every in-flight probe and invalidates the current token.
    pub fn teardown(&self) -> usize {
        self.tokens.cancel_current(CancelReason::Teardown);
        let aborted = self.resolver.abort_all();
        info!(aborted, "session torn down");
        aborted
    }

    pub async fn handle(&mut self, command: Command) -> Result<CommandOutcome, QueryError> {
        match command {
            Command::Query(input) => Ok(CommandOutcome::Query(self.query(input).await?)),
            Command::Cancel => Ok(CommandOutcome::Cancelled(self.cancel())),
            Command::LayerActivated { layer_id, data } => {
                let state = self.context.activate(&layer_id, data)?;
                Ok(CommandOutcome::LayerActivated(state.is_some()))
            }
            Command::LayerDeactivated { layer_id } => {
                Ok(CommandOutcome::LayerDeactivated(self.context.deactivate(&layer_id)))
            }
            Command::Teardown => Ok(CommandOutcome::TornDown(self.teardown())),
        }
    }
}

impl<P> Drop for QuerySession<P> {
    fn drop(&mut self) {
        self.tokens.cancel_current(CancelReason::Teardown);
    }
}
