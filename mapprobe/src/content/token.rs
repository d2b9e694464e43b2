//! Loading tokens.
//!
//! One [`LoadingToken`] spans every probe started for a single query. A
//! token carries the reason it was cancelled so that logs can tell a
//! superseded query from a teardown.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::debug;

/// Why a token was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// A newer query replaced this one.
    Superseded,
    /// Cancelled on request.
    Explicit,
    /// The session is shutting down.
    Teardown,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Superseded => f.write_str("superseded"),
            CancelReason::Explicit => f.write_str("explicit"),
            CancelReason::Teardown => f.write_str("teardown"),
        }
    }
}

/// Cancellation scope of one query.
///
/// Clones share the same signal.
#[derive(Debug, Clone)]
pub struct LoadingToken {
    id: u64,
    token: CancellationToken,
    reason: Arc<Mutex<Option<CancelReason>>>,
}

impl LoadingToken {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            token: CancellationToken::new(),
            reason: Arc::new(Mutex::new(None)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Cancels the token. The first reason given sticks.
    pub fn cancel(&self, reason: CancelReason) {
        {
            let mut slot = self.reason.lock();
            if slot.is_none() {
                *slot = Some(reason);
                debug!(token = self.id, reason = %reason, "loading token cancelled");
            }
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn reason(&self) -> Option<CancelReason> {
        *self.reason.lock()
    }

    /// Resolves once the token is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// A token cancelled together with this one but also cancellable alone.
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }
}

/// Issues loading tokens, keeping exactly one live at a time.
#[derive(Debug, Default)]
pub struct TokenScope {
    next_id: AtomicU64,
    current: Mutex<Option<LoadingToken>>,
}

impl TokenScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the current token as superseded and issues a fresh one.
    pub fn begin(&self) -> LoadingToken {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let token = LoadingToken::new(id);
        let previous = self.current.lock().replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel(CancelReason::Superseded);
        }
        token
    }

    pub fn current(&self) -> Option<LoadingToken> {
        self.current.lock().clone()
    }

    /// Cancels the current token, if any. Returns whether one was live.
    pub fn cancel_current(&self, reason: CancelReason) -> bool {
        match self.current.lock().as_ref() {
            Some(token) if !token.is_cancelled() => {
                token.cancel(reason);
                true
            }
            _ => false,
        }
    }
}
