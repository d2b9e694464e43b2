//! Slot resolution.
//!
//! Each tab slot walks the candidate layers in priority order and probes
//! one URL per layer until something is found:
//!
//! ```text
//! Idle ─► Probing(layer 1) ─► found ───────────────► Found
//!              │ missing / timeout
//!              ▼
//!         Probing(layer 2) ─► ... ─► exhausted ────► Fallback
//!
//! abort / token cancelled at any point ────────────► Cancelled
//! ```
//!
//! Results are committed to a [`ResultBoard`]. A commit only lands while
//! the query's token is live and the resolution is still the latest one
//! started for its slot, so a stale resolution can never overwrite a
//! newer one.

use std::collections::HashMap;

use futures::future::join_all;
use parking_lot::Mutex;
use tracing::{debug, info};

use super::inflight::{ProbeRegistry, RequestKey};
use super::key::LocationKey;
use super::paths::{ContentSettings, ResolvedPaths};
use super::probe::{ContentProbe, ProbeError};
use super::token::LoadingToken;
use super::types::{ContentRef, FallbackKind, SlotOutcome, SlotResolution, TabSlot};
use crate::layer::DisplayMode;

/// One layer that may hold content for the location.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub layer_id: String,
    pub title: String,
    pub paths: ResolvedPaths,
    pub mode: DisplayMode,
    /// Whether the layer has a usable value at the point. Layers without
    /// one are skipped.
    pub has_value: bool,
}

/// Everything needed to resolve the slots of one query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentRequest {
    /// `None` when the location has no usable key.
    pub key: Option<LocationKey>,
    /// Most recently activated layer first.
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default)]
struct SlotEntry {
    ticket: u64,
    outcome: Option<SlotOutcome>,
}

/// Latest committed outcome per slot.
#[derive(Debug, Default)]
pub struct ResultBoard {
    slots: Mutex<HashMap<TabSlot, SlotEntry>>,
}

impl ResultBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new resolution for `slot`, clearing its outcome.
    ///
    /// Returns the ticket the resolution must present to commit.
    fn begin(&self, slot: TabSlot) -> u64 {
        let mut slots = self.slots.lock();
        let entry = slots.entry(slot).or_default();
        entry.ticket += 1;
        entry.outcome = None;
        entry.ticket
    }

    /// Stores `outcome` if `ticket` is still current and `token` is live.
    fn commit(
        &self,
        slot: TabSlot,
        ticket: u64,
        token: &LoadingToken,
        outcome: &SlotOutcome,
    ) -> bool {
        let mut slots = self.slots.lock();
        let Some(entry) = slots.get_mut(&slot) else {
            return false;
        };
        if entry.ticket != ticket || token.is_cancelled() {
            return false;
        }
        entry.outcome = Some(outcome.clone());
        true
    }

    pub fn get(&self, slot: TabSlot) -> Option<SlotOutcome> {
        self.slots
            .lock()
            .get(&slot)
            .and_then(|entry| entry.outcome.clone())
    }

    /// Committed outcomes in slot order.
    pub fn snapshot(&self) -> Vec<(TabSlot, SlotOutcome)> {
        let slots = self.slots.lock();
        let mut outcomes: Vec<_> = slots
            .iter()
            .filter_map(|(slot, entry)| entry.outcome.clone().map(|o| (*slot, o)))
            .collect();
        outcomes.sort_by_key(|(slot, _)| *slot);
        outcomes
    }
}

enum ProbeResult {
    Found,
    Missing(ProbeError),
    TimedOut,
    Aborted,
}

/// Resolves content for tab slots through a [`ContentProbe`].
pub struct ContentResolver<P> {
    probe: P,
    settings: ContentSettings,
    registry: ProbeRegistry,
    board: ResultBoard,
}

impl<P: ContentProbe> ContentResolver<P> {
    pub fn new(probe: P, settings: ContentSettings) -> Self {
        Self {
            probe,
            settings,
            registry: ProbeRegistry::new(),
            board: ResultBoard::new(),
        }
    }

    pub fn settings(&self) -> &ContentSettings {
        &self.settings
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn registry(&self) -> &ProbeRegistry {
        &self.registry
    }

    pub fn results(&self) -> &ResultBoard {
        &self.board
    }

    /// Resolves one slot.
    ///
    /// Probes in flight for the slot from an earlier resolution are aborted
    /// first. Returns [`SlotResolution::Cancelled`] without touching the
    /// result board if the token is cancelled, the slot is aborted, or a
    /// newer resolution of the slot started meanwhile.
    pub async fn resolve_slot(
        &self,
        slot: TabSlot,
        request: &ContentRequest,
        token: &LoadingToken,
    ) -> SlotResolution {
        if token.is_cancelled() {
            return SlotResolution::Cancelled;
        }

        self.registry.abort_slot(slot);
        let ticket = self.board.begin(slot);

        let mut timed_out = false;
        let mut found = None;

        match &request.key {
            Some(key) => {
                for candidate in request.candidates.iter().filter(|c| c.has_value) {
                    match self.probe_candidate(slot, key, candidate, token).await {
                        (url, ProbeResult::Found) => {
                            found = Some(ContentRef {
                                url,
                                layer_id: candidate.layer_id.clone(),
                                title: candidate.title.clone(),
                                mode: candidate.mode,
                            });
                            break;
                        }
                        (url, ProbeResult::Missing(e)) => {
                            debug!(slot = %slot, layer = %candidate.layer_id, url = %url, error = %e, "no content, trying next layer");
                        }
                        (url, ProbeResult::TimedOut) => {
                            timed_out = true;
                            debug!(slot = %slot, layer = %candidate.layer_id, url = %url, "probe timed out, trying next layer");
                        }
                        (url, ProbeResult::Aborted) => {
                            debug!(slot = %slot, layer = %candidate.layer_id, url = %url, token = token.id(), "probe aborted");
                            return SlotResolution::Cancelled;
                        }
                    }
                }
            }
            None => debug!(slot = %slot, "no location key, using fallback"),
        }

        let outcome = match found {
            Some(content) => SlotOutcome::Found(content),
            None => {
                let kind = if timed_out {
                    FallbackKind::Timeout
                } else {
                    FallbackKind::NotFound
                };
                SlotOutcome::Fallback {
                    asset: self.settings.fallback_asset(kind).to_string(),
                    kind,
                }
            }
        };

        if !self.board.commit(slot, ticket, token, &outcome) {
            debug!(slot = %slot, token = token.id(), "discarding stale slot result");
            return SlotResolution::Cancelled;
        }

        match &outcome {
            SlotOutcome::Found(content) => {
                info!(slot = %slot, layer = %content.layer_id, url = %content.url, "content resolved")
            }
            SlotOutcome::Fallback { asset, kind } => {
                info!(slot = %slot, kind = %kind, asset = %asset, "content fallback")
            }
        }
        SlotResolution::Completed(outcome)
    }

    /// Resolves all three slots concurrently.
    pub async fn resolve_all(
        &self,
        request: &ContentRequest,
        token: &LoadingToken,
    ) -> Vec<(TabSlot, SlotResolution)> {
        let resolutions = join_all(
            TabSlot::ALL
                .iter()
                .map(|slot| self.resolve_slot(*slot, request, token)),
        )
        .await;
        TabSlot::ALL.into_iter().zip(resolutions).collect()
    }

    /// Races one probe against its timeout and its abort signal.
    async fn probe_candidate(
        &self,
        slot: TabSlot,
        key: &LocationKey,
        candidate: &Candidate,
        token: &LoadingToken,
    ) -> (String, ProbeResult) {
        let url = candidate
            .paths
            .content_url(key, slot, candidate.mode, &self.settings);
        let handle = self
            .registry
            .register(RequestKey::new(slot, candidate.layer_id.clone()), token);
        debug!(slot = %slot, layer = %candidate.layer_id, url = %url, mode = %candidate.mode, "probe issued");

        let result = tokio::select! {
            biased;
            _ = handle.abort_token().cancelled() => ProbeResult::Aborted,
            probed = tokio::time::timeout(
                self.settings.load_timeout,
                self.probe.probe(&url, candidate.mode),
            ) => match probed {
                Ok(Ok(())) => ProbeResult::Found,
                Ok(Err(e)) => ProbeResult::Missing(e),
                Err(_) => ProbeResult::TimedOut,
            },
        };

        self.registry.complete(&handle);
        // An abort that lands after the probe finished still wins
        if handle.is_aborted() {
            return (url, ProbeResult::Aborted);
        }
        (url, result)
    }

    /// Aborts every probe of one slot.
    pub fn abort_slot(&self, slot: TabSlot) -> usize {
        self.registry.abort_slot(slot)
    }

    /// Aborts every in-flight probe.
    pub fn abort_all(&self) -> usize {
        self.registry.abort_all()
    }
}
