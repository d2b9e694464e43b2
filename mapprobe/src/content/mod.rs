//! Content resolution
//!
//! Finds the per-location document or image to show in each of the three
//! detail tabs. Candidate layers are probed in priority order; the first
//! one with content wins and a placeholder asset is used when none has any.
//!
//! All probes of one query share a [`LoadingToken`]. Cancelling it, or
//! starting a newer resolution of the same slot, aborts outstanding probes
//! and guarantees their results are dropped.

mod inflight;
mod key;
mod paths;
mod probe;
mod resolver;
mod token;
mod types;

pub use inflight::{ProbeHandle, ProbeRegistry, ProbeStats, RequestKey};
pub use key::{resolve_location_key, KeyProvenance, LocationKey, DEFAULT_RESERVED_ID_PREFIX};
pub use paths::{
    ContentSettings, ResolvedPaths, DEFAULT_BASEDIR, DEFAULT_BASE_URL, DEFAULT_DOCUMENT_EXTENSION,
    DEFAULT_FALLBACK_IMAGE, DEFAULT_ID_BASEDIR, DEFAULT_ID_BASE_URL, DEFAULT_IMAGE_EXTENSION,
    DEFAULT_LOAD_TIMEOUT, DEFAULT_SPEC_PREFIX, DEFAULT_TIMEOUT_IMAGE,
};
pub use probe::{is_remote, ContentProbe, DefaultProbe, FsProbe, HttpProbe, ProbeError};
pub use resolver::{Candidate, ContentRequest, ContentResolver, ResultBoard};
pub use token::{CancelReason, LoadingToken, TokenScope};
pub use types::{ContentRef, FallbackKind, SlotOutcome, SlotResolution, TabSlot};

#[cfg(test)]
pub use probe::tests::MockProbe;
