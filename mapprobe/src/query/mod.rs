//! Point queries
//!
//! Ties the other modules together: a query coordinate is turned into
//! location codes, per-layer values and styles, spatial matches and
//! finally resolved content for each tab slot.
//!
//! # Example
//!
//! ```no_run
//! use mapprobe::content::{ContentSettings, DefaultProbe};
//! use mapprobe::layer::{LayerRegistry, StyleDefaults};
//! use mapprobe::query::{QueryContext, QueryInput, QuerySession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = LayerRegistry::from_json(r#"{"layers": []}"#)?;
//! let context = QueryContext::new(registry, StyleDefaults::default(), ContentSettings::default());
//! let mut session = QuerySession::new(context, DefaultProbe::new(".")?);
//!
//! let outcome = session.query(QueryInput::from_text("35.6895, 139.6917")?).await?;
//! for line in outcome.info.describe() {
//!     println!("{}", line);
//! }
//! # Ok(())
//! # }
//! ```

mod context;
mod info;
mod session;

use thiserror::Error;

use crate::coord::CoordError;
use crate::layer::StateError;

pub use context::{LayerData, QueryContext};
pub use info::{LayerSample, LocationInfo, QueryInput, SampleValue};
pub use session::{Command, CommandOutcome, PreparedQuery, QueryOutcome, QuerySession};

/// Query errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("invalid location: {0}")]
    InvalidInput(#[from] CoordError),

    #[error(transparent)]
    State(#[from] StateError),
}
