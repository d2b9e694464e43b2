//! Content pipeline types.

use std::fmt;

use crate::layer::DisplayMode;

/// One of the three content tabs of the detail panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TabSlot(u8);

impl TabSlot {
    pub const FIRST: TabSlot = TabSlot(1);
    pub const SECOND: TabSlot = TabSlot(2);
    pub const THIRD: TabSlot = TabSlot(3);

    pub const ALL: [TabSlot; 3] = [Self::FIRST, Self::SECOND, Self::THIRD];

    /// Slot number `n`, if it is 1, 2 or 3.
    pub fn new(n: u8) -> Option<Self> {
        (1..=3).contains(&n).then_some(TabSlot(n))
    }

    pub fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for TabSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content found for a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRef {
    pub url: String,
    /// Layer whose paths produced the content.
    pub layer_id: String,
    /// Display title, the layer's name.
    pub title: String,
    pub mode: DisplayMode,
}

/// Why a slot fell back to a placeholder asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackKind {
    /// No candidate layer had content.
    NotFound,
    /// Nothing was found and at least one probe ran out of time.
    Timeout,
}

impl FallbackKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FallbackKind::NotFound => "not_found",
            FallbackKind::Timeout => "timeout",
        }
    }
}

impl fmt::Display for FallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of resolving one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOutcome {
    Found(ContentRef),
    Fallback { asset: String, kind: FallbackKind },
}

impl SlotOutcome {
    /// URL or asset path to display.
    pub fn url(&self) -> &str {
        match self {
            SlotOutcome::Found(content) => &content.url,
            SlotOutcome::Fallback { asset, .. } => asset,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SlotOutcome::Found(_))
    }
}

/// What a slot resolution produced.
///
/// A cancelled resolution has no outcome and must leave no trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotResolution {
    Completed(SlotOutcome),
    Cancelled,
}

impl SlotResolution {
    pub fn outcome(&self) -> Option<&SlotOutcome> {
        match self {
            SlotResolution::Completed(outcome) => Some(outcome),
            SlotResolution::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SlotResolution::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_slot_bounds() {
        assert_eq!(TabSlot::new(0), None);
        assert_eq!(TabSlot::new(1), Some(TabSlot::FIRST));
        assert_eq!(TabSlot::new(3), Some(TabSlot::THIRD));
        assert_eq!(TabSlot::new(4), None);
        assert_eq!(TabSlot::SECOND.to_string(), "2");
    }

    #[test]
    fn test_outcome_url() {
        let fallback = SlotOutcome::Fallback {
            asset: "noimage.png".into(),
            kind: FallbackKind::NotFound,
        };
        assert_eq!(fallback.url(), "noimage.png");
        assert!(!fallback.is_found());
        assert_eq!(SlotResolution::Cancelled.outcome(), None);
    }
}
