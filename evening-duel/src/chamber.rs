//! Shared chamber of live and blank rounds with a single-slot lookahead.
//!
//! Whatever [`Chamber::peek`] reveals is exactly what the next
//! [`Chamber::draw`] fires, no matter who pulls the trigger.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::{DuelConfig, DuelConfigError};
use crate::rng::RollSource;

/// Kind of round sitting in the chamber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundKind {
    Live,
    Blank,
}

impl RoundKind {
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Live => "live round",
            Self::Blank => "blank",
        }
    }
}

impl fmt::Display for RoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Memo of the next round's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lookahead {
    #[default]
    Empty,
    Live,
    Blank,
}

impl Lookahead {
    #[must_use]
    pub const fn known(self) -> Option<RoundKind> {
        match self {
            Self::Empty => None,
            Self::Live => Some(RoundKind::Live),
            Self::Blank => Some(RoundKind::Blank),
        }
    }
}

impl From<RoundKind> for Lookahead {
    fn from(kind: RoundKind) -> Self {
        match kind {
            RoundKind::Live => Self::Live,
            RoundKind::Blank => Self::Blank,
        }
    }
}

/// Errors raised when restoring a chamber from saved state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChamberStateError {
    #[error(transparent)]
    Config(#[from] DuelConfigError),
    #[error("{live} live and {blank} blank rounds overflow a chamber of {capacity}")]
    Overfilled { live: u8, blank: u8, capacity: u8 },
    #[error("cached {kind} has no matching round left")]
    StalePreview { kind: RoundKind },
}

/// Saved chamber fields, checked before they become a [`Chamber`].
#[derive(Deserialize)]
struct ChamberState {
    live: u8,
    blank: u8,
    #[serde(default)]
    lookahead: Lookahead,
    capacity: u8,
    min_live: u8,
    max_live: u8,
}

impl TryFrom<ChamberState> for Chamber {
    type Error = ChamberStateError;

    fn try_from(state: ChamberState) -> Result<Self, Self::Error> {
        let shape = DuelConfig {
            chamber_capacity: state.capacity,
            min_live: state.min_live,
            max_live: state.max_live,
            ..DuelConfig::compiled()
        };
        shape.validate()?;
        if u16::from(state.live) + u16::from(state.blank) > u16::from(state.capacity) {
            return Err(ChamberStateError::Overfilled {
                live: state.live,
                blank: state.blank,
                capacity: state.capacity,
            });
        }
        let left = |kind: RoundKind| match kind {
            RoundKind::Live => state.live,
            RoundKind::Blank => state.blank,
        };
        if let Some(kind) = state.lookahead.known()
            && left(kind) == 0
        {
            return Err(ChamberStateError::StalePreview { kind });
        }
        let mut chamber = Self::unloaded(&shape);
        chamber.live = state.live;
        chamber.blank = state.blank;
        chamber.lookahead = state.lookahead;
        Ok(chamber)
    }
}

/// Remaining rounds of one loaded cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChamberState")]
pub struct Chamber {
    live: u8,
    blank: u8,
    lookahead: Lookahead,
    capacity: u8,
    min_live: u8,
    max_live: u8,
}

impl Chamber {
    /// Empty chamber shaped by `cfg`; callers reload before the first draw.
    ///
    /// # Errors
    ///
    /// Returns an error if `cfg` fails validation.
    pub fn empty(cfg: &DuelConfig) -> Result<Self, DuelConfigError> {
        cfg.validate()?;
        Ok(Self::unloaded(cfg))
    }

    /// Freshly loaded chamber.
    ///
    /// # Errors
    ///
    /// Returns an error if `cfg` fails validation.
    pub fn loaded(cfg: &DuelConfig, rng: &mut impl RollSource) -> Result<Self, DuelConfigError> {
        let mut chamber = Self::empty(cfg)?;
        chamber.reload(rng);
        Ok(chamber)
    }

    /// Shape taken from a config the caller has already validated.
    pub(crate) const fn unloaded(cfg: &DuelConfig) -> Self {
        Self {
            live: 0,
            blank: 0,
            lookahead: Lookahead::Empty,
            capacity: cfg.chamber_capacity,
            min_live: cfg.min_live,
            max_live: cfg.max_live,
        }
    }

    #[must_use]
    pub const fn live_count(&self) -> u8 {
        self.live
    }

    #[must_use]
    pub const fn blank_count(&self) -> u8 {
        self.blank
    }

    #[must_use]
    pub const fn remaining(&self) -> u8 {
        self.live.saturating_add(self.blank)
    }

    #[must_use]
    pub const fn lookahead(&self) -> Lookahead {
        self.lookahead
    }

    #[must_use]
    pub const fn needs_reload(&self) -> bool {
        self.remaining() == 0
    }

    /// Only live rounds remain.
    #[must_use]
    pub const fn only_live(&self) -> bool {
        self.blank == 0 && self.live > 0
    }

    /// Only blanks remain.
    #[must_use]
    pub const fn only_blank(&self) -> bool {
        self.live == 0 && self.blank > 0
    }

    /// Discard everything and load a fresh cycle. Foreknowledge does not survive.
    pub fn reload(&mut self, rng: &mut impl RollSource) {
        let span = u32::from(self.max_live.saturating_sub(self.min_live)) + 1;
        let extra = u8::try_from(rng.roll_below(span)).unwrap_or(0);
        self.live = self.min_live.saturating_add(extra);
        self.blank = self.capacity.saturating_sub(self.live);
        self.lookahead = Lookahead::Empty;
        log::debug!(
            "chamber reloaded: {} live / {} blank",
            self.live,
            self.blank
        );
    }

    /// Reveal the next round without consuming it. Repeated peeks agree.
    pub fn peek(&mut self, rng: &mut impl RollSource) -> RoundKind {
        if let Some(kind) = self.lookahead.known() {
            return kind;
        }
        self.reload_if_spent(rng);
        let kind = rng.roll_weighted(self.live, self.blank);
        self.lookahead = kind.into();
        kind
    }

    /// Fire the next round, honoring any cached preview.
    pub fn draw(&mut self, rng: &mut impl RollSource) -> RoundKind {
        let kind = match self.lookahead.known() {
            Some(kind) => kind,
            None => {
                self.reload_if_spent(rng);
                rng.roll_weighted(self.live, self.blank)
            }
        };
        self.lookahead = Lookahead::Empty;
        match kind {
            RoundKind::Live => self.live = self.live.saturating_sub(1),
            RoundKind::Blank => self.blank = self.blank.saturating_sub(1),
        }
        log::debug!(
            "drew {kind}; {} live / {} blank left",
            self.live,
            self.blank
        );
        kind
    }

    /// Pin the next round to a kind that is already certain.
    ///
    /// Only honored when the chamber holds nothing but `kind`, so the pinned
    /// value can never disagree with the counts.
    pub(crate) fn pin_certain(&mut self, kind: RoundKind) -> bool {
        let certain = match kind {
            RoundKind::Live => self.only_live(),
            RoundKind::Blank => self.only_blank(),
        };
        if certain {
            self.lookahead = kind.into();
        }
        certain
    }

    fn reload_if_spent(&mut self, rng: &mut impl RollSource) {
        if self.needs_reload() {
            log::warn!("chamber empty at draw time; forcing reload");
            self.reload(rng);
        }
    }
}
