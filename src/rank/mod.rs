//! Rank tiers and the prediction boundary
//!
//! The rank classifier itself is an external statistical model; this
//! module defines the tier vocabulary, per-tier eligibility masks used by
//! route configurations, and the [`RankPredictor`] trait the engine
//! consumes the model through. "No rank" is not an error: it is a valid
//! terminal signal that sends the ticket to manual handling.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ticket::Ticket;

/// Coarse priority classification of a ticket.
///
/// `Bar` is the explicit lowest tier (rendered as `-`); "no rank at all"
/// is modeled as `Option<Rank>::None` and short-circuits dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    A,
    B,
    C,
    D,
    Bar,
}

impl Rank {
    /// Numeric code used by the record store (100..=500).
    pub fn code(&self) -> u16 {
        match self {
            Rank::A => 100,
            Rank::B => 200,
            Rank::C => 300,
            Rank::D => 400,
            Rank::Bar => 500,
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rank::A => write!(f, "A"),
            Rank::B => write!(f, "B"),
            Rank::C => write!(f, "C"),
            Rank::D => write!(f, "D"),
            Rank::Bar => write!(f, "-"),
        }
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A" => Ok(Rank::A),
            "B" => Ok(Rank::B),
            "C" => Ok(Rank::C),
            "D" => Ok(Rank::D),
            "-" | "BAR" => Ok(Rank::Bar),
            _ => Err(format!("Unknown rank tier: {}", s)),
        }
    }
}

/// Per-tier eligibility switches on a route or allocation configuration.
///
/// The `bar` switch covers the Bar tier; tickets with no rank never reach
/// mask checks (they escalate at the first cascade step).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RankMask {
    pub a: bool,
    pub b: bool,
    pub c: bool,
    pub d: bool,
    pub bar: bool,
}

impl RankMask {
    /// Mask accepting every tier.
    pub fn all() -> Self {
        RankMask {
            a: true,
            b: true,
            c: true,
            d: true,
            bar: true,
        }
    }

    pub fn allows(&self, rank: Rank) -> bool {
        match rank {
            Rank::A => self.a,
            Rank::B => self.b,
            Rank::C => self.c,
            Rank::D => self.d,
            Rank::Bar => self.bar,
        }
    }
}

/// Boundary to the external rank classification model.
///
/// Implementations must not fail: an unclassifiable ticket yields `None`.
pub trait RankPredictor {
    fn predict(&self, ticket: &Ticket) -> Option<Rank>;
}

/// Predictor that trusts the rank carried on the ticket by the upstream
/// model-scoring stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvidedRankPredictor;

impl RankPredictor for ProvidedRankPredictor {
    fn predict(&self, ticket: &Ticket) -> Option<Rank> {
        ticket.predicted_rank
    }
}
