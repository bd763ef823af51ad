//! Routing decision types

use serde::Serialize;

use crate::rank::Rank;
use crate::ticket::{OrgPath, UnitId};

/// Strategy class that produced a routing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Forwarded untouched to the destination (account or visit route).
    Through,
    /// Forwarded without center handling, proposal attached.
    NoTouch,
    /// Forwarded to the branch responsible for the area.
    BranchPriority,
    /// Fair-allocated to a destination of the normal pool.
    Normal,
    /// No automated destination; the ticket stays at the window.
    Escalate,
}

impl StrategyKind {
    /// Numeric category code used by the record store; escalations carry
    /// no category.
    pub fn code(&self) -> Option<u16> {
        match self {
            StrategyKind::Through => Some(100),
            StrategyKind::NoTouch => Some(200),
            StrategyKind::BranchPriority => Some(300),
            StrategyKind::Normal => Some(400),
            StrategyKind::Escalate => None,
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Through => write!(f, "through"),
            StrategyKind::NoTouch => write!(f, "no-touch"),
            StrategyKind::BranchPriority => write!(f, "branch-priority"),
            StrategyKind::Normal => write!(f, "normal"),
            StrategyKind::Escalate => write!(f, "escalate"),
        }
    }
}

/// Whether the destination handles the ticket through the BCC flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BccStatus {
    /// Forwarded outside the BCC flow (code 100).
    Unsupported,
    /// Forwarded with BCC support (code 200).
    Supported,
}

impl BccStatus {
    pub fn code(&self) -> u16 {
        match self {
            BccStatus::Unsupported => 100,
            BccStatus::Supported => 200,
        }
    }
}

/// Why a through route bypassed the BCC flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BccUnsupportedReason {
    /// The ticket has a managed account (code 100).
    ExistingAccount,
    /// The customer asked for a visit (code 200).
    VisitPreferred,
}

impl BccUnsupportedReason {
    pub fn code(&self) -> u16 {
        match self {
            BccUnsupportedReason::ExistingAccount => 100,
            BccUnsupportedReason::VisitPreferred => 200,
        }
    }
}

/// Audit record of one allocation candidate: its load within the window,
/// configured rate, and the resulting priority value.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateLoad {
    pub unit: UnitId,
    pub destination: OrgPath,
    pub occurrences: u64,
    pub rate: f64,
    pub priority: f64,
}

/// Outcome of a fair allocation: the winner plus the full candidate audit
/// ordered by ascending priority value.
#[derive(Debug, Clone, Serialize)]
pub struct Allocation {
    pub winner: CandidateLoad,
    pub audit: Vec<CandidateLoad>,
}

/// The single routing decision produced for a ticket.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingDecision {
    pub kind: StrategyKind,
    pub rank: Option<Rank>,
    /// Destination path; `None` for escalations (the ticket keeps its
    /// current window).
    pub destination: Option<OrgPath>,
    pub bcc: Option<BccStatus>,
    pub bcc_reason: Option<BccUnsupportedReason>,
    /// Whether committing this decision requires a proposal record first.
    pub needs_proposal: bool,
    /// Fixed human-readable note attached for escalations.
    pub annotation: Option<String>,
    /// Candidate audit, present for normal routing only.
    pub allocation: Option<Allocation>,
}

impl RoutingDecision {
    pub fn through(
        rank: Rank,
        destination: OrgPath,
        reason: BccUnsupportedReason,
    ) -> Self {
        RoutingDecision {
            kind: StrategyKind::Through,
            rank: Some(rank),
            destination: Some(destination),
            bcc: Some(BccStatus::Unsupported),
            bcc_reason: Some(reason),
            needs_proposal: false,
            annotation: None,
            allocation: None,
        }
    }

    pub fn no_touch(rank: Rank, destination: OrgPath) -> Self {
        RoutingDecision {
            kind: StrategyKind::NoTouch,
            rank: Some(rank),
            destination: Some(destination),
            bcc: Some(BccStatus::Unsupported),
            bcc_reason: None,
            needs_proposal: true,
            annotation: None,
            allocation: None,
        }
    }

    pub fn branch_priority(rank: Rank, destination: OrgPath) -> Self {
        RoutingDecision {
            kind: StrategyKind::BranchPriority,
            rank: Some(rank),
            destination: Some(destination),
            bcc: Some(BccStatus::Unsupported),
            bcc_reason: None,
            needs_proposal: true,
            annotation: None,
            allocation: None,
        }
    }

    pub fn normal(rank: Rank, allocation: Allocation) -> Self {
        RoutingDecision {
            kind: StrategyKind::Normal,
            rank: Some(rank),
            destination: Some(allocation.winner.destination),
            bcc: Some(BccStatus::Supported),
            bcc_reason: None,
            needs_proposal: true,
            annotation: None,
            allocation: Some(allocation),
        }
    }

    pub fn escalate(rank: Option<Rank>, annotation: &str) -> Self {
        RoutingDecision {
            kind: StrategyKind::Escalate,
            rank,
            destination: None,
            bcc: None,
            bcc_reason: None,
            needs_proposal: false,
            annotation: Some(annotation.to_string()),
            allocation: None,
        }
    }

    /// Whether a destination was assigned.
    pub fn is_routed(&self) -> bool {
        self.destination.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn strategy_codes() {
        assert_eq!(StrategyKind::Through.code(), Some(100));
        assert_eq!(StrategyKind::Normal.code(), Some(400));
        assert_eq!(StrategyKind::Escalate.code(), None);
    }

    #[test]
    fn through_decision_shape() {
        let dest = OrgPath::empty();
        let decision =
            RoutingDecision::through(Rank::A, dest, BccUnsupportedReason::ExistingAccount);
        assert!(decision.is_routed());
        assert!(!decision.needs_proposal);
        assert_eq!(decision.bcc, Some(BccStatus::Unsupported));
        assert_eq!(
            decision.bcc_reason,
            Some(BccUnsupportedReason::ExistingAccount)
        );
    }

    #[test]
    fn normal_decision_carries_allocation() {
        let unit = UnitId(Uuid::from_u128(1));
        let load = CandidateLoad {
            unit,
            destination: OrgPath::empty(),
            occurrences: 2,
            rate: 1.5,
            priority: 2.0,
        };
        let decision = RoutingDecision::normal(
            Rank::B,
            Allocation {
                winner: load.clone(),
                audit: vec![load],
            },
        );
        assert!(decision.needs_proposal);
        assert_eq!(decision.bcc, Some(BccStatus::Supported));
        assert_eq!(decision.allocation.unwrap().audit.len(), 1);
    }

    #[test]
    fn escalation_has_no_destination() {
        let decision = RoutingDecision::escalate(None, "note");
        assert!(!decision.is_routed());
        assert_eq!(decision.kind, StrategyKind::Escalate);
        assert_eq!(decision.annotation.as_deref(), Some("note"));
    }
}
