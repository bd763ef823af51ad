//! External record-store boundary
//!
//! The engine runs as an in-process batch stage against a CRM-style
//! record store. Everything it needs from the outside world is behind
//! the traits here: ticket write-back, proposal creation, annotation,
//! windowed allocation-history counts, and the address/account resolvers.
//! All calls are synchronous and blocking; failures are per-ticket and
//! never abort the batch.

pub mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::dispatch::RoutingDecision;
use crate::rank::Rank;
use crate::ticket::{AccountOwner, AddressCode, TeamId, Ticket, TicketId, UnitId};

/// Identifier of a proposal record created alongside a routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub Uuid);

/// Write-back failures. Each variant names the rejected operation; the
/// batch runner records the ticket and moves on.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record store rejected routing update for ticket {ticket}: {reason}")]
    UpdateRejected { ticket: Uuid, reason: String },

    #[error("Proposal creation failed for ticket {ticket}: {reason}")]
    ProposalFailed { ticket: Uuid, reason: String },

    #[error("Annotation write failed for ticket {ticket}: {reason}")]
    AnnotationFailed { ticket: Uuid, reason: String },
}

/// Prefix of generated proposal record names.
pub const PROPOSAL_NAME_PREFIX: &str = "auto-dispatch_";
/// Maximum length of a proposal record name.
pub const PROPOSAL_NAME_MAX: usize = 40;

/// Name of the proposal record created for a routing:
/// `auto-dispatch_<YYYY/MM/DD>_<contractor>`, truncated to 40 characters.
pub fn proposal_name(contractor: Option<&str>, date: NaiveDate) -> String {
    let name = format!(
        "{}{}_{}",
        PROPOSAL_NAME_PREFIX,
        date.format("%Y/%m/%d"),
        contractor.unwrap_or("")
    );
    name.chars().take(PROPOSAL_NAME_MAX).collect()
}

/// CRM-style record store consumed by the batch runner.
pub trait RecordStore {
    /// The team that owns proposal records. The store must expose exactly
    /// one dispatch team; `None` is a batch-level configuration error
    /// detected before the ticket loop.
    fn dispatch_team(&self) -> Option<TeamId>;

    /// Create the proposal record attached to a no-touch, branch-priority
    /// or normal routing. Must happen before the routing is committed.
    fn create_proposal(&self, ticket: &Ticket, date: NaiveDate) -> Result<ProposalId, StoreError>;

    /// Write the routing decision back to the ticket record.
    fn commit_routing(
        &self,
        ticket: &Ticket,
        decision: &RoutingDecision,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Attach an annotation note to the ticket.
    fn annotate(&self, ticket: TicketId, text: &str) -> Result<(), StoreError>;
}

/// Read-only view of the allocation history used by the fairness
/// allocator. Occurrence writes happen inside [`RecordStore::commit_routing`],
/// so count-then-commit for one ticket must not interleave with another
/// ticket's (the batch runner is single-threaded for exactly this reason).
pub trait AllocationHistory {
    /// Number of routings to `destination` since `since`, counting only
    /// entries originating from one of `origins` and matching `rank`.
    fn count_since(
        &self,
        destination: UnitId,
        origins: &[UnitId],
        rank: Rank,
        since: DateTime<Utc>,
    ) -> u64;
}

/// External address geocoder: free-text address to 11-character code.
pub trait AddressResolver {
    fn address_to_code(&self, text: &str) -> Option<AddressCode>;
}

/// External account matcher: ticket context to account owner.
pub trait AccountResolver {
    fn resolve(&self, ticket: &Ticket) -> Option<AccountOwner>;
}

/// Resolver that never resolves; used when the upstream stages already
/// filled the ticket fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

impl AddressResolver for NullResolver {
    fn address_to_code(&self, _text: &str) -> Option<AddressCode> {
        None
    }
}

impl AccountResolver for NullResolver {
    fn resolve(&self, _ticket: &Ticket) -> Option<AccountOwner> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposal_name_format() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(
            proposal_name(Some("Acme"), date),
            "auto-dispatch_2024/06/10_Acme"
        );
    }

    #[test]
    fn proposal_name_without_contractor() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(proposal_name(None, date), "auto-dispatch_2024/06/10_");
    }

    #[test]
    fn proposal_name_truncates_to_max() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let name = proposal_name(Some("A very long contractor name far beyond"), date);
        assert_eq!(name.chars().count(), PROPOSAL_NAME_MAX);
        assert!(name.starts_with(PROPOSAL_NAME_PREFIX));
    }
}
