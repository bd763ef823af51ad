//! In-memory record store
//!
//! Backs the CLI run mode and the test suites. Committed routings append
//! to the allocation ledger, so decisions made earlier in a run shift the
//! counts observed by later tickets exactly like the production store's
//! history table would. Failure injection switches let tests exercise the
//! partial-failure policy.

use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::dispatch::RoutingDecision;
use crate::rank::Rank;
use crate::ticket::{TeamId, Ticket, TicketId, UnitId};

use super::{
    proposal_name, AllocationHistory, ProposalId, RecordStore, StoreError,
};

/// One occurrence in the allocation ledger.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LedgerEntry {
    pub from_unit: UnitId,
    pub to_unit: UnitId,
    pub rank: Rank,
    pub at: DateTime<Utc>,
}

/// A proposal record held in memory.
#[derive(Debug, Clone)]
pub struct ProposalRecord {
    pub id: ProposalId,
    pub ticket: TicketId,
    pub team: Option<TeamId>,
    pub name: String,
}

/// A committed routing held in memory.
#[derive(Debug, Clone)]
pub struct CommittedRouting {
    pub ticket: TicketId,
    pub decision: RoutingDecision,
}

#[derive(Debug, Default)]
struct Inner {
    ledger: Vec<LedgerEntry>,
    proposals: Vec<ProposalRecord>,
    committed: Vec<CommittedRouting>,
    annotations: Vec<(TicketId, String)>,
    fail_proposals: bool,
    fail_commits: bool,
}

/// In-memory implementation of the record-store boundary.
#[derive(Debug, Default)]
pub struct MemoryStore {
    team: Option<TeamId>,
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new(team: Option<TeamId>) -> Self {
        MemoryStore {
            team,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Seed the ledger with pre-existing history entries.
    pub fn with_history(self, entries: Vec<LedgerEntry>) -> Self {
        self.inner.lock().expect("store lock").ledger = entries;
        self
    }

    /// Make every proposal creation fail, for partial-failure tests.
    pub fn fail_proposals(&self, fail: bool) {
        self.inner.lock().expect("store lock").fail_proposals = fail;
    }

    /// Make every routing commit fail, for partial-failure tests.
    pub fn fail_commits(&self, fail: bool) {
        self.inner.lock().expect("store lock").fail_commits = fail;
    }

    pub fn proposals(&self) -> Vec<ProposalRecord> {
        self.inner.lock().expect("store lock").proposals.clone()
    }

    pub fn committed(&self) -> Vec<CommittedRouting> {
        self.inner.lock().expect("store lock").committed.clone()
    }

    pub fn annotations(&self) -> Vec<(TicketId, String)> {
        self.inner.lock().expect("store lock").annotations.clone()
    }

    pub fn ledger(&self) -> Vec<LedgerEntry> {
        self.inner.lock().expect("store lock").ledger.clone()
    }
}

impl RecordStore for MemoryStore {
    fn dispatch_team(&self) -> Option<TeamId> {
        self.team
    }

    fn create_proposal(&self, ticket: &Ticket, date: NaiveDate) -> Result<ProposalId, StoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        if inner.fail_proposals {
            return Err(StoreError::ProposalFailed {
                ticket: ticket.id.0,
                reason: "proposal creation rejected".to_string(),
            });
        }
        let id = ProposalId(Uuid::new_v4());
        let name = proposal_name(ticket.contractor_name.as_deref(), date);
        debug!(ticket = %ticket.id.0, name = %name, "proposal created");
        inner.proposals.push(ProposalRecord {
            id,
            ticket: ticket.id,
            team: self.team,
            name,
        });
        Ok(id)
    }

    fn commit_routing(
        &self,
        ticket: &Ticket,
        decision: &RoutingDecision,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        if inner.fail_commits {
            return Err(StoreError::UpdateRejected {
                ticket: ticket.id.0,
                reason: "routing update rejected".to_string(),
            });
        }

        // A routed ticket leaves a trace in the ledger; escalations do not.
        if let (Some(destination), Some(rank)) = (decision.destination, decision.rank) {
            inner.ledger.push(LedgerEntry {
                from_unit: ticket.origin.unit,
                to_unit: destination.unit,
                rank,
                at,
            });
        }

        inner.committed.push(CommittedRouting {
            ticket: ticket.id,
            decision: decision.clone(),
        });
        Ok(())
    }

    fn annotate(&self, ticket: TicketId, text: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        inner.annotations.push((ticket, text.to_string()));
        Ok(())
    }
}

impl AllocationHistory for MemoryStore {
    fn count_since(
        &self,
        destination: UnitId,
        origins: &[UnitId],
        rank: Rank,
        since: DateTime<Utc>,
    ) -> u64 {
        let inner = self.inner.lock().expect("store lock");
        inner
            .ledger
            .iter()
            .filter(|e| {
                e.to_unit == destination
                    && e.rank == rank
                    && e.at >= since
                    && origins.contains(&e.from_unit)
            })
            .count() as u64
    }
}
