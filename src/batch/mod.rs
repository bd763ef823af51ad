//! Batch runner
//!
//! Drives the per-ticket pipeline: resolve missing fields, evaluate
//! flags, apply forced corrections, resolve the rank, decide the route,
//! and commit the decision through the record store. One ticket's
//! write-back failure is recorded and never aborts the batch.

pub mod export;

pub use export::write_error_csv;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::dispatch::{Dispatcher, RoutingDecision, WindowClock};
use crate::directory::DispatchDirectory;
use crate::flags::{apply_forced_correction, evaluate, RuleCatalog};
use crate::rank::{Rank, RankPredictor};
use crate::store::{
    AccountResolver, AddressResolver, AllocationHistory, RecordStore, StoreError,
};
use crate::ticket::{Ticket, TicketId};

/// Batch result tier. `Error` wins over `Warning`; a `Warning` inherited
/// from an upstream stage is never downgraded by a later success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitStatus {
    Success,
    Error,
    Warning,
}

impl ExitStatus {
    /// Process exit code.
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Error => 1,
            ExitStatus::Warning => 2,
        }
    }

    /// Combine two tiers, keeping the worse one.
    pub fn combine(self, other: ExitStatus) -> ExitStatus {
        match (self, other) {
            (ExitStatus::Error, _) | (_, ExitStatus::Error) => ExitStatus::Error,
            (ExitStatus::Warning, _) | (_, ExitStatus::Warning) => ExitStatus::Warning,
            _ => ExitStatus::Success,
        }
    }
}

/// The stage at which a ticket's write-back failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Proposal,
    Commit,
    Annotation,
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureStage::Proposal => write!(f, "proposal"),
            FailureStage::Commit => write!(f, "commit"),
            FailureStage::Annotation => write!(f, "annotation"),
        }
    }
}

/// One row of the end-of-run error export.
#[derive(Debug, Clone, Serialize)]
pub struct FailedTicket {
    pub ticket: TicketId,
    pub contractor_name: Option<String>,
    pub contract_id: Option<String>,
    pub contact_phone: Option<String>,
    pub rank: Option<Rank>,
    pub stage: FailureStage,
    pub reason: String,
}

/// Outcome recorded for every processed ticket.
#[derive(Debug, Clone, Serialize)]
pub struct TicketOutcome {
    pub ticket: TicketId,
    pub rank: Option<Rank>,
    /// Forced-correction rule that fired, if any.
    pub correction: Option<String>,
    pub decision: RoutingDecision,
    /// Whether the decision was fully written back.
    pub committed: bool,
}

/// End-of-run report.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<TicketOutcome>,
    pub failures: Vec<FailedTicket>,
    pub status: ExitStatus,
}

impl BatchReport {
    pub fn routed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.committed && o.decision.is_routed())
            .count()
    }

    pub fn escalated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.committed && !o.decision.is_routed())
            .count()
    }
}

/// Sequences the pipeline stages for one run.
pub struct BatchRunner<'a, S> {
    catalog: &'a RuleCatalog,
    directory: &'a DispatchDirectory,
    predictor: &'a dyn RankPredictor,
    store: &'a S,
    address_resolver: &'a dyn AddressResolver,
    account_resolver: &'a dyn AccountResolver,
    clock: WindowClock,
}

impl<'a, S> BatchRunner<'a, S>
where
    S: RecordStore + AllocationHistory,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: &'a RuleCatalog,
        directory: &'a DispatchDirectory,
        predictor: &'a dyn RankPredictor,
        store: &'a S,
        address_resolver: &'a dyn AddressResolver,
        account_resolver: &'a dyn AccountResolver,
        clock: WindowClock,
    ) -> Self {
        Self {
            catalog,
            directory,
            predictor,
            store,
            address_resolver,
            account_resolver,
            clock,
        }
    }

    /// Process all tickets. `upstream` carries the result tier of earlier
    /// pipeline stages and is combined into the final status.
    pub fn run(
        &self,
        tickets: &mut [Ticket],
        now: DateTime<Utc>,
        upstream: ExitStatus,
    ) -> BatchReport {
        info!(tickets = tickets.len(), "dispatch batch started");

        // Proposal records need an owning team; without one nothing can
        // be dispatched safely.
        if self.store.dispatch_team().is_none() {
            error!("no dispatch team configured in the record store");
            return BatchReport {
                outcomes: Vec::new(),
                failures: Vec::new(),
                status: ExitStatus::Error,
            };
        }

        let dispatcher = Dispatcher::new(self.directory, self.store, self.clock);
        let mut outcomes = Vec::with_capacity(tickets.len());
        let mut failures = Vec::new();

        for ticket in tickets.iter_mut() {
            self.resolve_external_fields(ticket);

            let mut flags = evaluate(ticket, self.catalog);
            let correction = apply_forced_correction(&mut flags, ticket.order_content);
            ticket.flags = flags;
            ticket.rank = self.predictor.predict(ticket);

            let decision = dispatcher.decide(ticket, now);
            let committed = self.execute(ticket, &decision, now, &mut failures);

            outcomes.push(TicketOutcome {
                ticket: ticket.id,
                rank: ticket.rank,
                correction: correction.map(|r| r.to_string()),
                decision,
                committed,
            });
        }

        let status = if failures.is_empty() {
            upstream.combine(ExitStatus::Success)
        } else {
            ExitStatus::Error
        };

        info!(
            routed = outcomes.iter().filter(|o| o.committed && o.decision.is_routed()).count(),
            escalated = outcomes.iter().filter(|o| o.committed && !o.decision.is_routed()).count(),
            failed = failures.len(),
            "dispatch batch finished"
        );

        BatchReport {
            outcomes,
            failures,
            status,
        }
    }

    fn resolve_external_fields(&self, ticket: &mut Ticket) {
        if ticket.address_code.is_none() {
            if let Some(text) = ticket.address_text.clone() {
                ticket.address_code = self.address_resolver.address_to_code(&text);
            }
        }
        if ticket.account_owner.is_none() {
            ticket.account_owner = self.account_resolver.resolve(ticket);
        }
    }

    /// Commit a decision: proposal first where required, then the routing
    /// update, then the annotation. The first failure abandons the ticket.
    fn execute(
        &self,
        ticket: &Ticket,
        decision: &RoutingDecision,
        now: DateTime<Utc>,
        failures: &mut Vec<FailedTicket>,
    ) -> bool {
        if decision.needs_proposal {
            if let Err(err) = self.store.create_proposal(ticket, now.date_naive()) {
                record_failure(failures, ticket, FailureStage::Proposal, &err);
                return false;
            }
        }

        if let Err(err) = self.store.commit_routing(ticket, decision, now) {
            record_failure(failures, ticket, FailureStage::Commit, &err);
            return false;
        }

        if let Some(note) = &decision.annotation {
            if let Err(err) = self.store.annotate(ticket.id, note) {
                record_failure(failures, ticket, FailureStage::Annotation, &err);
                return false;
            }
        }

        true
    }
}

fn record_failure(
    failures: &mut Vec<FailedTicket>,
    ticket: &Ticket,
    stage: FailureStage,
    err: &StoreError,
) {
    warn!(ticket = %ticket.id.0, stage = %stage, error = %err, "ticket abandoned for this run");
    failures.push(FailedTicket {
        ticket: ticket.id,
        contractor_name: ticket.contractor_name.clone(),
        contract_id: ticket.contract_id.clone(),
        contact_phone: ticket.contact_phone.clone(),
        rank: ticket.rank,
        stage,
        reason: err.to_string(),
    });
}
