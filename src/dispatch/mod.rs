//! Dispatch cascade
//!
//! Decides the destination of each ticket by walking an ordered list of
//! strategy evaluators and stopping at the first match. The decision is
//! pure: committing it (proposal creation, record update, annotation) is
//! the batch runner's job, so a store failure can abandon a ticket
//! without having touched anything else.
//!
//! Strategy order is a business contract:
//!
//! 1. no rank → escalate
//! 2. direct-account through route
//! 3. visit-preference through route
//! 4. no-touch route
//! 5. branch-priority area route
//! 6. third-party gate → normal allocation or escalate
//! 7. collaboration-line gate → normal allocation or escalate
//! 8. rank-based normal allocation or escalate
//!
//! Once the gate of step 6 or 7 holds, the ticket never falls through to
//! a later step: it either fair-allocates or escalates to the window.

pub mod allocator;
pub mod decision;
pub mod window;

pub use allocator::allocate;
pub use decision::{
    Allocation, BccStatus, BccUnsupportedReason, CandidateLoad, RoutingDecision, StrategyKind,
};
pub use window::WindowClock;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::directory::DispatchDirectory;
use crate::messages;
use crate::rank::Rank;
use crate::store::AllocationHistory;
use crate::ticket::Ticket;

/// Result of one strategy evaluator.
#[derive(Debug)]
pub enum StrategyOutcome {
    /// The strategy produced the ticket's decision; the cascade stops.
    Matched(RoutingDecision),
    /// The strategy does not apply; the cascade continues.
    NotApplicable,
}

/// Owns the per-ticket dispatch decision.
pub struct Dispatcher<'a> {
    directory: &'a DispatchDirectory,
    history: &'a dyn AllocationHistory,
    clock: WindowClock,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        directory: &'a DispatchDirectory,
        history: &'a dyn AllocationHistory,
        clock: WindowClock,
    ) -> Self {
        Self {
            directory,
            history,
            clock,
        }
    }

    /// Produce the single routing decision for a ticket.
    pub fn decide(&self, ticket: &Ticket, now: DateTime<Utc>) -> RoutingDecision {
        let rank = match ticket.rank {
            Some(rank) => rank,
            None => {
                debug!(ticket = %ticket.id.0, "no rank; escalating to window");
                return RoutingDecision::escalate(None, messages::NO_RANK);
            }
        };

        // The ordered strategy list the controller folds over.
        let cascade: [(
            &str,
            fn(&Self, &Ticket, Rank, DateTime<Utc>) -> StrategyOutcome,
        ); 7] = [
            ("direct-account", Self::direct_account),
            ("visit-preference", Self::visit_preference),
            ("no-touch", Self::no_touch),
            ("branch-priority", Self::branch_priority),
            ("third-party", Self::third_party),
            ("collab-line", Self::collab_line),
            ("rank-normal", Self::rank_normal),
        ];

        for (name, strategy) in cascade {
            match strategy(self, ticket, rank, now) {
                StrategyOutcome::Matched(decision) => {
                    debug!(
                        ticket = %ticket.id.0,
                        strategy = name,
                        kind = %decision.kind,
                        "cascade resolved"
                    );
                    return decision;
                }
                StrategyOutcome::NotApplicable => continue,
            }
        }

        // The rank-normal step always matches; this is unreachable for a
        // well-formed cascade.
        RoutingDecision::escalate(Some(rank), messages::NO_DESTINATION)
    }

    fn direct_account(
        &self,
        ticket: &Ticket,
        rank: Rank,
        _now: DateTime<Utc>,
    ) -> StrategyOutcome {
        match self
            .directory
            .account_route(ticket.account_owner_id(), rank)
        {
            Some(route) => StrategyOutcome::Matched(RoutingDecision::through(
                rank,
                route.destination,
                BccUnsupportedReason::ExistingAccount,
            )),
            None => StrategyOutcome::NotApplicable,
        }
    }

    fn visit_preference(
        &self,
        ticket: &Ticket,
        rank: Rank,
        _now: DateTime<Utc>,
    ) -> StrategyOutcome {
        let wants_visit = ticket.contact_method.map(|m| m.is_visit()).unwrap_or(false);
        if !wants_visit {
            return StrategyOutcome::NotApplicable;
        }
        let (profile, address) = match (ticket.profile, &ticket.address_code) {
            (Some(profile), Some(address)) => (profile, address),
            _ => return StrategyOutcome::NotApplicable,
        };
        match self.directory.visit_route(profile, address, rank) {
            Some(route) => StrategyOutcome::Matched(RoutingDecision::through(
                rank,
                route.destination,
                BccUnsupportedReason::VisitPreferred,
            )),
            None => StrategyOutcome::NotApplicable,
        }
    }

    fn no_touch(&self, ticket: &Ticket, rank: Rank, _now: DateTime<Utc>) -> StrategyOutcome {
        let profile = match ticket.profile {
            Some(profile) => profile,
            None => return StrategyOutcome::NotApplicable,
        };
        match self
            .directory
            .notouch_route(profile, ticket.account_owner_id(), rank)
        {
            Some(route) => {
                StrategyOutcome::Matched(RoutingDecision::no_touch(rank, route.destination))
            }
            None => StrategyOutcome::NotApplicable,
        }
    }

    fn branch_priority(
        &self,
        ticket: &Ticket,
        rank: Rank,
        _now: DateTime<Utc>,
    ) -> StrategyOutcome {
        let (profile, address) = match (ticket.profile, &ticket.address_code) {
            (Some(profile), Some(address)) => (profile, address),
            _ => return StrategyOutcome::NotApplicable,
        };
        match self.directory.priority_route(profile, address, rank) {
            Some(route) => StrategyOutcome::Matched(RoutingDecision::branch_priority(
                rank,
                route.destination,
            )),
            None => StrategyOutcome::NotApplicable,
        }
    }

    fn third_party(&self, ticket: &Ticket, rank: Rank, now: DateTime<Utc>) -> StrategyOutcome {
        if !ticket.third_party_application {
            return StrategyOutcome::NotApplicable;
        }
        let pool = ticket
            .profile
            .map(|p| self.directory.third_party_pool(p, rank))
            .unwrap_or_default();
        StrategyOutcome::Matched(self.allocate_or_escalate(ticket, rank, now, &pool))
    }

    fn collab_line(&self, ticket: &Ticket, rank: Rank, now: DateTime<Utc>) -> StrategyOutcome {
        if !ticket.collaboration_line {
            return StrategyOutcome::NotApplicable;
        }
        let pool = ticket
            .profile
            .map(|p| self.directory.collab_pool(p, rank))
            .unwrap_or_default();
        StrategyOutcome::Matched(self.allocate_or_escalate(ticket, rank, now, &pool))
    }

    fn rank_normal(&self, ticket: &Ticket, rank: Rank, now: DateTime<Utc>) -> StrategyOutcome {
        let pool = ticket
            .profile
            .map(|p| self.directory.normal_pool(p, rank))
            .unwrap_or_default();
        StrategyOutcome::Matched(self.allocate_or_escalate(ticket, rank, now, &pool))
    }

    /// Terminal step for the gated and rank-based strategies: either a
    /// fair-allocated normal routing or an explicit window escalation.
    fn allocate_or_escalate(
        &self,
        ticket: &Ticket,
        rank: Rank,
        now: DateTime<Utc>,
        pool: &[&crate::directory::AllocationEntry],
    ) -> RoutingDecision {
        let window_start = self.clock.window_start(now, rank);
        match allocate(
            pool,
            &ticket.history_origins(),
            rank,
            window_start,
            self.history,
        ) {
            Some(allocation) => RoutingDecision::normal(rank, allocation),
            None => RoutingDecision::escalate(Some(rank), messages::NO_DESTINATION),
        }
    }
}
