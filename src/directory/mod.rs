//! Dispatch directory
//!
//! Runtime lookup over the destination configuration: through routes
//! keyed by account owner, area routes keyed by address code, no-touch
//! routes, and the normal-allocation table. Lookups preserve the
//! configuration order of entries; the allocator relies on that order for
//! deterministic tie-breaking.

use tracing::debug;

use crate::rank::{Rank, RankMask};
use crate::ticket::{AddressCode, OrgPath, ProfileId, UserId};

/// Through route keyed by the resolved account owner.
///
/// An entry registered against [`UserId::empty`] matches tickets with no
/// resolved owner.
#[derive(Debug, Clone)]
pub struct AccountRoute {
    pub account_owner: UserId,
    pub mask: RankMask,
    pub destination: OrgPath,
}

/// Area route keyed by address code, carrying both the visit-preference
/// mask and the branch-priority mask.
#[derive(Debug, Clone)]
pub struct AreaRoute {
    pub profile: ProfileId,
    pub address_code: AddressCode,
    pub visit_mask: RankMask,
    pub priority_mask: RankMask,
    pub destination: OrgPath,
}

/// No-touch route keyed by routing profile and center account owner.
#[derive(Debug, Clone)]
pub struct NoTouchRoute {
    pub profile: ProfileId,
    pub account_owner: UserId,
    pub mask: RankMask,
    pub destination: OrgPath,
}

/// One destination of the normal-allocation table.
#[derive(Debug, Clone)]
pub struct AllocationEntry {
    pub profile: ProfileId,
    pub destination: OrgPath,
    /// Allocation rate applied when the ticket rank is A.
    pub rate_a: f64,
    /// Allocation rate applied for every other tier.
    pub rate: f64,
    pub third_party: bool,
    pub collab_line: bool,
    pub normal_mask: RankMask,
}

impl AllocationEntry {
    /// Configured rate for a rank tier. A zero or negative rate removes
    /// the entry from every pool.
    pub fn rate_for(&self, rank: Rank) -> f64 {
        match rank {
            Rank::A => self.rate_a,
            _ => self.rate,
        }
    }
}

/// All destination configuration for one run.
#[derive(Debug, Clone, Default)]
pub struct DispatchDirectory {
    account_routes: Vec<AccountRoute>,
    area_routes: Vec<AreaRoute>,
    notouch_routes: Vec<NoTouchRoute>,
    allocations: Vec<AllocationEntry>,
}

impl DispatchDirectory {
    pub fn new(
        account_routes: Vec<AccountRoute>,
        area_routes: Vec<AreaRoute>,
        notouch_routes: Vec<NoTouchRoute>,
        allocations: Vec<AllocationEntry>,
    ) -> Self {
        debug!(
            account_routes = account_routes.len(),
            area_routes = area_routes.len(),
            notouch_routes = notouch_routes.len(),
            allocations = allocations.len(),
            "dispatch directory built"
        );
        Self {
            account_routes,
            area_routes,
            notouch_routes,
            allocations,
        }
    }

    /// Direct-account through route for an owner (or the empty-owner
    /// sentinel) eligible for this rank. First configured entry wins.
    pub fn account_route(&self, owner: UserId, rank: Rank) -> Option<&AccountRoute> {
        self.account_routes
            .iter()
            .find(|r| r.account_owner == owner && r.mask.allows(rank))
    }

    /// Visit-preference area route: most specific address match wins,
    /// walking the fallback ladder from the exact code down.
    pub fn visit_route(
        &self,
        profile: ProfileId,
        address: &AddressCode,
        rank: Rank,
    ) -> Option<&AreaRoute> {
        self.area_route_by(profile, address, |r| r.visit_mask.allows(rank))
    }

    /// Branch-priority area route, same address ladder as visit routes.
    pub fn priority_route(
        &self,
        profile: ProfileId,
        address: &AddressCode,
        rank: Rank,
    ) -> Option<&AreaRoute> {
        self.area_route_by(profile, address, |r| r.priority_mask.allows(rank))
    }

    fn area_route_by<F>(
        &self,
        profile: ProfileId,
        address: &AddressCode,
        eligible: F,
    ) -> Option<&AreaRoute>
    where
        F: Fn(&AreaRoute) -> bool,
    {
        for key in address.fallback_keys() {
            let hit = self
                .area_routes
                .iter()
                .find(|r| r.profile == profile && r.address_code.0 == key && eligible(r));
            if hit.is_some() {
                return hit;
            }
        }
        None
    }

    /// No-touch route for the profile and account owner (or sentinel).
    pub fn notouch_route(
        &self,
        profile: ProfileId,
        owner: UserId,
        rank: Rank,
    ) -> Option<&NoTouchRoute> {
        self.notouch_routes.iter().find(|r| {
            r.profile == profile && r.account_owner == owner && r.mask.allows(rank)
        })
    }

    /// Pool of third-party-eligible destinations with a positive rate.
    pub fn third_party_pool(&self, profile: ProfileId, rank: Rank) -> Vec<&AllocationEntry> {
        self.allocations
            .iter()
            .filter(|e| e.profile == profile && e.third_party && e.rate_for(rank) > 0.0)
            .collect()
    }

    /// Pool of collaboration-line destinations with a positive rate.
    pub fn collab_pool(&self, profile: ProfileId, rank: Rank) -> Vec<&AllocationEntry> {
        self.allocations
            .iter()
            .filter(|e| e.profile == profile && e.collab_line && e.rate_for(rank) > 0.0)
            .collect()
    }

    /// Pool for rank-based normal routing: rank-normal eligibility and a
    /// positive rate.
    pub fn normal_pool(&self, profile: ProfileId, rank: Rank) -> Vec<&AllocationEntry> {
        self.allocations
            .iter()
            .filter(|e| {
                e.profile == profile && e.normal_mask.allows(rank) && e.rate_for(rank) > 0.0
            })
            .collect()
    }
}
