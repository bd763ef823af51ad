//! Shared test utilities for triage integration tests.
//!
//! Provides reusable builders for tickets, org paths, directory entries
//! and the in-memory store to reduce duplication across test files.

#![allow(dead_code)]

use triage::config::{AllocationConfig, DirectoryConfig};
use triage::directory::{AccountRoute, AllocationEntry, AreaRoute, NoTouchRoute};
use triage::flags::FlagSet;
use triage::rank::{Rank, RankMask};
use triage::store::MemoryStore;
use triage::ticket::{
    AccountOwner, AddressCode, ContactMethod, OrderContent, OrgPath, ProfileId, TeamId, Ticket,
    TicketId, UnitId, UserId,
};
use uuid::Uuid;

// =============================================================================
// Identifier builders
// =============================================================================

pub fn unit(seed: u128) -> UnitId {
    UnitId(Uuid::from_u128(seed))
}

pub fn org(seed: u128) -> OrgPath {
    let id = unit(seed);
    OrgPath {
        company: id,
        division: id,
        section: id,
        unit: id,
    }
}

pub fn profile(seed: u128) -> ProfileId {
    ProfileId(Uuid::from_u128(seed))
}

pub fn user(seed: u128) -> UserId {
    UserId(Uuid::from_u128(seed))
}

pub fn team() -> TeamId {
    TeamId(Uuid::from_u128(0x7EA0))
}

// =============================================================================
// Ticket builders
// =============================================================================

/// A minimal ticket with sensible defaults: origin unit 1, window unit 2,
/// profile 3, rank C predicted upstream.
pub fn make_ticket(seed: u128) -> Ticket {
    Ticket {
        id: TicketId(Uuid::from_u128(seed)),
        origin: org(1),
        window_unit: unit(2),
        classification: 0,
        order_content: OrderContent::NEW,
        contractor_name: Some("Test Contractor".to_string()),
        content: Some("service request".to_string()),
        source_company: None,
        person_in_charge: None,
        contact_phone: Some("000-0000-0000".to_string()),
        contract_id: Some(format!("C-{:04}", seed)),
        third_party_application: false,
        collaboration_line: false,
        contact_method: None,
        address_text: None,
        address_code: None,
        profile: Some(profile(3)),
        account_owner: None,
        policy_keywords: None,
        predicted_rank: Some(Rank::C),
        flags: FlagSet::new(),
        rank: None,
    }
}

pub fn with_rank(mut ticket: Ticket, rank: Option<Rank>) -> Ticket {
    ticket.predicted_rank = rank;
    ticket
}

pub fn with_owner(mut ticket: Ticket, owner: UserId) -> Ticket {
    ticket.account_owner = Some(AccountOwner {
        id: owner,
        name: "Account Owner".to_string(),
    });
    ticket
}

pub fn with_visit(mut ticket: Ticket, address: &str) -> Ticket {
    ticket.contact_method = Some(ContactMethod::VISIT);
    ticket.address_code = Some(AddressCode(address.to_string()));
    ticket
}

// =============================================================================
// Directory builders
// =============================================================================

pub fn account_route(owner: UserId, mask: RankMask, dest: OrgPath) -> AccountRoute {
    AccountRoute {
        account_owner: owner,
        mask,
        destination: dest,
    }
}

pub fn area_route(
    p: ProfileId,
    address: &str,
    visit: RankMask,
    priority: RankMask,
    dest: OrgPath,
) -> AreaRoute {
    AreaRoute {
        profile: p,
        address_code: AddressCode(address.to_string()),
        visit_mask: visit,
        priority_mask: priority,
        destination: dest,
    }
}

pub fn notouch_route(p: ProfileId, owner: UserId, mask: RankMask, dest: OrgPath) -> NoTouchRoute {
    NoTouchRoute {
        profile: p,
        account_owner: owner,
        mask,
        destination: dest,
    }
}

pub fn allocation(p: ProfileId, dest: OrgPath, rate: f64) -> AllocationEntry {
    AllocationEntry {
        profile: p,
        destination: dest,
        rate_a: rate,
        rate,
        third_party: false,
        collab_line: false,
        normal_mask: RankMask::all(),
    }
}

pub fn allocation_config(p: ProfileId, dest: OrgPath, rate: f64) -> AllocationConfig {
    AllocationConfig {
        profile: p,
        destination: dest,
        rate_a: rate,
        rate,
        third_party: false,
        collab_line: false,
        normal: RankMask::all(),
    }
}

pub fn directory_config(allocations: Vec<AllocationConfig>) -> DirectoryConfig {
    DirectoryConfig {
        account_routes: Vec::new(),
        area_routes: Vec::new(),
        notouch_routes: Vec::new(),
        allocations,
    }
}

// =============================================================================
// Store builders
// =============================================================================

pub fn make_store() -> MemoryStore {
    MemoryStore::new(Some(team()))
}

pub fn make_store_without_team() -> MemoryStore {
    MemoryStore::new(None)
}
