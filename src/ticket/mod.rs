//! Ticket domain types
//!
//! A [`Ticket`] is the unit of work flowing through the engine: extracted
//! and cleansed upstream, enriched here with rank flags and a rank tier,
//! and terminal once a routing decision has been committed for it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flags::FlagSet;
use crate::rank::Rank;

/// Unique identifier of a ticket record in the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub Uuid);

/// Identifier of an organizational unit (lowest tier of the hierarchy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub Uuid);

impl UnitId {
    /// The empty-unit sentinel used where no unit applies.
    pub fn empty() -> Self {
        UnitId(Uuid::nil())
    }
}

/// Identifier of a user (account owner / person in charge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// The empty-owner sentinel: route configurations may be registered
    /// against "no account owner" explicitly.
    pub fn empty() -> Self {
        UserId(Uuid::nil())
    }
}

/// Identifier of a routing profile (the per-window dispatch configuration
/// a ticket was extracted under).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub Uuid);

/// Identifier of the team that owns proposal records created by dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub Uuid);

/// Full organizational path of a unit, from comprehensive company down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgPath {
    pub company: UnitId,
    pub division: UnitId,
    pub section: UnitId,
    pub unit: UnitId,
}

impl OrgPath {
    /// Path with every tier set to the empty sentinel, used for escalated
    /// tickets that keep their current window.
    pub fn empty() -> Self {
        OrgPath {
            company: UnitId::empty(),
            division: UnitId::empty(),
            section: UnitId::empty(),
            unit: UnitId::empty(),
        }
    }
}

/// Resolved 11-character address code.
///
/// Area route configurations may be registered at four levels of
/// specificity; [`AddressCode::fallback_keys`] yields the lookup ladder
/// from exact down to the 2-digit prefecture prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressCode(pub String);

impl AddressCode {
    pub const LEN: usize = 11;

    /// Lookup keys in decreasing specificity: the exact code, then the
    /// code truncated to 8, 5, and 2 digits with zero padding.
    pub fn fallback_keys(&self) -> [String; 4] {
        let code = &self.0;
        let prefix = |n: usize| {
            let mut s: String = code.chars().take(n).collect();
            while s.len() < Self::LEN {
                s.push('0');
            }
            s
        };
        [code.clone(), prefix(8), prefix(5), prefix(2)]
    }
}

/// Original order-content code attached to a ticket.
///
/// The code table is closed but tickets can carry values outside it, so
/// this stays a transparent numeric newtype with named constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct OrderContent(pub u16);

impl OrderContent {
    pub const NONE: OrderContent = OrderContent(0);
    pub const NEW: OrderContent = OrderContent(1);
    pub const RELOCATION: OrderContent = OrderContent(2);
    pub const CHANGE: OrderContent = OrderContent(4);
    pub const OTHER_1: OrderContent = OrderContent(7);
    pub const OTHER_2: OrderContent = OrderContent(8);
    pub const EXPANSION: OrderContent = OrderContent(9);
    pub const CHANNEL_INCREASE: OrderContent = OrderContent(10);
    pub const NUMBER_INCREASE: OrderContent = OrderContent(11);
    pub const SUSPENSION: OrderContent = OrderContent(12);
    pub const CHANNEL_DECREASE: OrderContent = OrderContent(13);
    pub const NUMBER_DECREASE: OrderContent = OrderContent(14);
    pub const INQUIRY: OrderContent = OrderContent(15);
}

/// Preferred contact method recorded on the ticket.
///
/// Only the visit preference changes dispatch behavior (it gates the
/// visit-preference through route); other codes pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactMethod(pub u16);

impl ContactMethod {
    pub const VISIT: ContactMethod = ContactMethod(2);

    pub fn is_visit(&self) -> bool {
        *self == Self::VISIT
    }
}

/// Resolved account owner of a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountOwner {
    pub id: UserId,
    pub name: String,
}

/// An incoming service request to be scored and dispatched.
///
/// Free-text fields arrive already cleansed by the upstream extraction
/// stage; absent fields stay `None` and short-circuit keyword matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    /// Requesting organizational path (dispatch source).
    pub origin: OrgPath,
    /// Unit of the service window currently holding the ticket.
    pub window_unit: UnitId,
    /// Ticket classification code (pattern-5 input).
    pub classification: u16,
    pub order_content: OrderContent,
    pub contractor_name: Option<String>,
    /// Request content text (pattern-1/3/4 input).
    pub content: Option<String>,
    /// Originating company name (pattern-2 input).
    pub source_company: Option<String>,
    /// Person in charge on the requesting side (pattern-3 input).
    pub person_in_charge: Option<String>,
    pub contact_phone: Option<String>,
    pub contract_id: Option<String>,
    #[serde(default)]
    pub third_party_application: bool,
    #[serde(default)]
    pub collaboration_line: bool,
    pub contact_method: Option<ContactMethod>,
    /// Raw installation address, input to the address resolver.
    pub address_text: Option<String>,
    /// Resolved address code, if the resolver succeeded upstream.
    pub address_code: Option<AddressCode>,
    /// Routing profile the ticket was extracted under.
    pub profile: Option<ProfileId>,
    pub account_owner: Option<AccountOwner>,
    /// Concatenated policy keywords assigned upstream.
    pub policy_keywords: Option<String>,
    /// Rank tier predicted by the external classifier, if any.
    pub predicted_rank: Option<Rank>,
    /// Rank signals; populated by the flag evaluator.
    #[serde(skip)]
    pub flags: FlagSet,
    /// Rank resolved through the prediction boundary.
    #[serde(skip)]
    pub rank: Option<Rank>,
}

impl Ticket {
    /// Account owner id, or the empty-owner sentinel when unresolved.
    pub fn account_owner_id(&self) -> UserId {
        self.account_owner
            .as_ref()
            .map(|o| o.id)
            .unwrap_or_else(UserId::empty)
    }

    /// Origin units the allocator counts history against: the requesting
    /// unit and the ticket's current window unit.
    pub fn history_origins(&self) -> [UnitId; 2] {
        [self.origin.unit, self.window_unit]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_keys_ladder() {
        let code = AddressCode("12345678901".to_string());
        let keys = code.fallback_keys();
        assert_eq!(keys[0], "12345678901");
        assert_eq!(keys[1], "12345678000");
        assert_eq!(keys[2], "12345000000");
        assert_eq!(keys[3], "12000000000");
    }

    #[test]
    fn empty_owner_is_nil_uuid() {
        assert_eq!(UserId::empty().0, Uuid::nil());
    }

    #[test]
    fn contact_method_visit() {
        assert!(ContactMethod(2).is_visit());
        assert!(!ContactMethod(1).is_visit());
    }
}
