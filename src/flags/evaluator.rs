//! Flag evaluation over the rule catalog
//!
//! One dispatch function walks the 71 slots and applies each slot's
//! calculation pattern to the ticket. Missing text fields short-circuit
//! their matching clause to "no match" rather than erroring.

use regex::Regex;
use tracing::trace;

use crate::ticket::Ticket;

use super::catalog::{CalcPattern, RuleCatalog};
use super::FlagSet;

/// Compute all 71 rank flags for a ticket.
pub fn evaluate(ticket: &Ticket, catalog: &RuleCatalog) -> FlagSet {
    let mut flags = FlagSet::new();

    for (slot, pattern) in catalog.iter() {
        let hit = match pattern {
            CalcPattern::TextContainsAny { keywords } => {
                text_contains_any(ticket.content.as_deref(), keywords)
            }
            CalcPattern::FieldEqualsAny { values } => field_equals_any(
                ticket.source_company.as_deref(),
                values,
            ),
            CalcPattern::VendorCrossMatch => vendor_cross_match(ticket, catalog),
            CalcPattern::ThreeWay {
                include,
                exclude,
                order_codes,
            } => three_way(ticket, include, exclude, order_codes),
            CalcPattern::ClassificationMatch { codes } => {
                codes.contains(&ticket.classification)
            }
        };
        flags.set(slot, hit as u8);
    }

    trace!(ticket = %ticket.id.0, raised = flags.count_set(), "flags evaluated");
    flags
}

/// Pattern 1: the content field matches at least one keyword regex.
/// An empty keyword list or an absent field yields no match.
fn text_contains_any(field: Option<&str>, keywords: &[Regex]) -> bool {
    match field {
        Some(text) => keywords.iter().any(|re| re.is_match(text)),
        None => false,
    }
}

/// Pattern 2: the source-company field exactly equals one of the values.
fn field_equals_any(field: Option<&str>, values: &[String]) -> bool {
    match field {
        Some(text) => values.iter().any(|v| v == text),
        None => false,
    }
}

/// Pattern 3: content or person-in-charge contains a vendor name
/// registered for the ticket's routing profile. Both sides of the
/// comparison are stripped of ideographic spaces and upper-cased; the
/// match is a plain substring test, never a regex (vendor names may
/// contain metacharacters).
fn vendor_cross_match(ticket: &Ticket, catalog: &RuleCatalog) -> bool {
    let profile = match ticket.profile {
        Some(p) => p,
        None => return false,
    };
    let vendors = match catalog.vendors_for(profile) {
        Some(v) if !v.is_empty() => v,
        _ => return false,
    };

    let content = ticket.content.as_deref().map(strip_for_vendor_match);
    let person = ticket.person_in_charge.as_deref().map(strip_for_vendor_match);

    vendors.iter().any(|vendor| {
        content.as_deref().is_some_and(|c| c.contains(vendor.as_str()))
            || person.as_deref().is_some_and(|p| p.contains(vendor.as_str()))
    })
}

fn strip_for_vendor_match(text: &str) -> String {
    text.replace('\u{3000}', "").to_uppercase()
}

/// Pattern 4: three-way AND. An empty list makes its clause vacuously
/// true; if all three lists are empty the flag is 0.
fn three_way(
    ticket: &Ticket,
    include: &[Regex],
    exclude: &[Regex],
    order_codes: &[u16],
) -> bool {
    if include.is_empty() && exclude.is_empty() && order_codes.is_empty() {
        return false;
    }

    let includes_hit = include.is_empty()
        || text_contains_any(ticket.content.as_deref(), include);
    let excludes_clear = exclude.is_empty()
        || !text_contains_any(ticket.content.as_deref(), exclude);
    let order_hit = order_codes.is_empty() || order_codes.contains(&ticket.order_content.0);

    includes_hit && excludes_clear && order_hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::catalog::CalcPattern;
    use crate::rank::Rank;
    use crate::ticket::{
        OrderContent, OrgPath, ProfileId, Ticket, TicketId, UnitId,
    };
    use regex::Regex;
    use uuid::Uuid;

    fn make_ticket(content: Option<&str>) -> Ticket {
        Ticket {
            id: TicketId(Uuid::nil()),
            origin: OrgPath::empty(),
            window_unit: UnitId::empty(),
            classification: 0,
            order_content: OrderContent::NONE,
            contractor_name: None,
            content: content.map(String::from),
            source_company: None,
            person_in_charge: None,
            contact_phone: None,
            contract_id: None,
            third_party_application: false,
            collaboration_line: false,
            contact_method: None,
            address_text: None,
            address_code: None,
            profile: None,
            account_owner: None,
            policy_keywords: None,
            predicted_rank: Some(Rank::C),
            flags: FlagSet::new(),
            rank: None,
        }
    }

    fn regexes(patterns: &[&str]) -> Vec<Regex> {
        patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
    }

    #[test]
    fn pattern1_empty_list_never_matches() {
        let catalog = RuleCatalog::empty();
        let ticket = make_ticket(Some("fiber line new install"));
        let flags = evaluate(&ticket, &catalog);
        assert_eq!(flags.count_set(), 0);
    }

    #[test]
    fn pattern1_regex_match() {
        let catalog = RuleCatalog::empty().with_slot(
            1,
            CalcPattern::TextContainsAny {
                keywords: regexes(&["fiber.?(new|install)"]),
            },
        );
        let flags = evaluate(&make_ticket(Some("order: fiber install asap")), &catalog);
        assert!(flags.is_set(1));

        let flags = evaluate(&make_ticket(Some("copper repair")), &catalog);
        assert!(!flags.is_set(1));
    }

    #[test]
    fn pattern1_missing_content_is_zero() {
        let catalog = RuleCatalog::empty().with_slot(
            1,
            CalcPattern::TextContainsAny {
                keywords: regexes(&["anything"]),
            },
        );
        let flags = evaluate(&make_ticket(None), &catalog);
        assert!(!flags.is_set(1));
    }

    #[test]
    fn pattern2_exact_equality_only() {
        let catalog = RuleCatalog::empty().with_slot(
            33,
            CalcPattern::FieldEqualsAny {
                values: vec!["ACME CORP".to_string()],
            },
        );

        let mut ticket = make_ticket(None);
        ticket.source_company = Some("ACME CORP".to_string());
        assert!(evaluate(&ticket, &catalog).is_set(33));

        ticket.source_company = Some("ACME CORPORATION".to_string());
        assert!(!evaluate(&ticket, &catalog).is_set(33));
    }

    #[test]
    fn pattern3_matches_vendor_in_either_field() {
        let profile = ProfileId(Uuid::from_u128(1));
        let catalog = RuleCatalog::empty()
            .with_vendors(profile, vec!["VENDORX".to_string()]);

        let mut ticket = make_ticket(None);
        ticket.profile = Some(profile);
        ticket.person_in_charge = Some("handled by vendor\u{3000}x desk".to_string());
        assert!(evaluate(&ticket, &catalog).is_set(41));

        ticket.person_in_charge = None;
        ticket.content = Some("referred via Vendor\u{3000}X".to_string());
        assert!(evaluate(&ticket, &catalog).is_set(41));
    }

    #[test]
    fn pattern3_requires_matching_profile() {
        let registered = ProfileId(Uuid::from_u128(1));
        let other = ProfileId(Uuid::from_u128(2));
        let catalog = RuleCatalog::empty()
            .with_vendors(registered, vec!["VENDORX".to_string()]);

        let mut ticket = make_ticket(Some("VENDORX"));
        ticket.profile = Some(other);
        assert!(!evaluate(&ticket, &catalog).is_set(41));
    }

    #[test]
    fn pattern3_is_substring_not_regex() {
        let profile = ProfileId(Uuid::from_u128(1));
        let catalog = RuleCatalog::empty()
            .with_vendors(profile, vec!["A.B+C".to_string()]);

        let mut ticket = make_ticket(Some("contact a.b+c support"));
        ticket.profile = Some(profile);
        assert!(evaluate(&ticket, &catalog).is_set(41));

        // Would match "AXBBC" if the vendor name were treated as a regex.
        ticket.content = Some("AXBBC".to_string());
        assert!(!evaluate(&ticket, &catalog).is_set(41));
    }

    #[test]
    fn pattern4_all_lists_empty_is_zero() {
        let catalog = RuleCatalog::empty(); // slot 42 has three empty lists
        let flags = evaluate(&make_ticket(Some("anything at all")), &catalog);
        assert!(!flags.is_set(42));
    }

    #[test]
    fn pattern4_include_only() {
        let catalog = RuleCatalog::empty().with_slot(
            42,
            CalcPattern::ThreeWay {
                include: regexes(&["router"]),
                exclude: Vec::new(),
                order_codes: Vec::new(),
            },
        );
        assert!(evaluate(&make_ticket(Some("new router order")), &catalog).is_set(42));
        assert!(!evaluate(&make_ticket(Some("new switch order")), &catalog).is_set(42));
    }

    #[test]
    fn pattern4_exclusion_clears_match() {
        let catalog = RuleCatalog::empty().with_slot(
            42,
            CalcPattern::ThreeWay {
                include: regexes(&["router"]),
                exclude: regexes(&["cancel"]),
                order_codes: Vec::new(),
            },
        );
        assert!(!evaluate(&make_ticket(Some("cancel router order")), &catalog).is_set(42));
    }

    #[test]
    fn pattern4_order_code_clause() {
        let catalog = RuleCatalog::empty().with_slot(
            42,
            CalcPattern::ThreeWay {
                include: regexes(&["router"]),
                exclude: Vec::new(),
                order_codes: vec![OrderContent::NEW.0],
            },
        );
        let mut ticket = make_ticket(Some("router"));
        ticket.order_content = OrderContent::NEW;
        assert!(evaluate(&ticket, &catalog).is_set(42));

        ticket.order_content = OrderContent::SUSPENSION;
        assert!(!evaluate(&ticket, &catalog).is_set(42));
    }

    #[test]
    fn pattern5_classification_code() {
        let catalog = RuleCatalog::empty().with_slot(
            35,
            CalcPattern::ClassificationMatch { codes: vec![12, 34] },
        );
        let mut ticket = make_ticket(None);
        ticket.classification = 34;
        assert!(evaluate(&ticket, &catalog).is_set(35));

        ticket.classification = 56;
        assert!(!evaluate(&ticket, &catalog).is_set(35));
    }
}
