//! Forced flag correction
//!
//! A small ordered set of authoritative business overrides. When a rule's
//! condition is detected, the statistical signal is discarded: every flag
//! is cleared and only the rule's designated flags are set. Rules are
//! evaluated highest priority first and at most one fires per ticket.

use tracing::debug;

use crate::ticket::OrderContent;

use super::FlagSet;

/// The forced-correction rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionRule {
    /// Fiber migration handled as an outbound campaign.
    BMigrationOutbound,
    /// ADSL migration handled as an outbound campaign.
    AdslMigrationOutbound,
    /// Referral received through a partner center.
    PartnerCenterReferral,
    /// Order under an upsell-ineligible vendor name.
    UpsellNgVendor,
    /// Order for a site office or event installation (booth, model room).
    SiteOfficeEvent,
}

impl std::fmt::Display for CorrectionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CorrectionRule::BMigrationOutbound => "b-migration-outbound",
            CorrectionRule::AdslMigrationOutbound => "adsl-migration-outbound",
            CorrectionRule::PartnerCenterReferral => "partner-center-referral",
            CorrectionRule::UpsellNgVendor => "upsell-ng-vendor",
            CorrectionRule::SiteOfficeEvent => "site-office-event",
        };
        write!(f, "{}", name)
    }
}

/// Apply the forced-correction rules to an evaluated flag set.
///
/// Returns the rule that fired, if any. On a match all 71 flags are
/// cleared first, then the rule's designated values are written; no
/// further rule is evaluated.
pub fn apply_forced_correction(
    flags: &mut FlagSet,
    order: OrderContent,
) -> Option<CorrectionRule> {
    let fired = if is_b_migration(flags, order) {
        flags.clear_all();
        flags.set(33, 1);
        flags.set(24, 1);
        flags.set(7, 0);
        CorrectionRule::BMigrationOutbound
    } else if is_adsl_migration(flags, order) {
        flags.clear_all();
        flags.set(33, 1);
        flags.set(6, 1);
        flags.set(7, 0);
        CorrectionRule::AdslMigrationOutbound
    } else if flags.is_set(35) {
        flags.clear_all();
        flags.set(35, 1);
        CorrectionRule::PartnerCenterReferral
    } else if flags.is_set(41) {
        flags.clear_all();
        flags.set(41, 1);
        CorrectionRule::UpsellNgVendor
    } else if is_site_office_event(flags, order) {
        flags.clear_all();
        flags.set(21, 0);
        flags.set(39, 1);
        CorrectionRule::SiteOfficeEvent
    } else {
        return None;
    };

    debug!(rule = %fired, "forced correction applied");
    Some(fired)
}

fn is_b_migration(flags: &FlagSet, order: OrderContent) -> bool {
    matches!(
        order,
        OrderContent::NEW | OrderContent::CHANGE | OrderContent::INQUIRY
    ) && flags.is_set(33)
        && flags.is_set(24)
        && !flags.is_set(7)
}

fn is_adsl_migration(flags: &FlagSet, order: OrderContent) -> bool {
    matches!(
        order,
        OrderContent::NEW | OrderContent::CHANGE | OrderContent::INQUIRY
    ) && flags.is_set(33)
        && flags.is_set(6)
        && !flags.is_set(7)
}

fn is_site_office_event(flags: &FlagSet, order: OrderContent) -> bool {
    matches!(
        order,
        OrderContent::NEW | OrderContent::EXPANSION | OrderContent::CHANGE | OrderContent::INQUIRY
    ) && !flags.is_set(21)
        && flags.is_set(39)
}
