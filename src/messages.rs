//! Fixed annotation messages
//!
//! Escalated tickets receive one of these human-readable notes so the
//! window operator can see why automation stopped.

/// Attached when no rank tier could be resolved for the ticket.
pub const NO_RANK: &str =
    "Automated dispatch skipped: the ticket could not be rank-classified. Please assign manually.";

/// Attached when no eligible destination unit exists for the ticket.
pub const NO_DESTINATION: &str =
    "Automated dispatch skipped: no eligible destination unit was found. Please assign manually.";
