//! Dispatch directory configuration
//!
//! Serde DTOs for the destination tables: routing profiles (with their
//! registered vendor names), through routes keyed by account owner, area
//! routes, no-touch routes, and the normal-allocation table. Entry order
//! in the file is preserved into the runtime directory; the allocator's
//! tie-break depends on it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::directory::{
    AccountRoute, AllocationEntry, AreaRoute, DispatchDirectory, NoTouchRoute,
};
use crate::flags::catalog::normalize_vendor;
use crate::rank::RankMask;
use crate::ticket::{AddressCode, OrgPath, ProfileId, UserId};

/// A routing profile: the dispatch configuration tickets are extracted
/// under, carrying the vendor names for the cross-match flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub id: ProfileId,
    pub name: String,
    #[serde(default)]
    pub vendors: Vec<String>,
}

/// Through route keyed by account owner; `account_owner` absent means the
/// empty-owner sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRouteConfig {
    pub account_owner: Option<UserId>,
    #[serde(default)]
    pub mask: RankMask,
    pub destination: OrgPath,
}

/// Area route with both the visit-preference and branch-priority masks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaRouteConfig {
    pub profile: ProfileId,
    pub address_code: String,
    #[serde(default)]
    pub visit: RankMask,
    #[serde(default)]
    pub priority: RankMask,
    pub destination: OrgPath,
}

/// No-touch route keyed by profile and center account owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoTouchRouteConfig {
    pub profile: ProfileId,
    pub account_owner: Option<UserId>,
    #[serde(default)]
    pub mask: RankMask,
    pub destination: OrgPath,
}

/// One destination of the normal-allocation table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    pub profile: ProfileId,
    pub destination: OrgPath,
    /// Rate for rank-A tickets; 0 removes the entry from rank-A pools.
    #[serde(default)]
    pub rate_a: f64,
    /// Rate for every other tier.
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub third_party: bool,
    #[serde(default)]
    pub collab_line: bool,
    #[serde(default)]
    pub normal: RankMask,
}

/// All destination configuration sections.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DirectoryConfig {
    pub account_routes: Vec<AccountRouteConfig>,
    pub area_routes: Vec<AreaRouteConfig>,
    pub notouch_routes: Vec<NoTouchRouteConfig>,
    pub allocations: Vec<AllocationConfig>,
}

impl DirectoryConfig {
    /// Build the runtime lookup structure, preserving entry order.
    pub fn build(&self) -> DispatchDirectory {
        let account_routes = self
            .account_routes
            .iter()
            .map(|c| AccountRoute {
                account_owner: c.account_owner.unwrap_or_else(UserId::empty),
                mask: c.mask,
                destination: c.destination,
            })
            .collect();
        let area_routes = self
            .area_routes
            .iter()
            .map(|c| AreaRoute {
                profile: c.profile,
                address_code: AddressCode(c.address_code.clone()),
                visit_mask: c.visit,
                priority_mask: c.priority,
                destination: c.destination,
            })
            .collect();
        let notouch_routes = self
            .notouch_routes
            .iter()
            .map(|c| NoTouchRoute {
                profile: c.profile,
                account_owner: c.account_owner.unwrap_or_else(UserId::empty),
                mask: c.mask,
                destination: c.destination,
            })
            .collect();
        let allocations = self
            .allocations
            .iter()
            .map(|c| AllocationEntry {
                profile: c.profile,
                destination: c.destination,
                rate_a: c.rate_a,
                rate: c.rate,
                third_party: c.third_party,
                collab_line: c.collab_line,
                normal_mask: c.normal,
            })
            .collect();
        DispatchDirectory::new(account_routes, area_routes, notouch_routes, allocations)
    }

    /// Validate the directory sections against the declared profiles.
    pub fn validate(&self, profiles: &[ProfileConfig]) -> Result<(), ConfigError> {
        let known: Vec<ProfileId> = profiles.iter().map(|p| p.id).collect();
        let check_profile = |field: &str, id: ProfileId| {
            if known.contains(&id) {
                Ok(())
            } else {
                Err(ConfigError::Validation {
                    field: field.to_string(),
                    message: format!("references undeclared profile {}", id.0),
                })
            }
        };

        for (i, route) in self.area_routes.iter().enumerate() {
            check_profile(&format!("directory.area_routes[{}].profile", i), route.profile)?;
            if route.address_code.len() != AddressCode::LEN {
                return Err(ConfigError::Validation {
                    field: format!("directory.area_routes[{}].address_code", i),
                    message: format!(
                        "must be {} characters, got {}",
                        AddressCode::LEN,
                        route.address_code.len()
                    ),
                });
            }
        }
        for (i, route) in self.notouch_routes.iter().enumerate() {
            check_profile(
                &format!("directory.notouch_routes[{}].profile", i),
                route.profile,
            )?;
        }
        for (i, alloc) in self.allocations.iter().enumerate() {
            check_profile(&format!("directory.allocations[{}].profile", i), alloc.profile)?;
            for (name, rate) in [("rate_a", alloc.rate_a), ("rate", alloc.rate)] {
                if !rate.is_finite() || rate < 0.0 {
                    return Err(ConfigError::Validation {
                        field: format!("directory.allocations[{}].{}", i, name),
                        message: "rate must be a finite non-negative number".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Normalized vendor lists keyed by profile, for the rule catalog.
pub fn vendor_map(profiles: &[ProfileConfig]) -> HashMap<ProfileId, Vec<String>> {
    profiles
        .iter()
        .filter(|p| !p.vendors.is_empty())
        .map(|p| {
            (
                p.id,
                p.vendors.iter().map(|v| normalize_vendor(v)).collect(),
            )
        })
        .collect()
}

/// Validate profile declarations (unique ids).
pub fn validate_profiles(profiles: &[ProfileConfig]) -> Result<(), ConfigError> {
    for (i, profile) in profiles.iter().enumerate() {
        if profiles[..i].iter().any(|p| p.id == profile.id) {
            return Err(ConfigError::Validation {
                field: format!("profiles[{}].id", i),
                message: format!("duplicate profile id {}", profile.id.0),
            });
        }
        if profile.name.is_empty() {
            return Err(ConfigError::Validation {
                field: format!("profiles[{}].name", i),
                message: "name cannot be empty".to_string(),
            });
        }
    }
    Ok(())
}
