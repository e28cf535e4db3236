//! Availability-zone and subnet set reconciliation primitives.
//!
//! This library provides the pure logic for reconciling an auto-scaling
//! group's zone membership against a blacklist/whitelist policy:
//!
//! - **Current state**: The AZ and subnet sets a group reports today.
//! - **Policy**: At most one AZ to exclude and one AZ to include per run.
//! - **Reconciliation**: A single bounded add/remove pass producing the
//!   new sets, plus a validity gate deciding whether they may be applied.
//!
//! # Invariants
//!
//! - All operations are idempotent: removing an absent element and adding
//!   a present element are no-ops, never errors.
//! - Blacklist removal is applied before whitelist addition.
//! - Functions take values in and return new values out; the caller's
//!   collections are never mutated.
//! - A reconciled set that would be absent or empty invalidates the whole
//!   update for that group.

use regex::Regex;
use thiserror::Error;

/// Reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A service filter pattern failed to compile.
    #[error("invalid service filter pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Direction of a membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    /// Append the element if absent.
    Add,

    /// Delete the element if present.
    Remove,
}

/// The zone policy for one run: at most one AZ excluded and one included.
///
/// Empty strings normalize to `None` ("no-op for that side").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZonePolicy {
    /// AZ to remove from matching groups.
    pub blacklist_az: Option<String>,

    /// AZ to add to matching groups.
    pub whitelist_az: Option<String>,
}

impl ZonePolicy {
    /// Create a policy, treating empty strings as absent.
    pub fn new(blacklist_az: Option<String>, whitelist_az: Option<String>) -> Self {
        Self {
            blacklist_az: blacklist_az.filter(|az| !az.is_empty()),
            whitelist_az: whitelist_az.filter(|az| !az.is_empty()),
        }
    }

    /// Returns true if neither side of the policy is set.
    pub fn is_noop(&self) -> bool {
        self.blacklist_az.is_none() && self.whitelist_az.is_none()
    }
}

/// A zone policy with each side resolved to its subnet ids.
///
/// `None` on a subnet side means "no constraint", which is distinct from a
/// constraint that resolved to zero subnets (the resolver treats that as an
/// error before a value of this type is ever built).
#[derive(Debug, Clone, Default)]
pub struct ResolvedPolicy {
    pub blacklist_az: Option<String>,
    pub blacklist_subnets: Option<Vec<String>>,
    pub whitelist_az: Option<String>,
    pub whitelist_subnets: Option<Vec<String>>,
}

/// Outcome of reconciling one group's membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    /// The new AZ set, or `None` if the group had no known AZ membership.
    pub availability_zones: Option<Vec<String>>,

    /// The new subnet set, or `None` if the group had no known subnets.
    pub subnets: Option<Vec<String>>,
}

impl ReconciliationResult {
    /// A result may be applied only if both sets are present and non-empty.
    pub fn is_valid(&self) -> bool {
        matches!(&self.availability_zones, Some(azs) if !azs.is_empty())
            && matches!(&self.subnets, Some(subnets) if !subnets.is_empty())
    }

    /// Consume the result, yielding the new sets only when valid.
    pub fn into_valid(self) -> Option<(Vec<String>, Vec<String>)> {
        if !self.is_valid() {
            return None;
        }
        Some((self.availability_zones?, self.subnets?))
    }
}

/// Apply a single AZ change to a membership set.
///
/// An absent or empty `az` returns the current set unchanged. An absent
/// current set returns `None`: there is nothing to operate on, and the
/// caller must not mistake that for an empty result.
pub fn reconcile_az(
    current: Option<&[String]>,
    az: Option<&str>,
    op: SetOp,
) -> Option<Vec<String>> {
    let az = match az {
        Some(az) if !az.is_empty() => az,
        _ => return current.map(<[String]>::to_vec),
    };
    let current = current?;

    let mut next = current.to_vec();
    match op {
        SetOp::Remove => next.retain(|member| member != az),
        SetOp::Add => {
            if !next.iter().any(|member| member == az) {
                next.push(az.to_string());
            }
        }
    }
    Some(next)
}

/// Apply a batch of subnet-id changes to a membership set.
///
/// Each id is added or removed independently under the same idempotent
/// rule as [`reconcile_az`]; the final set does not depend on the order
/// the ids are enumerated in.
pub fn reconcile_subnets(
    current: Option<&[String]>,
    ids: Option<&[String]>,
    op: SetOp,
) -> Option<Vec<String>> {
    let ids = match ids {
        Some(ids) if !ids.is_empty() => ids,
        _ => return current.map(<[String]>::to_vec),
    };
    let current = current?;

    let mut next = current.to_vec();
    for id in ids {
        match op {
            SetOp::Remove => next.retain(|member| member != id),
            SetOp::Add => {
                if !next.iter().any(|member| member == id) {
                    next.push(id.clone());
                }
            }
        }
    }
    Some(next)
}

/// Compute the new AZ and subnet sets for one group under a resolved policy.
///
/// The order of operations is fixed: blacklist AZ removal, blacklist subnet
/// removal, whitelist AZ addition, whitelist subnet addition. The result
/// carries its own validity; callers gate submission on [`ReconciliationResult::is_valid`].
pub fn compute_update(
    availability_zones: Option<&[String]>,
    subnets: Option<&[String]>,
    policy: &ResolvedPolicy,
) -> ReconciliationResult {
    let azs = reconcile_az(availability_zones, policy.blacklist_az.as_deref(), SetOp::Remove);
    let subnets = reconcile_subnets(subnets, policy.blacklist_subnets.as_deref(), SetOp::Remove);

    let azs = reconcile_az(azs.as_deref(), policy.whitelist_az.as_deref(), SetOp::Add);
    let subnets = reconcile_subnets(subnets.as_deref(), policy.whitelist_subnets.as_deref(), SetOp::Add);

    ReconciliationResult {
        availability_zones: azs,
        subnets,
    }
}

/// Scope filter deciding which groups a run may touch.
///
/// A group is in scope iff its name matches `^{service}-v[0-9]+$` for at
/// least one configured service. Service names are escaped before the
/// pattern is compiled, so a literal `.` in a service name matches only
/// itself.
#[derive(Debug)]
pub struct ServiceFilter {
    patterns: Vec<Regex>,
}

impl ServiceFilter {
    /// Compile a filter from service name prefixes. Blank entries are ignored.
    pub fn new<I, S>(services: I) -> Result<Self, ReconcileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns = Vec::new();
        for service in services {
            let service = service.as_ref().trim();
            if service.is_empty() {
                continue;
            }
            let pattern = format!("^{}-v[0-9]+$", regex::escape(service));
            patterns.push(Regex::new(&pattern)?);
        }
        Ok(Self { patterns })
    }

    /// Returns true if the group name matches any configured service.
    pub fn is_in_scope(&self, group_name: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(group_name))
    }

    /// Returns true if no services are configured (nothing is in scope).
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(members: &[&str]) -> Vec<String> {
        members.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn remove_absent_az_is_noop() {
        let current = set(&["us-east-1a", "us-east-1b"]);
        let next = reconcile_az(Some(&current), Some("us-east-1c"), SetOp::Remove);
        assert_eq!(next, Some(current));
    }

    #[test]
    fn add_present_az_is_noop() {
        let current = set(&["us-east-1a", "us-east-1b"]);
        let next = reconcile_az(Some(&current), Some("us-east-1a"), SetOp::Add);
        assert_eq!(next, Some(current));
    }

    #[test]
    fn absent_az_leaves_set_unchanged() {
        let current = set(&["us-east-1a"]);
        assert_eq!(
            reconcile_az(Some(&current), None, SetOp::Remove),
            Some(current.clone())
        );
        assert_eq!(
            reconcile_az(Some(&current), Some(""), SetOp::Add),
            Some(current)
        );
    }

    #[test]
    fn absent_current_set_propagates_none() {
        assert_eq!(reconcile_az(None, Some("us-east-1a"), SetOp::Remove), None);
        assert_eq!(
            reconcile_subnets(None, Some(&set(&["subnet-1"])), SetOp::Add),
            None
        );
    }

    #[test]
    fn subnet_batch_applies_each_id() {
        let current = set(&["subnet-1", "subnet-2", "subnet-3"]);
        let ids = set(&["subnet-1", "subnet-3", "subnet-9"]);
        let next = reconcile_subnets(Some(&current), Some(&ids), SetOp::Remove);
        assert_eq!(next, Some(set(&["subnet-2"])));
    }

    #[test]
    fn subnet_batch_removal_is_order_independent() {
        let current = set(&["subnet-1", "subnet-2", "subnet-3"]);
        let forward = set(&["subnet-1", "subnet-3"]);
        let reverse = set(&["subnet-3", "subnet-1"]);

        assert_eq!(
            reconcile_subnets(Some(&current), Some(&forward), SetOp::Remove),
            reconcile_subnets(Some(&current), Some(&reverse), SetOp::Remove),
        );
    }

    #[test]
    fn empty_id_batch_is_noop() {
        let current = set(&["subnet-1"]);
        let next = reconcile_subnets(Some(&current), Some(&[]), SetOp::Remove);
        assert_eq!(next, Some(current));
    }

    #[test]
    fn compute_update_swaps_blacklisted_zone_for_whitelisted() {
        let azs = set(&["us-east-1a", "us-east-1b"]);
        let subnets = set(&["subnet-1", "subnet-2"]);
        let policy = ResolvedPolicy {
            blacklist_az: Some("us-east-1a".to_string()),
            blacklist_subnets: Some(set(&["subnet-1"])),
            whitelist_az: Some("us-east-1c".to_string()),
            whitelist_subnets: Some(set(&["subnet-3"])),
        };

        let result = compute_update(Some(&azs), Some(&subnets), &policy);

        assert!(result.is_valid());
        assert_eq!(
            result.availability_zones,
            Some(set(&["us-east-1b", "us-east-1c"]))
        );
        assert_eq!(result.subnets, Some(set(&["subnet-2", "subnet-3"])));
    }

    #[test]
    fn compute_update_is_idempotent() {
        let azs = set(&["us-east-1a", "us-east-1b"]);
        let subnets = set(&["subnet-1", "subnet-2"]);
        let policy = ResolvedPolicy {
            blacklist_az: Some("us-east-1a".to_string()),
            blacklist_subnets: Some(set(&["subnet-1"])),
            whitelist_az: Some("us-east-1c".to_string()),
            whitelist_subnets: Some(set(&["subnet-3"])),
        };

        let once = compute_update(Some(&azs), Some(&subnets), &policy);
        let twice = compute_update(
            once.availability_zones.as_deref(),
            once.subnets.as_deref(),
            &policy,
        );

        assert_eq!(once, twice);
    }

    #[test]
    fn blacklisting_the_only_zone_is_invalid() {
        let azs = set(&["us-east-1a"]);
        let subnets = set(&["subnet-1"]);
        let policy = ResolvedPolicy {
            blacklist_az: Some("us-east-1a".to_string()),
            blacklist_subnets: Some(set(&["subnet-1"])),
            ..Default::default()
        };

        let result = compute_update(Some(&azs), Some(&subnets), &policy);

        assert_eq!(result.availability_zones, Some(vec![]));
        assert!(!result.is_valid());
        assert_eq!(result.into_valid(), None);
    }

    #[test]
    fn missing_subnet_set_is_invalid_even_with_zones() {
        let azs = set(&["us-east-1a", "us-east-1b"]);
        let policy = ResolvedPolicy {
            blacklist_az: Some("us-east-1a".to_string()),
            blacklist_subnets: Some(set(&["subnet-1"])),
            ..Default::default()
        };

        let result = compute_update(Some(&azs), None, &policy);

        assert_eq!(result.subnets, None);
        assert!(!result.is_valid());
    }

    #[test]
    fn noop_policy_returns_current_sets() {
        let azs = set(&["us-east-1a"]);
        let subnets = set(&["subnet-1"]);

        let result = compute_update(Some(&azs), Some(&subnets), &ResolvedPolicy::default());

        assert_eq!(result.availability_zones, Some(azs));
        assert_eq!(result.subnets, Some(subnets));
        assert!(result.is_valid());
    }

    #[test]
    fn zone_policy_normalizes_empty_strings() {
        let policy = ZonePolicy::new(Some(String::new()), Some("us-east-1c".to_string()));
        assert_eq!(policy.blacklist_az, None);
        assert_eq!(policy.whitelist_az, Some("us-east-1c".to_string()));
        assert!(!policy.is_noop());

        assert!(ZonePolicy::new(None, Some(String::new())).is_noop());
    }

    #[test]
    fn service_filter_requires_versioned_suffix() {
        let filter = ServiceFilter::new(["checkout"]).unwrap();

        assert!(filter.is_in_scope("checkout-v3"));
        assert!(filter.is_in_scope("checkout-v12"));
        assert!(!filter.is_in_scope("checkout-worker"));
        assert!(!filter.is_in_scope("checkout-v"));
        assert!(!filter.is_in_scope("checkout-v3a"));
        assert!(!filter.is_in_scope("cart-v3"));
    }

    #[test]
    fn service_filter_matches_any_configured_service() {
        let filter = ServiceFilter::new(["checkout", "cart"]).unwrap();

        assert!(filter.is_in_scope("checkout-v1"));
        assert!(filter.is_in_scope("cart-v7"));
        assert!(!filter.is_in_scope("billing-v1"));
    }

    #[test]
    fn service_filter_escapes_metacharacters() {
        let filter = ServiceFilter::new(["pay.ments"]).unwrap();

        assert!(filter.is_in_scope("pay.ments-v1"));
        assert!(!filter.is_in_scope("payxments-v1"));
    }

    #[test]
    fn service_filter_ignores_blank_entries() {
        let filter = ServiceFilter::new(["", "  ", "checkout"]).unwrap();

        assert!(filter.is_in_scope("checkout-v1"));
        assert!(!filter.is_empty());

        let empty = ServiceFilter::new(Vec::<String>::new()).unwrap();
        assert!(empty.is_empty());
        assert!(!empty.is_in_scope("checkout-v1"));
    }
}
