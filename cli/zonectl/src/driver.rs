//! Driver: one reconciliation pass over the fleet.
//!
//! The driver:
//! - Resolves the policy AZs to subnet ids (fatal if a named AZ is empty)
//! - Lists the auto-scaling groups (fatal if the registry is empty)
//! - Reconciles each in-scope group sequentially, submitting valid updates
//!   and marking instances in the blacklisted zone unhealthy
//!
//! Per-group structural problems are logged and skipped; the run carries
//! on with the next group. Provider failures abort the run, and groups
//! already updated stay updated.

use tracing::{debug, error, info};

use zonectl_reconcile::{compute_update, ResolvedPolicy, ServiceFilter, ZonePolicy};

use crate::error::RunError;
use crate::mapper::ZoneMapper;
use crate::provider::{ScalingApi, SubnetInventory};

/// Health status submitted for instances in the blacklisted zone.
const UNHEALTHY: &str = "Unhealthy";

/// Configuration for one reconciliation run.
pub struct RunConfig {
    /// Which groups are in scope.
    pub filter: ServiceFilter,

    /// The blacklist/whitelist policy to apply.
    pub policy: ZonePolicy,

    /// Compute and log updates without issuing mutating calls.
    pub dry_run: bool,
}

/// Why an in-scope group was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The group reported neither AZ nor subnet data.
    MissingZoneInfo,

    /// Reconciliation would leave the group with an empty AZ or subnet set.
    InvalidReconciliation,
}

/// Outcome of one run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Groups whose update was submitted (or would be, in dry-run mode).
    pub updated: Vec<String>,

    /// In-scope groups skipped, with the reason.
    pub skipped: Vec<(String, SkipReason)>,

    /// Instances marked unhealthy.
    pub instances_marked: usize,
}

/// Drives one sequential pass over the fleet.
pub struct Driver<'a> {
    inventory: &'a dyn SubnetInventory,
    scaling: &'a dyn ScalingApi,
    config: RunConfig,
}

impl<'a> Driver<'a> {
    pub fn new(
        inventory: &'a dyn SubnetInventory,
        scaling: &'a dyn ScalingApi,
        config: RunConfig,
    ) -> Self {
        Self {
            inventory,
            scaling,
            config,
        }
    }

    /// Perform one reconciliation pass.
    pub async fn run(&self) -> Result<RunSummary, RunError> {
        let policy = self.resolve_policy().await?;

        info!(
            blacklist_subnets = ?policy.blacklist_subnets,
            whitelist_subnets = ?policy.whitelist_subnets,
            "resolved zone policy"
        );

        let groups = self.scaling.list_groups().await?;
        if groups.is_empty() {
            return Err(RunError::EmptyRegistry);
        }

        let mut summary = RunSummary::default();

        for group in &groups {
            if !self.config.filter.is_in_scope(&group.name) {
                debug!(group = %group.name, "out of scope, ignoring");
                continue;
            }

            let azs = group
                .availability_zones
                .clone()
                .filter(|azs| !azs.is_empty());
            let subnets = group.subnet_ids();

            if azs.is_none() && subnets.is_none() {
                error!(group = %group.name, "group reports no AZ or subnet data");
                summary
                    .skipped
                    .push((group.name.clone(), SkipReason::MissingZoneInfo));
                continue;
            }

            info!(
                group = %group.name,
                azs = ?azs,
                subnets = ?subnets,
                "current zone membership"
            );

            let result = compute_update(azs.as_deref(), subnets.as_deref(), &policy);
            let Some((new_azs, new_subnets)) = result.into_valid() else {
                error!(
                    group = %group.name,
                    "reconciliation would leave an empty AZ or subnet set, not applying"
                );
                summary
                    .skipped
                    .push((group.name.clone(), SkipReason::InvalidReconciliation));
                continue;
            };

            info!(
                group = %group.name,
                azs = ?new_azs,
                subnets = ?new_subnets,
                dry_run = self.config.dry_run,
                "updating group zone membership"
            );
            summary.updated.push(group.name.clone());

            if self.config.dry_run {
                continue;
            }

            self.scaling
                .update_group(&group.name, &new_azs, &new_subnets.join(","))
                .await?;

            if let Some(blacklist_az) = self.config.policy.blacklist_az.as_deref() {
                for instance in &group.instances {
                    if instance.availability_zone != blacklist_az {
                        continue;
                    }
                    info!(
                        group = %group.name,
                        instance_id = %instance.instance_id,
                        az = %instance.availability_zone,
                        "marking instance unhealthy"
                    );
                    self.scaling
                        .set_instance_health(&instance.instance_id, UNHEALTHY, false)
                        .await?;
                    summary.instances_marked += 1;
                }
            }
        }

        info!(
            updated = summary.updated.len(),
            skipped = summary.skipped.len(),
            instances_marked = summary.instances_marked,
            "run complete"
        );
        Ok(summary)
    }

    /// Resolve both policy sides to subnet ids before touching any group.
    async fn resolve_policy(&self) -> Result<ResolvedPolicy, RunError> {
        let mapper = ZoneMapper::new(self.inventory);

        let blacklist_subnets = mapper
            .resolve_subnets(self.config.policy.blacklist_az.as_deref())
            .await?;
        let whitelist_subnets = mapper
            .resolve_subnets(self.config.policy.whitelist_az.as_deref())
            .await?;

        Ok(ResolvedPolicy {
            blacklist_az: self.config.policy.blacklist_az.clone(),
            blacklist_subnets,
            whitelist_az: self.config.policy.whitelist_az.clone(),
            whitelist_subnets,
        })
    }
}
