//! Cloud provider interface and mock implementation.
//!
//! The provider traits abstract the calls the driver makes against the
//! cloud API:
//! - Listing the subnets that exist in an availability zone
//! - Listing, updating, and health-flagging auto-scaling groups
//!
//! A mock implementation is provided for testing and development.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// One instance inside an auto-scaling group.
#[derive(Debug, Clone)]
pub struct GroupInstance {
    /// Cloud instance id.
    pub instance_id: String,

    /// AZ the instance is running in.
    pub availability_zone: String,

    /// Health status as reported by the registry.
    pub health_status: String,
}

/// An auto-scaling group as reported by the registry.
///
/// `availability_zones` and `vpc_zone_identifier` stay optional: the driver
/// must distinguish a group that reports no zone data at all from one that
/// reports empty data.
#[derive(Debug, Clone)]
pub struct ScalingGroup {
    /// Group name.
    pub name: String,

    /// AZs the group currently spans.
    pub availability_zones: Option<Vec<String>>,

    /// Comma-joined subnet ids, as the registry reports them.
    pub vpc_zone_identifier: Option<String>,

    /// Maximum group size.
    pub max_size: i32,

    /// Desired instance count.
    pub desired_capacity: i32,

    /// Instances currently in the group.
    pub instances: Vec<GroupInstance>,
}

impl ScalingGroup {
    /// Split the comma-joined zone identifier into subnet ids.
    ///
    /// Returns `None` when the field is absent or blank, so callers can
    /// tell "no subnet data" apart from "zero subnets after reconciliation".
    pub fn subnet_ids(&self) -> Option<Vec<String>> {
        let joined = self.vpc_zone_identifier.as_deref()?.trim();
        if joined.is_empty() {
            return None;
        }
        Some(joined.split(',').map(|id| id.trim().to_string()).collect())
    }
}

/// Read-only subnet inventory lookup.
#[async_trait]
pub trait SubnetInventory: Send + Sync {
    /// List the subnet ids that exist in the given AZ.
    ///
    /// An empty result is not itself an error; the zone mapper decides
    /// whether to escalate it.
    async fn list_subnets(&self, availability_zone: &str) -> Result<Vec<String>>;
}

/// Auto-scaling group registry and mutators.
#[async_trait]
pub trait ScalingApi: Send + Sync {
    /// List every auto-scaling group visible to this account/region.
    async fn list_groups(&self) -> Result<Vec<ScalingGroup>>;

    /// Replace a group's AZ set and subnet membership.
    async fn update_group(
        &self,
        name: &str,
        availability_zones: &[String],
        vpc_zone_identifier: &str,
    ) -> Result<()>;

    /// Set the health status of a single instance.
    async fn set_instance_health(
        &self,
        instance_id: &str,
        health_status: &str,
        respect_grace_period: bool,
    ) -> Result<()>;
}

/// A group update recorded by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpdate {
    pub name: String,
    pub availability_zones: Vec<String>,
    pub vpc_zone_identifier: String,
}

/// An instance-health call recorded by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedHealthCall {
    pub instance_id: String,
    pub health_status: String,
    pub respect_grace_period: bool,
}

/// Mock cloud provider for testing and development.
pub struct MockCloud {
    /// Subnet ids per AZ.
    subnets_by_az: HashMap<String, Vec<String>>,

    /// Groups returned by [`ScalingApi::list_groups`].
    groups: Vec<ScalingGroup>,

    /// Whether mutating calls should fail.
    fail_mutations: bool,

    /// Updates received, in order.
    updates: Mutex<Vec<RecordedUpdate>>,

    /// Health calls received, in order.
    health_calls: Mutex<Vec<RecordedHealthCall>>,
}

impl MockCloud {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self {
            subnets_by_az: HashMap::new(),
            groups: Vec::new(),
            fail_mutations: false,
            updates: Mutex::new(Vec::new()),
            health_calls: Mutex::new(Vec::new()),
        }
    }

    /// Seed the subnet inventory for one AZ.
    pub fn with_subnets(mut self, availability_zone: &str, subnet_ids: &[&str]) -> Self {
        self.subnets_by_az.insert(
            availability_zone.to_string(),
            subnet_ids.iter().map(|id| id.to_string()).collect(),
        );
        self
    }

    /// Seed one auto-scaling group.
    pub fn with_group(mut self, group: ScalingGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Make all mutating calls fail.
    pub fn failing_mutations(mut self) -> Self {
        self.fail_mutations = true;
        self
    }

    /// Updates received so far.
    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// Instance-health calls received so far.
    pub fn health_calls(&self) -> Vec<RecordedHealthCall> {
        self.health_calls.lock().unwrap().clone()
    }
}

impl Default for MockCloud {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubnetInventory for MockCloud {
    async fn list_subnets(&self, availability_zone: &str) -> Result<Vec<String>> {
        Ok(self
            .subnets_by_az
            .get(availability_zone)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ScalingApi for MockCloud {
    async fn list_groups(&self) -> Result<Vec<ScalingGroup>> {
        Ok(self.groups.clone())
    }

    async fn update_group(
        &self,
        name: &str,
        availability_zones: &[String],
        vpc_zone_identifier: &str,
    ) -> Result<()> {
        if self.fail_mutations {
            anyhow::bail!("mock provider configured to fail mutations");
        }

        info!(group = %name, "[MOCK] updating group");
        self.updates.lock().unwrap().push(RecordedUpdate {
            name: name.to_string(),
            availability_zones: availability_zones.to_vec(),
            vpc_zone_identifier: vpc_zone_identifier.to_string(),
        });
        Ok(())
    }

    async fn set_instance_health(
        &self,
        instance_id: &str,
        health_status: &str,
        respect_grace_period: bool,
    ) -> Result<()> {
        if self.fail_mutations {
            anyhow::bail!("mock provider configured to fail mutations");
        }

        info!(instance_id = %instance_id, status = %health_status, "[MOCK] setting instance health");
        self.health_calls.lock().unwrap().push(RecordedHealthCall {
            instance_id: instance_id.to_string(),
            health_status: health_status.to_string(),
            respect_grace_period,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subnet_ids_split_the_joined_identifier() {
        let group = ScalingGroup {
            name: "checkout-v1".to_string(),
            availability_zones: Some(vec!["us-east-1a".to_string()]),
            vpc_zone_identifier: Some("subnet-1, subnet-2".to_string()),
            max_size: 2,
            desired_capacity: 1,
            instances: vec![],
        };

        assert_eq!(
            group.subnet_ids(),
            Some(vec!["subnet-1".to_string(), "subnet-2".to_string()])
        );
    }

    #[test]
    fn subnet_ids_treat_blank_identifier_as_absent() {
        let mut group = ScalingGroup {
            name: "checkout-v1".to_string(),
            availability_zones: None,
            vpc_zone_identifier: None,
            max_size: 0,
            desired_capacity: 0,
            instances: vec![],
        };
        assert_eq!(group.subnet_ids(), None);

        group.vpc_zone_identifier = Some("  ".to_string());
        assert_eq!(group.subnet_ids(), None);
    }
}
