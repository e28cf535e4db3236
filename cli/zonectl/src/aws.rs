//! AWS-backed provider.
//!
//! Thin bindings from the provider traits to the EC2 and Auto Scaling
//! APIs. No pagination, retry, or credential logic lives here; the SDK's
//! defaults apply and transport failures surface unmodified.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_ec2::types::Filter;

use crate::provider::{GroupInstance, ScalingApi, ScalingGroup, SubnetInventory};

/// Provider backed by the AWS SDK.
pub struct AwsProvider {
    ec2: aws_sdk_ec2::Client,
    autoscaling: aws_sdk_autoscaling::Client,
}

impl AwsProvider {
    /// Build clients from the ambient environment (credentials chain,
    /// region, profile).
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            ec2: aws_sdk_ec2::Client::new(&config),
            autoscaling: aws_sdk_autoscaling::Client::new(&config),
        }
    }
}

#[async_trait]
impl SubnetInventory for AwsProvider {
    async fn list_subnets(&self, availability_zone: &str) -> Result<Vec<String>> {
        let response = self
            .ec2
            .describe_subnets()
            .filters(
                Filter::builder()
                    .name("availability-zone")
                    .values(availability_zone)
                    .build(),
            )
            .send()
            .await
            .with_context(|| format!("describing subnets in {availability_zone}"))?;

        Ok(response
            .subnets()
            .iter()
            .filter_map(|subnet| subnet.subnet_id().map(str::to_string))
            .collect())
    }
}

#[async_trait]
impl ScalingApi for AwsProvider {
    async fn list_groups(&self) -> Result<Vec<ScalingGroup>> {
        let response = self
            .autoscaling
            .describe_auto_scaling_groups()
            .send()
            .await
            .context("describing auto-scaling groups")?;

        let groups = response
            .auto_scaling_groups()
            .iter()
            .map(|group| {
                let availability_zones = match group.availability_zones() {
                    [] => None,
                    azs => Some(azs.to_vec()),
                };
                ScalingGroup {
                    name: group.auto_scaling_group_name().unwrap_or_default().to_string(),
                    availability_zones,
                    vpc_zone_identifier: group.vpc_zone_identifier().map(str::to_string),
                    max_size: group.max_size().unwrap_or_default(),
                    desired_capacity: group.desired_capacity().unwrap_or_default(),
                    instances: group
                        .instances()
                        .iter()
                        .map(|instance| GroupInstance {
                            instance_id: instance.instance_id().unwrap_or_default().to_string(),
                            availability_zone: instance
                                .availability_zone()
                                .unwrap_or_default()
                                .to_string(),
                            health_status: instance.health_status().unwrap_or_default().to_string(),
                        })
                        .collect(),
                }
            })
            .collect();

        Ok(groups)
    }

    async fn update_group(
        &self,
        name: &str,
        availability_zones: &[String],
        vpc_zone_identifier: &str,
    ) -> Result<()> {
        self.autoscaling
            .update_auto_scaling_group()
            .auto_scaling_group_name(name)
            .set_availability_zones(Some(availability_zones.to_vec()))
            .vpc_zone_identifier(vpc_zone_identifier)
            .send()
            .await
            .with_context(|| format!("updating auto-scaling group {name}"))?;
        Ok(())
    }

    async fn set_instance_health(
        &self,
        instance_id: &str,
        health_status: &str,
        respect_grace_period: bool,
    ) -> Result<()> {
        self.autoscaling
            .set_instance_health()
            .instance_id(instance_id)
            .health_status(health_status)
            .should_respect_grace_period(respect_grace_period)
            .send()
            .await
            .with_context(|| format!("setting health of instance {instance_id}"))?;
        Ok(())
    }
}
