//! Zone mapper: resolve a policy AZ to the subnet ids that live in it.

use tracing::debug;

use crate::error::RunError;
use crate::provider::SubnetInventory;

/// Resolves AZ names against the subnet inventory.
pub struct ZoneMapper<'a> {
    inventory: &'a dyn SubnetInventory,
}

impl<'a> ZoneMapper<'a> {
    pub fn new(inventory: &'a dyn SubnetInventory) -> Self {
        Self { inventory }
    }

    /// Resolve an optional AZ name to its subnet ids.
    ///
    /// An absent or empty AZ propagates as `Ok(None)` ("no policy on this
    /// side"), never as an empty set. A named AZ with zero subnets is an
    /// error: silently treating it as "nothing to add/remove" could strip
    /// a group's subnets without touching its AZ set.
    pub async fn resolve_subnets(&self, az: Option<&str>) -> Result<Option<Vec<String>>, RunError> {
        let az = match az {
            Some(az) if !az.is_empty() => az,
            _ => return Ok(None),
        };

        let subnet_ids = self.inventory.list_subnets(az).await?;
        if subnet_ids.is_empty() {
            return Err(RunError::EmptyAvailabilityZone { az: az.to_string() });
        }

        debug!(az = %az, subnets = ?subnet_ids, "resolved zone subnets");
        Ok(Some(subnet_ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockCloud;

    #[tokio::test]
    async fn absent_zone_resolves_to_no_policy() {
        let cloud = MockCloud::new();
        let mapper = ZoneMapper::new(&cloud);

        assert_eq!(mapper.resolve_subnets(None).await.unwrap(), None);
        assert_eq!(mapper.resolve_subnets(Some("")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn named_zone_resolves_to_inventory_order() {
        let cloud = MockCloud::new().with_subnets("us-east-1a", &["subnet-1", "subnet-2"]);
        let mapper = ZoneMapper::new(&cloud);

        let resolved = mapper.resolve_subnets(Some("us-east-1a")).await.unwrap();
        assert_eq!(
            resolved,
            Some(vec!["subnet-1".to_string(), "subnet-2".to_string()])
        );
    }

    #[tokio::test]
    async fn zone_with_zero_subnets_is_an_error() {
        let cloud = MockCloud::new();
        let mapper = ZoneMapper::new(&cloud);

        let err = mapper.resolve_subnets(Some("us-east-1z")).await.unwrap_err();
        assert!(matches!(
            err,
            RunError::EmptyAvailabilityZone { az } if az == "us-east-1z"
        ));
    }
}
