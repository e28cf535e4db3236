//! zonectl - availability-zone reconciliation for auto-scaling fleets.
//!
//! Given a blacklist AZ and/or a whitelist AZ, zonectl recomputes the AZ
//! and subnet membership of every in-scope auto-scaling group, applies the
//! result when it is valid, and marks instances stranded in the excluded
//! zone unhealthy so the scaling service replaces them.
//!
//! ## Architecture
//!
//! - **Provider**: Abstracts the cloud API (subnet inventory, group
//!   registry, mutators). AWS-backed in production, in-memory in tests.
//! - **Zone Mapper**: Resolves a policy AZ to its subnet ids.
//! - **Driver**: One sequential pass over the fleet; per-group problems
//!   are skipped, systemic problems abort the run.

pub mod aws;
pub mod cli;
pub mod driver;
pub mod error;
pub mod mapper;
pub mod provider;
