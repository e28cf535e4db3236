//! Error taxonomy and display for the run.

use colored::Colorize;
use thiserror::Error;

/// Fatal run errors. Per-group structural problems are not represented
/// here; the driver logs those and continues with the next group.
#[derive(Debug, Error)]
pub enum RunError {
    /// The registry returned zero auto-scaling groups.
    #[error("no auto-scaling groups returned by the registry")]
    EmptyRegistry,

    /// A policy AZ resolved to zero subnets in the inventory.
    #[error("availability zone '{az}' has no subnets in the inventory")]
    EmptyAvailabilityZone { az: String },

    /// Transport/permission failure from a provider call, surfaced unmodified.
    #[error("{0}")]
    Provider(#[from] anyhow::Error),
}

/// Print a fatal error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    if let Some(run_err) = err.downcast_ref::<RunError>() {
        match run_err {
            RunError::EmptyRegistry => {
                eprintln!(
                    "\n{}",
                    "Hint: Check that the configured region has auto-scaling groups.".yellow()
                );
            }
            RunError::EmptyAvailabilityZone { .. } => {
                eprintln!(
                    "\n{}",
                    "Hint: The policy names a zone with no subnets. Check the AZ name and region."
                        .yellow()
                );
            }
            RunError::Provider(_) => {
                eprintln!(
                    "\n{}",
                    "Hint: Check cloud credentials, region, and network connectivity.".yellow()
                );
            }
        }
    }
}
