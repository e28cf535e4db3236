//! Command-line surface.

use clap::Parser;

/// zonectl - reconcile auto-scaling group zone membership.
#[derive(Debug, Parser)]
#[command(name = "zonectl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Service name prefixes, comma separated. A group is in scope only
    /// if its name matches `<service>-v<digits>`.
    #[arg(short = 's', long, value_delimiter = ',', required = true)]
    pub services: Vec<String>,

    /// Availability zone to remove from matching groups.
    #[arg(short = 'b', long)]
    pub blacklist_az: Option<String>,

    /// Availability zone to add to matching groups.
    #[arg(short = 'w', long)]
    pub whitelist_az: Option<String>,

    /// Compute and log updates without issuing mutating calls.
    #[arg(short = 'd', long)]
    pub dryrun: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn services_are_comma_separated() {
        let cli = Cli::try_parse_from(["zonectl", "-s", "checkout,cart"]).unwrap();
        assert_eq!(cli.services, vec!["checkout", "cart"]);
        assert!(!cli.dryrun);
    }

    #[test]
    fn services_flag_is_required() {
        assert!(Cli::try_parse_from(["zonectl", "-b", "us-east-1a"]).is_err());
    }

    // The tool this replaces routed --whitelist-az into the blacklist
    // variable. Pin the corrected routing.
    #[test]
    fn whitelist_flag_populates_the_whitelist_side() {
        let cli =
            Cli::try_parse_from(["zonectl", "-s", "checkout", "-w", "us-east-1c"]).unwrap();
        assert_eq!(cli.whitelist_az.as_deref(), Some("us-east-1c"));
        assert_eq!(cli.blacklist_az, None);
    }

    #[test]
    fn policy_flags_parse_in_long_and_short_form() {
        let cli = Cli::try_parse_from([
            "zonectl",
            "--services",
            "checkout",
            "--blacklist-az",
            "us-east-1a",
            "--whitelist-az",
            "us-east-1c",
            "-d",
        ])
        .unwrap();

        assert_eq!(cli.blacklist_az.as_deref(), Some("us-east-1a"));
        assert_eq!(cli.whitelist_az.as_deref(), Some("us-east-1c"));
        assert!(cli.dryrun);
    }
}
