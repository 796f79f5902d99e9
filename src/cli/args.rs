//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// issn-probe - Verify journal ISSNs against their landing pages
///
/// Fetches each journal's landing page with bounded concurrency, caches
/// the pages on disk, and reports whether the expected ISSN and the
/// publishing platform's signature appear in them.
#[derive(Parser, Debug)]
#[command(name = "issn-probe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ISSN_PROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Page cache directory (overrides cache.dir)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch landing pages and match them against the input records
    Match(MatchArgs),

    /// Look up ISSNs in the ISSN registry
    Lookup(LookupArgs),

    /// Check ISSN check digits
    Validate(ValidateArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),

    /// Inspect or clear the page cache
    Cache(CacheArgs),
}

/// Arguments for the match command
#[derive(Parser, Debug)]
pub struct MatchArgs {
    /// Input CSV with oai_url, set_spec and issn columns
    pub input: PathBuf,

    /// Output CSV (input columns plus match results)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of concurrent workers (default: from config)
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Process targets in input order
    #[arg(long)]
    pub no_shuffle: bool,

    /// Write failed targets as JSON lines to this file
    #[arg(long)]
    pub failures: Option<PathBuf>,
}

/// Arguments for the lookup command
#[derive(Parser, Debug)]
pub struct LookupArgs {
    /// ISSNs to look up
    pub issns: Vec<String>,

    /// Take ISSNs from the issn column of this CSV
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Write results as JSON to this file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// ISSNs to check, with or without hyphen
    #[arg(required = true)]
    pub issns: Vec<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show the cache directory
    Path,

    /// Show entry count and size
    Stats,

    /// Remove every cached page
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_match() {
        let cli = Cli::parse_from([
            "issn-probe",
            "match",
            "beacon.csv",
            "-o",
            "out.csv",
            "-j",
            "16",
            "--no-shuffle",
        ]);
        match cli.command {
            Commands::Match(args) => {
                assert_eq!(args.input, PathBuf::from("beacon.csv"));
                assert_eq!(args.output, PathBuf::from("out.csv"));
                assert_eq!(args.concurrency, Some(16));
                assert!(args.no_shuffle);
                assert!(args.failures.is_none());
            }
            _ => panic!("expected Match command"),
        }
    }

    #[test]
    fn cli_match_requires_output() {
        assert!(Cli::try_parse_from(["issn-probe", "match", "beacon.csv"]).is_err());
    }

    #[test]
    fn cli_parses_lookup() {
        let cli = Cli::parse_from(["issn-probe", "lookup", "0024-9319", "0317-8471"]);
        match cli.command {
            Commands::Lookup(args) => {
                assert_eq!(args.issns, vec!["0024-9319", "0317-8471"]);
                assert!(args.input.is_none());
                assert!(args.output.is_none());
            }
            _ => panic!("expected Lookup command"),
        }
    }

    #[test]
    fn cli_validate_requires_issn() {
        assert!(Cli::try_parse_from(["issn-probe", "validate"]).is_err());
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from(["issn-probe", "-vv", "cache", "stats", "--cache-dir", "/tmp/pages"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.cache_dir, Some(PathBuf::from("/tmp/pages")));
        assert!(matches!(
            cli.command,
            Commands::Cache(CacheArgs {
                action: CacheAction::Stats
            })
        ));
    }

    #[test]
    fn cli_parses_config_default_action() {
        let cli = Cli::parse_from(["issn-probe", "config"]);
        match cli.command {
            Commands::Config(args) => assert!(args.action.is_none()),
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn cli_parses_cache_clear_yes() {
        let cli = Cli::parse_from(["issn-probe", "cache", "clear", "--yes"]);
        assert!(matches!(
            cli.command,
            Commands::Cache(CacheArgs {
                action: CacheAction::Clear { yes: true }
            })
        ));
    }
}
