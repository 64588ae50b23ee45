use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Aligned columns for humans
    Table,
}

#[derive(Parser, Debug)]
#[command(
    name = "carlot",
    bin_name = "carlot",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Filter car listings and manage sell-form drafts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding drafts and carlot.toml
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count, help_heading = "Options")]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Filter a JSON array of listings
    #[command(display_order = 1)]
    Filter {
        /// Path to the listings file
        file: PathBuf,

        /// Free-text search over make, model and city
        #[arg(short, long)]
        search: Option<String>,

        /// Exact city (case-insensitive)
        #[arg(long)]
        city: Option<String>,

        /// Price range, e.g. 0-1000000 or 500000+
        #[arg(long, value_name = "RANGE")]
        price: Option<String>,

        /// Any other filter, repeatable
        #[arg(short = 'f', long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,

        /// Print only the number of matches
        #[arg(long, conflicts_with = "output")]
        count: bool,
    },

    /// List the available filter keys
    #[command(display_order = 2)]
    Keys,

    /// Inspect or clear the saved sell-form draft
    #[command(display_order = 3)]
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },

    /// Show the resolved configuration
    #[command(display_order = 4)]
    Config,
}

#[derive(Subcommand, Debug)]
pub enum DraftAction {
    /// Print the draft as JSON
    Show {
        /// Storage key (defaults to the configured draft key)
        #[arg(long)]
        key: Option<String>,
    },
    /// Delete the draft
    Clear {
        /// Storage key (defaults to the configured draft key)
        #[arg(long)]
        key: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeated_filters() {
        let cli = Cli::try_parse_from([
            "carlot",
            "filter",
            "cars.json",
            "-f",
            "year=2018+",
            "--filter",
            "transmission=automatic",
            "--price",
            "0-1000000",
        ])
        .unwrap();
        let Commands::Filter { filters, price, output, .. } = cli.command else {
            panic!("expected filter");
        };
        assert_eq!(filters, vec!["year=2018+", "transmission=automatic"]);
        assert_eq!(price.as_deref(), Some("0-1000000"));
        assert_eq!(output, OutputFormat::Json);
    }

    #[test]
    fn global_options_follow_subcommands() {
        let cli = Cli::try_parse_from(["carlot", "draft", "show", "--data-dir", "/tmp/x", "-vv"])
            .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert_eq!(cli.verbose, 2);
    }
}
