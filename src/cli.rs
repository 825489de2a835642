use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::sheet::ColumnOverrides;

#[derive(Parser)]
#[command(name = "price-sniper")]
#[command(about = "Finds the cheapest plausible online offer for every line of a procurement sheet", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON config file (missing file = defaults)
    #[arg(short, long, default_value = "config.json", global = true)]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up every row and write the sheet back with the results appended
    Search {
        /// Input spreadsheet (.xlsx/.xls/.ods)
        #[arg(required = true)]
        input: PathBuf,

        /// Output spreadsheet (default: <input>_prices.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        columns: ColumnArgs,

        /// Lowest acceptable price, inclusive
        #[arg(long)]
        min_price: Option<u64>,

        /// Highest acceptable price, inclusive; 0 = no limit
        #[arg(long)]
        max_price: Option<u64>,

        /// Pause between rows in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Rows looked up at once
        #[arg(long)]
        concurrency: Option<usize>,

        /// SQLite file that records finished rows so an interrupted run can resume
        #[arg(long)]
        checkpoint: Option<String>,

        /// Ignore and clear earlier checkpointed results for this input
        #[arg(long)]
        fresh: bool,

        /// Access code, when the config requires one
        #[arg(long)]
        access_code: Option<String>,
    },

    /// Print the candidate queries for every row without searching
    Plan {
        /// Input spreadsheet (.xlsx/.xls/.ods)
        #[arg(required = true)]
        input: PathBuf,

        #[command(flatten)]
        columns: ColumnArgs,
    },
}

/// Column choices by header text or letter; detection fills in the rest.
#[derive(Args, Debug, Clone, Default)]
pub struct ColumnArgs {
    /// Item name column
    #[arg(long)]
    pub name_col: Option<String>,

    /// Specification column
    #[arg(long)]
    pub spec_col: Option<String>,

    /// Maker column
    #[arg(long)]
    pub maker_col: Option<String>,

    /// Model column
    #[arg(long)]
    pub model_col: Option<String>,
}

impl From<ColumnArgs> for ColumnOverrides {
    fn from(args: ColumnArgs) -> Self {
        Self {
            name: args.name_col,
            spec: args.spec_col,
            maker: args.maker_col,
            model: args.model_col,
        }
    }
}

/// `orders/list.xlsx` -> `orders/list_prices.xlsx`
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "result".to_string());
    input.with_file_name(format!("{}_prices.xlsx", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_flags() {
        let cli = Cli::try_parse_from([
            "price-sniper",
            "search",
            "items.xlsx",
            "--min-price",
            "1000",
            "--name-col",
            "품목명",
            "--concurrency",
            "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Search { input, min_price, max_price, columns, concurrency, fresh, .. } => {
                assert_eq!(input, PathBuf::from("items.xlsx"));
                assert_eq!(min_price, Some(1000));
                assert_eq!(max_price, None);
                assert_eq!(columns.name_col.as_deref(), Some("품목명"));
                assert_eq!(concurrency, Some(2));
                assert!(!fresh);
            }
            Commands::Plan { .. } => panic!("expected search"),
        }
        assert_eq!(cli.config, "config.json");
    }

    #[test]
    fn output_defaults_next_to_input() {
        assert_eq!(
            default_output_path(Path::new("orders/list.xlsx")),
            PathBuf::from("orders/list_prices.xlsx")
        );
    }
}
