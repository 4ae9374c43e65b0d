use clap::{Args, Parser, Subcommand, ValueEnum};

use std::path::PathBuf;

use super::constants::{
    ENV_CATALOG_TTL_SECS, ENV_CONFIG, ENV_DATABASE, ENV_HOST, ENV_PORT,
    ENV_QUERY_CACHE_MAX_ENTRIES, ENV_QUERY_CACHE_TTL_SECS, ENV_TABLE, STAR_RATING_MAX,
    STAR_RATING_MIN,
};
use crate::domain::selection::{
    Choice, DurationBand, FilterSelection, PriceBand, SeatThreshold, StarRange, TimeBand,
};

#[derive(Parser)]
#[command(name = "busline")]
#[command(version, about = "Bus route filter and export", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    // Store options
    /// Path to the SQLite route database (never created or written)
    #[arg(long, short = 'd', global = true, env = ENV_DATABASE)]
    pub database: Option<PathBuf>,

    /// Route table name
    #[arg(long, global = true, env = ENV_TABLE)]
    pub table: Option<String>,

    // Cache options
    /// Catalog time-to-live in seconds (0 = until refreshed)
    #[arg(long, global = true, env = ENV_CATALOG_TTL_SECS)]
    pub catalog_ttl: Option<u64>,

    /// Search result time-to-live in seconds (0 = until refreshed)
    #[arg(long, global = true, env = ENV_QUERY_CACHE_TTL_SECS)]
    pub query_cache_ttl: Option<u64>,

    /// Maximum number of cached search results
    #[arg(long, global = true, env = ENV_QUERY_CACHE_MAX_ENTRIES)]
    pub query_cache_max_entries: Option<u64>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Serve,
    /// Print the catalog option sets as JSON
    Catalog,
    /// Run one filter selection and print or save the matching routes
    Query(QueryArgs),
}

/// Output format for `query`
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Filter flags for `query`; every flag defaults to "Anything"
#[derive(Args, Clone, Debug)]
pub struct QueryArgs {
    /// Bus type to include (repeatable)
    #[arg(long = "bustype", value_name = "TYPE")]
    pub bustypes: Vec<String>,

    /// Route name to include (repeatable)
    #[arg(long = "route", value_name = "ROUTE")]
    pub routes: Vec<String>,

    /// Price band: Anything, 0-250, 250-500, 500-1000, 1000-1500, 1500+
    #[arg(long, default_value_t = PriceBand::Anything)]
    pub price: PriceBand,

    /// Lowest star rating
    #[arg(long, default_value_t = STAR_RATING_MIN)]
    pub min_rating: f64,

    /// Highest star rating
    #[arg(long, default_value_t = STAR_RATING_MAX)]
    pub max_rating: f64,

    /// Minimum seats available, or Anything
    #[arg(long, default_value_t = SeatThreshold::Anything)]
    pub seats: SeatThreshold,

    /// Departure band: Anything, 0-6, 6-12, 12-18, 18-24
    #[arg(long, default_value_t = TimeBand::Anything)]
    pub departure: TimeBand,

    /// Arrival band: Anything, 0-6, 6-12, 12-18, 18-24
    #[arg(long, default_value_t = TimeBand::Anything)]
    pub arrival: TimeBand,

    /// Duration band in hours: Anything, 0-2, 2-4, 4-6, 6+
    #[arg(long, default_value_t = DurationBand::Anything)]
    pub duration: DurationBand,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write CSV to this file instead of stdout (implies csv format)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

impl QueryArgs {
    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            bustypes: Choice::from_selected(self.bustypes.clone()),
            routes: Choice::from_selected(self.routes.clone()),
            price: self.price,
            star_rating: StarRange(self.min_rating, self.max_rating),
            seats: self.seats,
            departure: self.departure,
            arrival: self.arrival,
            duration: self.duration,
        }
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub table: Option<String>,
    pub catalog_ttl: Option<u64>,
    pub query_cache_ttl: Option<u64>,
    pub query_cache_max_entries: Option<u64>,
}

impl From<&Cli> for CliConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            host: cli.host.clone(),
            port: cli.port,
            config: cli.config.clone(),
            database: cli.database.clone(),
            table: cli.table.clone(),
            catalog_ttl: cli.catalog_ttl,
            query_cache_ttl: cli.query_cache_ttl,
            query_cache_max_entries: cli.query_cache_max_entries,
        }
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig::from(&cli);
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_from(args: &[&str]) -> (CliConfig, Option<Commands>) {
        let cli = Cli::try_parse_from(args).unwrap();
        (CliConfig::from(&cli), cli.command)
    }

    #[test]
    fn test_no_subcommand() {
        let (config, command) = parse_from(&["busline"]);
        assert!(command.is_none());
        assert!(config.database.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let (config, command) = parse_from(&[
            "busline",
            "serve",
            "--port",
            "8080",
            "--database",
            "/data/redbus.db",
            "--catalog-ttl",
            "0",
        ]);
        assert!(matches!(command, Some(Commands::Serve)));
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.database, Some(PathBuf::from("/data/redbus.db")));
        assert_eq!(config.catalog_ttl, Some(0));
    }

    #[test]
    fn test_query_defaults_are_unconstrained() {
        let (_, command) = parse_from(&["busline", "query"]);
        let Some(Commands::Query(args)) = command else {
            panic!("expected query command");
        };
        assert!(args.selection().is_unconstrained());
        assert_eq!(args.format, OutputFormat::Table);
    }

    #[test]
    fn test_query_filters() {
        let (_, command) = parse_from(&[
            "busline",
            "query",
            "--bustype",
            "A/C Sleeper",
            "--bustype",
            "Seater",
            "--price",
            "1500+",
            "--seats",
            "2",
            "--departure",
            "18-24",
            "--duration",
            "6+",
            "--min-rating",
            "3.5",
            "--format",
            "json",
        ]);
        let Some(Commands::Query(args)) = command else {
            panic!("expected query command");
        };

        let selection = args.selection();
        assert_eq!(
            selection.bustypes,
            Choice::from_selected(["Seater", "A/C Sleeper"])
        );
        assert_eq!(selection.price, PriceBand::Over1500);
        assert_eq!(selection.seats, SeatThreshold::AtLeast(2));
        assert_eq!(selection.departure, TimeBand::Evening);
        assert_eq!(selection.duration, DurationBand::Over6);
        assert_eq!(selection.star_rating, StarRange(3.5, 5.0));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_anything_in_categorical_list() {
        let (_, command) = parse_from(&["busline", "query", "--route", "Anything", "--route", "X"]);
        let Some(Commands::Query(args)) = command else {
            panic!("expected query command");
        };
        assert_eq!(args.selection().routes, Choice::Anything);
    }

    #[test]
    fn test_invalid_band_is_rejected() {
        assert!(Cli::try_parse_from(["busline", "query", "--price", "0-100"]).is_err());
        assert!(Cli::try_parse_from(["busline", "query", "--seats", "-1"]).is_err());
    }
}
