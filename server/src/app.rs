//! Core application

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands, OutputFormat, QueryArgs};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG, NO_RESULTS_NOTICE};
use crate::core::shutdown::ShutdownService;
use crate::data::RouteStore;
use crate::domain::{CatalogService, ExportOutcome, FilterCompiler, RouteRecord, RouteSearch};
use crate::utils::file::write_atomic;
use crate::utils::string::{pad_right, truncate_cell};

const TABLE_HEADERS: [&str; 8] = [
    "Bus type", "Route", "Price", "Rating", "Seats", "Departs", "Arrives", "Hours",
];
const MAX_CELL_WIDTH: usize = 32;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub search: Arc<RouteSearch>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self::init(&cli_config).await?;
        match command.unwrap_or(Commands::Serve) {
            Commands::Serve => Self::start_server(app).await,
            Commands::Catalog => app.print_catalog().await,
            Commands::Query(args) => app.run_query(&args).await,
        }
    }

    /// Fatal error text with every context layer, outermost first
    pub fn error_message(err: &anyhow::Error) -> String {
        format!("Error: {:#}", err)
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        Self::from_config(config).await
    }

    /// Open the store and load the catalog. Either failing stops startup.
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let compiler = Arc::new(FilterCompiler::new(&config.database.table)?);
        let store = Arc::new(
            RouteStore::open(&config.database.path, compiler.table())
                .await
                .context("Failed to open route store")?,
        );

        let catalog = CatalogService::new(
            store.clone(),
            compiler.clone(),
            config.cache.catalog_ttl_secs,
        );
        let search = Arc::new(RouteSearch::new(
            store,
            compiler,
            catalog,
            config.cache.result_cache(),
        ));

        let catalog = search
            .catalog()
            .await
            .context("Failed to load route catalog")?;
        if catalog.is_empty() {
            tracing::warn!(
                table = %config.database.table,
                "Route table is empty, every search will return no results"
            );
        }

        Ok(Self {
            shutdown: ShutdownService::new(),
            config,
            search,
        })
    }

    async fn print_catalog(&self) -> Result<()> {
        let catalog = self.search.catalog().await?;
        println!("{}", serde_json::to_string_pretty(&catalog.options())?);
        Ok(())
    }

    async fn run_query(&self, args: &QueryArgs) -> Result<()> {
        let outcome = self.search.search(&args.selection()).await?;
        if let Some(notice) = outcome.notice() {
            println!("{}", notice);
            return Ok(());
        }

        let format = if args.output.is_some() {
            OutputFormat::Csv
        } else {
            args.format
        };

        match format {
            OutputFormat::Table => {
                print!("{}", render_table(&outcome.rows));
                println!("\n{} routes", outcome.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(outcome.rows.as_slice())?);
            }
            OutputFormat::Csv => match outcome.export()? {
                ExportOutcome::NoResults => println!("{}", NO_RESULTS_NOTICE),
                ExportOutcome::Csv(export) => match &args.output {
                    Some(path) => {
                        write_atomic(path, &export.body).with_context(|| {
                            format!("Failed to write export: {}", path.display())
                        })?;
                        eprintln!("Wrote {} routes to {}", outcome.len(), path.display());
                    }
                    None => std::io::stdout().write_all(&export.body)?,
                },
            },
        }
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        // stderr keeps stdout clean for `catalog` and `query` output
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        let catalog = app.search.catalog().await?;
        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            &app.config.database.path,
            &app.config.database.table,
            catalog.len(),
        );

        ApiServer::new(app).start().await?;
        tracing::debug!("Shutdown complete");
        Ok(())
    }
}

/// Plain-text table of result rows, one line per route
fn render_table(rows: &[RouteRecord]) -> String {
    let cells: Vec<[String; 8]> = rows
        .iter()
        .map(|r| {
            [
                truncate_cell(&r.bustype, MAX_CELL_WIDTH),
                truncate_cell(&r.route_name, MAX_CELL_WIDTH),
                format!("{:.2}", r.price),
                r.star_rating
                    .map(|s| format!("{:.1}", s))
                    .unwrap_or_else(|| "-".to_string()),
                r.seats_available.to_string(),
                r.departing_time.clone(),
                r.reaching_time.clone(),
                r.duration.to_string(),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, TABLE_HEADERS.iter().copied(), &widths);
    let rules = widths.map(|w| "-".repeat(w));
    push_row(&mut out, rules.iter().map(String::as_str), &widths);
    for row in &cells {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| pad_right(cell, width))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}
