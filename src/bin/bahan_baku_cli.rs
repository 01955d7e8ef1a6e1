use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use bahan_baku_api::{
    config::{self, AppConfig},
    db::{self, DbPool},
    reports::{export_material_analytics, export_transactions, ExportedReport, ReportFormat},
    repositories::{MaterialSource, SeaOrmMaterialSource, SortDirection},
    services::{
        analytics::{AnalyticsReport, AnalyticsService, MaterialMetrics},
        inventory::TransactionBoard,
    },
};

#[derive(Parser)]
#[command(
    name = "bahan-baku-cli",
    about = "Maintenance and reporting for the raw material inventory"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,
    /// Render a report to a file
    Export(ExportArgs),
    /// Print the aggregate material metrics
    Metrics(MetricsArgs),
}

#[derive(Args)]
struct ExportArgs {
    #[arg(long, value_enum)]
    report: ReportArg,
    #[arg(long, value_enum)]
    format: FormatArg,
    /// Directory the file is written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Args)]
struct MetricsArgs {
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Render the metrics as pretty JSON"
    )]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportArg {
    MaterialAnalytics,
    TransactionReport,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Pdf,
    Csv,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Pdf => ReportFormat::Pdf,
            FormatArg::Csv => ReportFormat::Csv,
        }
    }
}

struct CliContext {
    config: AppConfig,
    db: Arc<DbPool>,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;

        Ok(Self {
            config,
            db: Arc::new(db_pool),
        })
    }

    fn source(&self) -> Arc<dyn MaterialSource> {
        Arc::new(SeaOrmMaterialSource::new(
            self.db.clone(),
            self.config.fetch_timeout(),
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize().await?;

    match cli.command {
        Commands::Migrate => {
            db::run_migrations(&context.db)
                .await
                .context("failed to run migrations")?;
            println!("Migrations applied");
        }
        Commands::Export(args) => handle_export(&context, args).await?,
        Commands::Metrics(args) => handle_metrics(&context, args).await?,
    }

    Ok(())
}

async fn handle_export(context: &CliContext, args: ExportArgs) -> Result<()> {
    let source = context.source();
    let format = ReportFormat::from(args.format);
    let generated_at = Utc::now();

    let exported: ExportedReport = match args.report {
        ReportArg::MaterialAnalytics => {
            let records = AnalyticsService::new(source)
                .load_records()
                .await
                .context("failed to load analytics records")?;
            let report = AnalyticsReport::new(records, generated_at);
            export_material_analytics(&report, format, &context.config.report)?
        }
        ReportArg::TransactionReport => {
            let transactions = source
                .fetch_transactions(SortDirection::Desc)
                .await
                .context("failed to load transactions")?;
            let board = TransactionBoard::from_transactions(transactions);
            export_transactions(&board, generated_at, format, &context.config.report)?
        }
    };

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir.display()))?;
    let path = args.output_dir.join(&exported.filename);
    fs::write(&path, &exported.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Wrote {} ({} bytes)", path.display(), exported.bytes.len());
    Ok(())
}

async fn handle_metrics(context: &CliContext, args: MetricsArgs) -> Result<()> {
    let metrics = AnalyticsService::new(context.source())
        .compute_metrics()
        .await
        .context("failed to compute metrics")?;

    if args.json {
        print_json(&metrics)?;
    } else {
        render_metrics(&metrics, &context.config.report.currency_prefix);
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_metrics(metrics: &MaterialMetrics, currency_prefix: &str) {
    use bahan_baku_api::reports::format_money;

    println!(
        "Total inventory value : {}",
        format_money(currency_prefix, metrics.total_value)
    );
    println!("Total stock           : {}", metrics.total_stock);
    println!("Total rejected        : {}", metrics.total_rejected);
    println!(
        "Quality pass rate     : {}% ({} of {} inspections)",
        metrics.pass_rate, metrics.fit_count, metrics.inspection_count
    );
    println!(
        "Transactions          : {} approved ({}), {} rejected, {} pending",
        metrics.transactions.approved_count,
        format_money(currency_prefix, metrics.transactions.approved_amount),
        metrics.transactions.rejected_count,
        metrics.transactions.pending_count
    );
}
