use clap::{ArgGroup, Parser, builder::styling};
use eyre::{Context, Result};
use field_history_extractor::{cli, storage::RunStamp};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Field History Extractor: pulls Salesforce field history into per-run CSV files
#[derive(Parser)]
#[command(name = "fhx", version, styles = STYLES)]
#[command(group(ArgGroup::new("mode").required(true).args(["tenant", "list"])))]
struct Cli {
    /// Tenant key in the credential file
    tenant: Option<String>,

    /// List the tenants that have stored credentials
    #[arg(short, long)]
    list: bool,

    /// JSON credential file, keyed by tenant
    #[arg(short, long, default_value = ".env")]
    credentials: PathBuf,

    /// Root directory for extraction files
    #[arg(short, long, default_value = "data")]
    output_dir: PathBuf,

    /// Debug logging, written to a file in --log-dir
    #[arg(short, long)]
    debug: bool,

    /// Directory for debug log files
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn init_logging(debug: bool, log_dir: &Path, stamp: RunStamp) -> Result<()> {
    let log_level = match debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    let mut builder = env_logger::Builder::from_env(env);
    builder.format_timestamp_millis();

    if debug {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
        let path = log_dir.join(format!("{}.log", stamp.label()));
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        eprintln!("Debug logs will be stored at {}", path.display().bright_black());
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let stamp = RunStamp::now();
    init_logging(args.debug, &args.log_dir, stamp)?;

    if args.list {
        let tenants = cli::list_tenants(&args.credentials)?;
        if tenants.is_empty() {
            log::info!(
                "No tenants stored. Add credentials to {}",
                args.credentials.display().bright_black()
            );
        } else {
            log::info!("The following tenants have credentials stored:");
            for tenant in &tenants {
                log::info!("    - {}", tenant.cyan());
            }
            log::info!("Run an extraction with: fhx <tenant>");
        }
        return Ok(());
    }

    let Some(tenant) = args.tenant.as_deref() else {
        eyre::bail!("A tenant key or --list is required");
    };

    let summary = cli::extract(&args.credentials, tenant, &args.output_dir, stamp).await?;
    cli::report(&summary);

    let failed = summary.failed().count();
    if failed > 0 {
        eyre::bail!("{} of {} entities failed to extract", failed, summary.entities.len());
    }
    Ok(())
}
