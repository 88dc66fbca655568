use clap::Parser;
use gauges_export::{
    Client, ConfigFile, GaugesError, MonthExporter, Overrides, RunSummary, Settings, list_sites,
};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "gauges-export",
    about = "Export daily Gauges traffic into monthly CSV files",
    version
)]
struct Cli {
    /// Session cookie value copied from the browser
    #[arg(long, env = "COOKIE", hide_env_values = true)]
    cookie: Option<String>,

    /// CSRF token copied from the browser
    #[arg(long, env = "CSRF_TOKEN", hide_env_values = true)]
    csrf_token: Option<String>,

    /// Plain-text config file with one `name value` setting per line
    #[arg(long, env = "CONFIG")]
    config: Option<PathBuf>,

    /// Root directory for the exported CSV files [default: output]
    #[arg(long, env = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Gauges base URL [default: https://secure.gaug.es]
    #[arg(long, env = "GAUGES_BASE_URL")]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(summary) => {
            info!(
                "Finished: {} of {} sites exported, {} failed, {} files written",
                summary.exported, summary.sites, summary.failed, summary.files_written
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Export aborted: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<RunSummary, GaugesError> {
    let file = cli.config.as_deref().map(ConfigFile::load).transpose()?;
    let settings = Settings::resolve(
        Overrides {
            cookie: cli.cookie,
            csrf_token: cli.csrf_token,
            output_dir: cli.output_dir,
            base_url: cli.base_url,
        },
        file,
    )?;

    let client = Client::new(&settings.credentials)?.with_base_url(settings.base_url);
    let sites = list_sites(&client, &client.profile_url()).await?;
    let exporter = MonthExporter::new(&client, settings.output_dir);
    Ok(exporter.export_all(&sites).await)
}
