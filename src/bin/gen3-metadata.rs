use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use gen3_metadata::table::writer;
use gen3_metadata::utils::config_loader;
use gen3_metadata::utils::constants::DEFAULT_CONFIG_PATH;
use gen3_metadata::utils::logging::{self, LogLevel};
use gen3_metadata::Gen3Session;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    /// overrides settings.credentials_path
    #[arg(long, env = "GEN3_CREDENTIALS")]
    credentials: Option<PathBuf>,
    /// overrides settings.output_dir
    #[arg(short, long, env = "OUTPUT_DIR")]
    output: Option<PathBuf>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let run_config = config_loader::run(&args.config).await?;
    logging::run(&run_config.settings, args.log_level);

    let credentials_path = args
        .credentials
        .or_else(|| run_config.settings.credentials_path.clone())
        .ok_or_else(|| anyhow!("no credentials file: pass --credentials or set settings.credentials_path"))?;
    let output_dir = args.output.or_else(|| run_config.settings.output_dir.clone());

    // -------------------------------
    // 2. Authenticate
    // -------------------------------

    let mut session = Gen3Session::with_settings(&credentials_path, &run_config.settings)?;
    session
        .authenticate()
        .await
        .inspect_err(|e| error!(error = %e, "authentication failed"))?;
    info!(base_url = session.base_url().unwrap_or_default(), "authenticated");

    // -------------------------------
    // 3. Fetch every configured node
    // -------------------------------

    let mut failures = 0usize;
    for target in &run_config.targets {
        let api_version = target
            .api_version
            .clone()
            .unwrap_or_else(|| run_config.settings.api_version.clone());
        for node in &target.nodes {
            if let Err(e) = session
                .fetch_with_version(&target.program, &target.project, node, &api_version)
                .await
            {
                error!(error = %e, "fetch failed");
                failures += 1;
            }
        }
    }

    // -------------------------------
    // 4. Flatten into tables
    // -------------------------------

    let report = session.flatten_all();
    for (key, e) in &report.failed {
        warn!(key = %key, error = %e, "table not built");
    }
    for (key, table) in session.table_store().iter() {
        info!(key = %key, rows = table.height(), columns = table.width(), "table ready");
    }

    // -------------------------------
    // 5. Write output
    // -------------------------------

    if let Some(dir) = output_dir {
        writer::write_raw(&dir, session.raw_store()).context("writing raw exports")?;
        writer::write_tables(&dir, session.table_store()).context("writing tables")?;
    }

    if failures > 0 || !report.is_complete() {
        return Err(anyhow!(
            "{} fetch(es) and {} table conversion(s) failed",
            failures,
            report.failed.len()
        ));
    }
    info!("done");
    Ok(())
}
