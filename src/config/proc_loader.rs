use std::path::Path;

use regex::Regex;
use tracing::{debug, error};

use crate::config::proc_validator;
use crate::config::run::RunConfig;
use crate::config::settings::LoggingConfig;
use crate::error::{Gen3Error, Result};

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<RunConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Gen3Error::Config(format!("cannot read '{}': {}", path.display(), e)))?;

    let expanded = expand_env_vars(&content)?;
    parse_config(&expanded)
}

pub fn parse_config(content: &str) -> Result<RunConfig> {
    let mut run_config: RunConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))
        .map_err(|e| Gen3Error::Config(e.to_string()))?;

    // Apply defaults
    if run_config.settings.logging.is_none() {
        run_config.settings.logging = Some(LoggingConfig::default());
    }

    debug!("validating config ...");
    proc_validator::validate_run_config(&run_config)
        .map_err(|issues| Gen3Error::Config(issues.join("; ")))?;

    Ok(run_config)
}

/// `${VAR}` / `${VAR:default}` substitution from the process environment
pub fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").map_err(|e| Gen3Error::Config(e.to_string()))?;
    let expanded = re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    });
    Ok(expanded.into_owned())
}
