//! Run configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - names must be non-empty and must not contain '/' (they become path segments and store keys)
//! - every target needs at least one node
//! - http timeout must be positive, logging level must be known

use std::collections::HashSet;

use tracing::{error, info};

use crate::config::run::{RunConfig, TargetConfig};
use crate::config::settings::SettingsConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_run_config(cfg: &RunConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);

    if cfg.targets.is_empty() {
        errors.push("config: 'targets' is empty; at least one target required".to_string());
    }

    let mut seen = HashSet::new();
    for (idx, target) in cfg.targets.iter().enumerate() {
        validate_target(idx, target, &mut errors);
        for node in &target.nodes {
            let key = format!("{}/{}/{}", target.program, target.project, node);
            if !seen.insert(key.clone()) {
                errors.push(format!("targets[{}]: '{}' is requested more than once", idx, key));
            }
        }
    }

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        for e in &errors {
            error!("{}", e);
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.http.timeout_ms == 0 {
        errors.push("settings.http.timeout_ms must be > 0".to_string());
    }
    check_segment("settings.api_version", &settings.api_version, errors);
    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' is not one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn validate_target(idx: usize, target: &TargetConfig, errors: &mut Vec<String>) {
    check_segment(&format!("targets[{}].program", idx), &target.program, errors);
    check_segment(&format!("targets[{}].project", idx), &target.project, errors);
    if let Some(version) = &target.api_version {
        check_segment(&format!("targets[{}].api_version", idx), version, errors);
    }
    if target.nodes.is_empty() {
        errors.push(format!("targets[{}].nodes is empty", idx));
    }
    for (n, node) in target.nodes.iter().enumerate() {
        check_segment(&format!("targets[{}].nodes[{}]", idx, n), node, errors);
    }
}

fn check_segment(field: &str, value: &str, errors: &mut Vec<String>) {
    if value.trim().is_empty() {
        errors.push(format!("{} must not be empty", field));
    } else if value.contains('/') {
        errors.push(format!("{} '{}' must not contain '/'", field, value));
    }
}
