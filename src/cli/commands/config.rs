//! Configuration command implementations

use anyhow::{Context, Result};

use crate::cli::Output;
use crate::config::ParapatConfig;
use crate::parallel::ExecutionContext;

/// Print the merged configuration as TOML and check it builds a context.
pub fn show(custom_config: Option<&str>, output: &Output) -> Result<()> {
    output.header("Configuration");

    let config = ParapatConfig::load_with_custom_config(custom_config)?;
    let full = config.get_full_config()?;
    let rendered = toml::to_string_pretty(&full).context("failed to render configuration")?;
    output.result(rendered.trim_end());

    let execution = config.execution()?;
    ExecutionContext::from_config(&execution).context("configuration is not usable")?;
    output.key_value("backend", &execution.backend.to_string(), true);
    output.key_value("concurrency degree", &execution.concurrency_degree.to_string(), false);
    output.success("configuration is valid");
    Ok(())
}
