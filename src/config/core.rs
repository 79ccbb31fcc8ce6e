use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Json, Toml, Yaml},
};
use std::path::Path;

use super::ExecutionConfig;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

pub struct ParapatConfig {
    figment: Figment,
}

impl ParapatConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_custom_config(None)
    }

    pub fn load_with_custom_config(custom_config: Option<&str>) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG)); // Embedded defaults

        // A custom config replaces the user and project files
        if let Some(custom_path) = custom_config {
            tracing::debug!("Loading custom config from {}", custom_path);
            figment = match Path::new(custom_path).extension().and_then(|e| e.to_str()) {
                Some("json") => figment.merge(Json::file(custom_path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(custom_path)),
                _ => figment.merge(Toml::file(custom_path)),
            };
        } else {
            let user_config = Self::user_config_path();
            figment = figment
                // User config - support multiple formats
                .merge(Toml::file(&user_config))
                .merge(Json::file(user_config.replace(".toml", ".json")))
                .merge(Yaml::file(user_config.replace(".toml", ".yaml")))
                .merge(Yaml::file(user_config.replace(".toml", ".yml")))
                // Project config - support multiple formats
                .merge(Toml::file("parapat.toml"))
                .merge(Json::file("parapat.json"))
                .merge(Yaml::file("parapat.yaml"))
                .merge(Yaml::file("parapat.yml"));
        }

        // Environment variables always have highest priority
        figment = figment.merge(Env::prefixed("PARAPAT_").split("__"));

        Ok(ParapatConfig { figment })
    }

    /// Typed `[execution]` section
    pub fn execution(&self) -> Result<ExecutionConfig> {
        self.figment
            .extract_inner("execution")
            .context("invalid [execution] configuration")
    }

    /// Get the full merged configuration as a structured value
    pub fn get_full_config(&self) -> Result<serde_json::Value> {
        Ok(self.figment.extract()?)
    }

    fn user_config_path() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{}/.config/parapat/config.toml", home),
            Err(_) => "~/.config/parapat/config.toml".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::{BackendKind, QueueMode};
    use figment::Jail;

    #[test]
    fn test_config_loads_defaults() {
        Jail::expect_with(|jail| {
            let home = jail.directory().display().to_string();
            jail.set_env("HOME", home);
            let config = ParapatConfig::load().expect("Should load default config");
            assert_eq!(config.execution().unwrap(), ExecutionConfig::default());
            assert!(config.get_full_config().is_ok());
            Ok(())
        });
    }

    #[test]
    fn test_project_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            let home = jail.directory().display().to_string();
            jail.set_env("HOME", home);
            jail.create_file(
                "parapat.toml",
                r#"
                [execution]
                concurrency_degree = 2
                backend = "task_group"
                "#,
            )?;

            let execution = ParapatConfig::load().unwrap().execution().unwrap();
            assert_eq!(execution.concurrency_degree, 2);
            assert_eq!(execution.backend, BackendKind::TaskGroup);
            assert_eq!(execution.queue_size, 100);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_files() {
        Jail::expect_with(|jail| {
            let home = jail.directory().display().to_string();
            jail.set_env("HOME", home);
            jail.create_file("parapat.yaml", "execution:\n  queue_size: 16\n")?;
            jail.set_env("PARAPAT_EXECUTION__QUEUE_SIZE", "32");
            jail.set_env("PARAPAT_EXECUTION__QUEUE_MODE", "lock_free");

            let execution = ParapatConfig::load().unwrap().execution().unwrap();
            assert_eq!(execution.queue_size, 32);
            assert_eq!(execution.queue_mode, QueueMode::LockFree);
            Ok(())
        });
    }

    #[test]
    fn test_custom_config_loading() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.json", r#"{ "execution": { "ordering": false } }"#)?;
            let config = ParapatConfig::load_with_custom_config(Some("custom.json")).unwrap();
            assert!(!config.execution().unwrap().ordering);

            // Missing custom config falls back to defaults
            let config = ParapatConfig::load_with_custom_config(Some("non_existent.toml"));
            assert!(config.is_ok(), "Should handle missing custom config gracefully");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_are_reported() {
        Jail::expect_with(|jail| {
            jail.create_file("bad.toml", "[execution]\nbackend = \"gpu\"\n")?;
            let config = ParapatConfig::load_with_custom_config(Some("bad.toml")).unwrap();
            assert!(config.execution().is_err());
            Ok(())
        });
    }
}
