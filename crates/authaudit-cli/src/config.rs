use serde::Deserialize;
use std::path::Path;

use authaudit_core::AuditPolicy;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub policy: PolicyConfig,
    pub output: OutputConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub flag_silent_interface_agreement: bool,
    pub fail_on_renamed_markers: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let policy = AuditPolicy::default();
        Self {
            flag_silent_interface_agreement: policy.flag_silent_interface_agreement,
            fail_on_renamed_markers: policy.fail_on_renamed_markers,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e.to_string()))?;
            toml::from_str::<AppConfig>(&contents)
                .map_err(|e| ConfigError::ParseToml(e.to_string()))?
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("AUTHAUDIT_LOG_LEVEL") {
            self.log.level = v;
        }
        if let Ok(v) = std::env::var("AUTHAUDIT_LOG_FORMAT") {
            match v.as_str() {
                "json" => self.log.format = LogFormat::Json,
                "pretty" => self.log.format = LogFormat::Pretty,
                _ => {}
            }
        }
        if let Ok(v) = std::env::var("AUTHAUDIT_OUTPUT_FORMAT") {
            match v.as_str() {
                "json" => self.output.format = OutputFormat::Json,
                "text" => self.output.format = OutputFormat::Text,
                _ => {}
            }
        }
        if let Ok(v) = std::env::var("AUTHAUDIT_FAIL_ON_RENAMED_MARKERS")
            && let Ok(flag) = v.parse()
        {
            self.policy.fail_on_renamed_markers = flag;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.log.level.trim().is_empty() {
            return Err(ConfigError::Validation(
                "log.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_audit_policy(&self) -> AuditPolicy {
        AuditPolicy {
            flag_silent_interface_agreement: self.policy.flag_silent_interface_agreement,
            fail_on_renamed_markers: self.policy.fail_on_renamed_markers,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{0}': {1}")]
    ReadFile(String, String),

    #[error("failed to parse TOML config: {0}")]
    ParseToml(String),

    #[error("config validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_has_sensible_values() {
        let config = AppConfig::default();

        assert!(config.policy.flag_silent_interface_agreement);
        assert!(!config.policy.fail_on_renamed_markers);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.log.format, LogFormat::Pretty);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authaudit.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[policy]
flag_silent_interface_agreement = false

[output]
format = "json"

[log]
format = "json"
level = "debug"
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();

        assert!(!config.policy.flag_silent_interface_agreement);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn env_vars_override_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authaudit.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[policy]
fail_on_renamed_markers = false
"#
        )
        .unwrap();

        // SAFETY: test runs single-threaded for this env var
        unsafe { std::env::set_var("AUTHAUDIT_FAIL_ON_RENAMED_MARKERS", "true") };
        let config = AppConfig::load(Some(&path)).unwrap();
        unsafe { std::env::remove_var("AUTHAUDIT_FAIL_ON_RENAMED_MARKERS") };

        assert!(config.policy.fail_on_renamed_markers);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authaudit.toml");
        std::fs::write(&path, "[policy\nflag = ").unwrap();

        let result = AppConfig::load(Some(&path));
        assert!(matches!(result, Err(ConfigError::ParseToml(_))));
    }

    #[test]
    fn validation_rejects_empty_log_level() {
        let mut config = AppConfig::default();
        config.log.level = "  ".to_string();

        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation(ref msg)) if msg.contains("log.level")
        ));
    }

    #[test]
    fn policy_maps_onto_audit_policy() {
        let mut config = AppConfig::default();
        config.policy.fail_on_renamed_markers = true;

        let policy = config.to_audit_policy();
        assert!(policy.fail_on_renamed_markers);
        assert!(policy.flag_silent_interface_agreement);
    }
}
