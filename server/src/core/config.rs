use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_ORGANIZATION, DEFAULT_PER_PAGE,
    DEFAULT_PORT, PER_PAGE_CHOICES,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Authentication configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuthFileConfig {
    pub enabled: Option<bool>,
}

/// Report export configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ReportsFileConfig {
    pub template_path: Option<String>,
    pub organization: Option<String>,
    pub default_per_page: Option<u32>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub auth: Option<AuthFileConfig>,
    pub reports: Option<ReportsFileConfig>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(auth) = other.auth {
            let current = self.auth.get_or_insert_with(AuthFileConfig::default);
            if auth.enabled.is_some() {
                tracing::trace!(enabled = ?auth.enabled, "Merging auth.enabled");
                current.enabled = auth.enabled;
            }
        }

        if let Some(reports) = other.reports {
            let current = self.reports.get_or_insert_with(ReportsFileConfig::default);
            if reports.template_path.is_some() {
                tracing::trace!(template_path = ?reports.template_path, "Merging reports.template_path");
                current.template_path = reports.template_path;
            }
            if reports.organization.is_some() {
                current.organization = reports.organization;
            }
            if reports.default_per_page.is_some() {
                current.default_per_page = reports.default_per_page;
            }
        }

        if other.debug.is_some() {
            self.debug = other.debug;
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub enabled: bool,
}

/// Report export configuration
#[derive(Debug, Clone)]
pub struct ReportsConfig {
    /// Explicit Word template path. `None` means `templates/report_template.docx`
    /// inside the data directory.
    pub template_path: Option<PathBuf>,
    pub organization: String,
    pub default_per_page: u32,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            template_path: None,
            organization: DEFAULT_ORGANIZATION.to_string(),
            default_per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub reports: ReportsConfig,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.weims/weims.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::layer(file_config, cli);
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            auth_enabled = config.auth.enabled,
            debug = config.debug,
            template_path = ?config.reports.template_path,
            organization = %config.reports.organization,
            default_per_page = config.reports.default_per_page,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Layer merged file values under CLI/env overrides
    fn layer(file_config: FileConfig, cli: &CliConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_auth = file_config.auth.unwrap_or_default();
        let file_reports = file_config.reports.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        // --no-auth always wins over the file setting
        let auth_enabled = if cli.no_auth {
            false
        } else {
            file_auth.enabled.unwrap_or(true)
        };

        let template_path = cli
            .template
            .as_ref()
            .map(|p| expand_path(&p.to_string_lossy()))
            .or_else(|| file_reports.template_path.as_deref().map(expand_path));

        let organization = cli
            .organization
            .clone()
            .or(file_reports.organization)
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .unwrap_or_else(|| DEFAULT_ORGANIZATION.to_string());

        Self {
            server: ServerConfig { host, port },
            auth: AuthConfig {
                enabled: auth_enabled,
            },
            reports: ReportsConfig {
                template_path,
                organization,
                default_per_page: file_reports.default_per_page.unwrap_or(DEFAULT_PER_PAGE),
            },
            debug: cli.debug || file_config.debug.unwrap_or(false),
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port 0 would bind a random port
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if !PER_PAGE_CHOICES.contains(&self.reports.default_per_page) {
            anyhow::bail!(
                "Configuration error: reports.default_per_page must be one of {:?}",
                PER_PAGE_CHOICES
            );
        }

        if !self.auth.enabled && is_all_interfaces(&self.server.host) {
            tracing::warn!(
                host = %self.server.host,
                "Authentication is disabled while binding to all network interfaces. \
                 Every client is treated as a superadmin."
            );
        }

        Ok(())
    }
}

/// Get the profile config path (~/.weims/weims.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub(crate) fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "auth": { "enabled": false },
            "reports": {
                "template_path": "/srv/weims/template.docx",
                "organization": "DOST",
                "default_per_page": 50
            },
            "debug": true
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.server.as_ref().unwrap().host,
            Some("0.0.0.0".to_string())
        );
        assert_eq!(config.server.as_ref().unwrap().port, Some(8080));
        assert_eq!(config.auth.as_ref().unwrap().enabled, Some(false));
        let reports = config.reports.as_ref().unwrap();
        assert_eq!(reports.organization.as_deref(), Some("DOST"));
        assert_eq!(reports.default_per_page, Some(50));
        assert_eq!(config.debug, Some(true));
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.reports.is_none());
        assert!(config.debug.is_none());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "port": 9000 }, "sever": { "port": 1 } }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        let extra = config.extra.as_object().unwrap();
        assert!(extra.contains_key("sever"));
        assert_eq!(config.server.unwrap().port, Some(9000));
    }

    #[test]
    fn test_file_config_merge() {
        let mut base = FileConfig {
            server: Some(ServerFileConfig {
                host: Some("base.host".to_string()),
                port: Some(1000),
            }),
            auth: Some(AuthFileConfig {
                enabled: Some(true),
            }),
            reports: Some(ReportsFileConfig {
                template_path: Some("/base/template.docx".to_string()),
                organization: Some("BASE".to_string()),
                default_per_page: None,
            }),
            debug: Some(false),
            extra: serde_json::Value::Null,
        };

        let overlay = FileConfig {
            server: Some(ServerFileConfig {
                host: None,
                port: Some(2000),
            }),
            auth: Some(AuthFileConfig {
                enabled: Some(false),
            }),
            reports: Some(ReportsFileConfig {
                template_path: None,
                organization: Some("OVERLAY".to_string()),
                default_per_page: Some(100),
            }),
            debug: Some(true),
            extra: serde_json::Value::Null,
        };

        base.merge(overlay);

        assert_eq!(
            base.server.as_ref().unwrap().host,
            Some("base.host".to_string())
        );
        assert_eq!(base.server.as_ref().unwrap().port, Some(2000));
        assert_eq!(base.auth.as_ref().unwrap().enabled, Some(false));
        let reports = base.reports.as_ref().unwrap();
        assert_eq!(
            reports.template_path.as_deref(),
            Some("/base/template.docx")
        );
        assert_eq!(reports.organization.as_deref(), Some("OVERLAY"));
        assert_eq!(reports.default_per_page, Some(100));
        assert_eq!(base.debug, Some(true));
    }

    #[test]
    fn test_layer_defaults() {
        let config = AppConfig::layer(FileConfig::default(), &CliConfig::default());

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.auth.enabled);
        assert!(!config.debug);
        assert!(config.reports.template_path.is_none());
        assert_eq!(config.reports.organization, DEFAULT_ORGANIZATION);
        assert_eq!(config.reports.default_per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_layer_cli_override() {
        let file = FileConfig {
            server: Some(ServerFileConfig {
                host: Some("file.host".to_string()),
                port: Some(1000),
            }),
            auth: Some(AuthFileConfig {
                enabled: Some(true),
            }),
            reports: Some(ReportsFileConfig {
                template_path: Some("/file/template.docx".to_string()),
                organization: Some("FILE".to_string()),
                default_per_page: Some(10),
            }),
            debug: None,
            extra: serde_json::Value::Null,
        };
        let cli = CliConfig {
            host: Some("cli.host".to_string()),
            port: Some(3000),
            no_auth: true,
            debug: true,
            config: None,
            template: Some(PathBuf::from("/cli/template.docx")),
            organization: Some("  ".to_string()),
        };

        let config = AppConfig::layer(file, &cli);
        assert_eq!(config.server.host, "cli.host");
        assert_eq!(config.server.port, 3000);
        assert!(!config.auth.enabled);
        assert!(config.debug);
        assert_eq!(
            config.reports.template_path,
            Some(PathBuf::from("/cli/template.docx"))
        );
        // Blank organization falls back to the default
        assert_eq!(config.reports.organization, DEFAULT_ORGANIZATION);
        assert_eq!(config.reports.default_per_page, 10);
    }

    #[test]
    fn test_app_config_validation_server_port_zero() {
        let cli = CliConfig {
            port: Some(0),
            ..Default::default()
        };
        let config = AppConfig::layer(FileConfig::default(), &cli);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.port must be greater than 0"));
    }

    #[test]
    fn test_app_config_validation_empty_host() {
        let cli = CliConfig {
            host: Some(String::new()),
            ..Default::default()
        };
        let config = AppConfig::layer(FileConfig::default(), &cli);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.host must not be empty"));
    }

    #[test]
    fn test_app_config_validation_per_page() {
        let file = FileConfig {
            reports: Some(ReportsFileConfig {
                default_per_page: Some(30),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = AppConfig::layer(file, &CliConfig::default());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_per_page"));
    }

    #[test]
    fn test_app_config_load_from_cli_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{ "server": { "port": 7001 } }"#).unwrap();

        let cli = CliConfig {
            config: Some(path),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.port, 7001);
    }

    #[test]
    fn test_app_config_load_missing_cli_path() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/definitely/not/here/weims.json")),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(is_all_interfaces("[::]"));

        assert!(!is_all_interfaces("127.0.0.1"));
        assert!(!is_all_interfaces("localhost"));
        assert!(!is_all_interfaces("::1"));
    }
}
