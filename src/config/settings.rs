use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Menu-driven Linux host administration toolkit")]
pub struct Config {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable the administrative action audit log
    #[arg(long)]
    pub audit: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate a disk usage report without entering the menu UI
    Report {
        /// Directory to scan
        #[arg(default_value = ".")]
        target_dir: String,

        /// Depth limit for the scan (0 = unlimited)
        #[arg(short = 'd', long)]
        max_depth: Option<u32>,

        /// Size unit: K, M or G
        #[arg(short, long)]
        unit: Option<String>,

        /// Output format: text, csv, html or json
        #[arg(short, long)]
        format: Option<String>,

        /// Sort key: name, size_asc, size_desc or mtime
        #[arg(short, long)]
        sort: Option<String>,

        /// Minimum entry size to include, in the chosen unit
        #[arg(short = 't', long)]
        size_threshold: Option<u64>,

        /// Only count files modified within the last N days
        #[arg(short, long)]
        modified_within_days: Option<u32>,
    },
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Application settings (from config file)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Report defaults
    #[serde(default)]
    pub report: ReportSettings,

    /// Account management settings
    #[serde(default)]
    pub accounts: AccountSettings,

    /// System information settings
    #[serde(default)]
    pub sysinfo: SysinfoSettings,

    /// Audit log settings
    #[serde(default)]
    pub audit: AuditSettings,

    /// UI settings
    #[serde(default)]
    pub ui: UiSettings,
}

/// Defaults for report generation, used when a form field is left empty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Default size unit
    #[serde(default = "default_unit")]
    pub unit: String,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,

    /// Default sort key
    #[serde(default = "default_sort")]
    pub sort: String,

    /// Default depth limit (0 = unlimited)
    #[serde(default)]
    pub max_depth: u32,

    /// Default minimum entry size
    #[serde(default)]
    pub size_threshold: u64,

    /// Directories to exclude beyond the built-in pseudo-filesystem set
    #[serde(default)]
    pub additional_excludes: Vec<String>,
}

fn default_unit() -> String {
    "M".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_sort() -> String {
    "name".to_string()
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            unit: default_unit(),
            format: default_format(),
            sort: default_sort(),
            max_depth: 0,
            size_threshold: 0,
            additional_excludes: Vec::new(),
        }
    }
}

/// Account management settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSettings {
    /// Directory that receives home archives before deletion
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,

    /// Pre-select the archive option in the delete form
    #[serde(default = "default_archive_by_default")]
    pub archive_by_default: bool,
}

fn default_archive_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("hostadm/archives"))
        .unwrap_or_else(|| PathBuf::from("/var/tmp/hostadm-archives"))
}

fn default_archive_by_default() -> bool {
    true
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            archive_dir: default_archive_dir(),
            archive_by_default: default_archive_by_default(),
        }
    }
}

/// System information settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SysinfoSettings {
    /// Default disk usage threshold percentage
    #[serde(default = "default_usage_threshold")]
    pub usage_threshold_pct: u8,
}

fn default_usage_threshold() -> u8 {
    80
}

impl Default for SysinfoSettings {
    fn default() -> Self {
        Self {
            usage_threshold_pct: default_usage_threshold(),
        }
    }
}

/// Audit log settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Enable audit logging
    #[serde(default)]
    pub enabled: bool,

    /// Maximum log file size in bytes before rotation
    #[serde(default = "default_audit_max_size")]
    pub max_size_bytes: u64,
}

/// Default audit max size (10MB)
fn default_audit_max_size() -> u64 {
    10_485_760
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            max_size_bytes: default_audit_max_size(),
        }
    }
}

/// UI-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Lines scrolled per Ctrl-d / Ctrl-u in the viewer
    #[serde(default = "default_scroll_step")]
    pub scroll_step: u16,
}

fn default_scroll_step() -> u16 {
    10
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            scroll_step: default_scroll_step(),
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config file: {:?}", p))?;
                return toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {:?}", p));
            }
        }

        // Try default config locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("hostadm/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/hostadm/config.toml")),
            dirs::home_dir().map(|p| p.join(".hostadm.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                return toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {:?}", path));
            }
        }

        // Return defaults if no config file found
        Ok(Self::default())
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if cli.audit {
            self.audit.enabled = true;
        }
    }

    /// Validate and normalize settings values
    pub fn validate(&mut self) {
        const MAX_DEPTH: u32 = 64;

        if self.report.max_depth > MAX_DEPTH {
            self.report.max_depth = MAX_DEPTH;
        }
        if self.sysinfo.usage_threshold_pct > 100 {
            self.sysinfo.usage_threshold_pct = 100;
        }
        if self.ui.scroll_step == 0 {
            self.ui.scroll_step = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.report.unit, "M");
        assert_eq!(settings.report.format, "text");
        assert_eq!(settings.report.sort, "name");
        assert_eq!(settings.sysinfo.usage_threshold_pct, 80);
        assert!(!settings.audit.enabled);
        assert!(settings.accounts.archive_by_default);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [report]
            unit = "G"
            max_depth = 2
            additional_excludes = ["/mnt/nfs"]

            [sysinfo]
            usage_threshold_pct = 90

            [audit]
            enabled = true
        "#;

        let settings: Settings = toml::from_str(toml).expect("Should parse TOML");
        assert_eq!(settings.report.unit, "G");
        assert_eq!(settings.report.max_depth, 2);
        assert_eq!(settings.report.additional_excludes, vec!["/mnt/nfs"]);
        assert_eq!(settings.sysinfo.usage_threshold_pct, 90);
        assert!(settings.audit.enabled);
        // Untouched sections keep their defaults
        assert_eq!(settings.ui.scroll_step, 10);
    }

    #[test]
    fn test_merge_cli_audit_flag() {
        let mut settings = Settings::default();
        let cli = Config {
            debug: false,
            config: None,
            audit: true,
            command: None,
        };
        settings.merge_cli(&cli);
        assert!(settings.audit.enabled);
    }

    #[test]
    fn test_validate_clamps() {
        let mut settings = Settings::default();
        settings.report.max_depth = 1000;
        settings.sysinfo.usage_threshold_pct = 150;
        settings.ui.scroll_step = 0;
        settings.validate();
        assert_eq!(settings.report.max_depth, 64);
        assert_eq!(settings.sysinfo.usage_threshold_pct, 100);
        assert_eq!(settings.ui.scroll_step, 1);
    }
}
