use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use gnucash_manifest::{BindingManifest, ManifestError, SourceLayout};
use serde::Deserialize;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "gnucash-tool", about = "Inspect GnuCash engine bindings and books")]
pub struct CliArgs {
    /// Path to config file
    #[arg(short, long, default_value = "gnucash.toml")]
    pub config: String,

    /// Log level (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// GnuCash source checkout (overrides config file)
    #[arg(long)]
    pub src: Option<PathBuf>,

    /// GnuCash build directory (overrides config file)
    #[arg(long)]
    pub build: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the header handed to bindgen
    Wrapper,
    /// Print the binding manifest
    Manifest {
        #[arg(long)]
        json: bool,
    },
    /// Report where each manifest header is found
    Check,
    /// Print a book's account tree
    #[cfg(feature = "engine")]
    Tree { file: String },
    /// Print a book's balance sheet
    #[cfg(feature = "engine")]
    BalanceSheet { file: String },
    /// Export one account's splits as CSV
    #[cfg(feature = "engine")]
    Export {
        file: String,
        /// Colon-separated account path, e.g. Assets:Checking
        account: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Search transactions by description, memo or account name
    #[cfg(feature = "engine")]
    Search {
        file: String,
        term: Option<String>,
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
    /// Show an account's cleared and unreconciled splits
    #[cfg(feature = "engine")]
    Reconcile { file: String, account: String },
    /// Show an account's debits, credits and running balance
    #[cfg(feature = "engine")]
    Analyze { file: String, account: String },
    /// List the price database
    #[cfg(feature = "engine")]
    Prices {
        file: String,
        /// Only quotes for this commodity mnemonic
        #[arg(short, long)]
        commodity: Option<String>,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub gnucash: GnucashConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub bindings: BindingsConfig,
}

/// Unset paths fall back to the `GNUCASH_*` environment variables, then to
/// a checkout next to this one.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct GnucashConfig {
    #[serde(default)]
    pub src_dir: Option<PathBuf>,

    #[serde(default)]
    pub build_dir: Option<PathBuf>,

    #[serde(default)]
    pub lib_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct BindingsConfig {
    /// TOML binding manifest; the built-in one when unset.
    #[serde(default)]
    pub manifest: Option<PathBuf>,
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        json: false,
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        default_logging()
    }
}

impl Config {
    /// Reads the config file named on the command line and applies CLI
    /// overrides. A missing file yields the defaults.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::from_path(&cli.config)?;

        // CLI overrides
        if let Some(ref level) = cli.log_level {
            config.logging.level = level.clone();
        }
        if let Some(ref src) = cli.src {
            config.gnucash.src_dir = Some(src.clone());
        }
        if let Some(ref build) = cli.build {
            config.gnucash.build_dir = Some(build.clone());
        }

        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: display,
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(source) => Err(ConfigError::Io {
                path: display,
                source,
            }),
        }
    }

    pub fn layout(&self) -> SourceLayout {
        SourceLayout::resolve(
            self.gnucash.src_dir.clone(),
            self.gnucash.build_dir.clone(),
            self.gnucash.lib_dir.clone(),
        )
    }

    pub fn manifest(&self) -> Result<BindingManifest, ConfigError> {
        let manifest = match &self.bindings.manifest {
            Some(path) => BindingManifest::from_path(path)?,
            None => BindingManifest::default(),
        };
        manifest.validate()?;
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn cli(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("gnucash-tool").chain(args.iter().copied()))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = Config::from_path(&path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_parse_file_and_cli_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[gnucash]
src_dir = "/opt/gnucash"
lib_dir = "/opt/gnucash/lib"

[logging]
level = "debug"
json = true
"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let config = Config::load(&cli(&["--config", path, "check"])).unwrap();
        assert_eq!(config.gnucash.src_dir, Some(PathBuf::from("/opt/gnucash")));
        assert_eq!(config.gnucash.build_dir, None);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);

        let config = Config::load(&cli(&[
            "--config", path, "--log-level", "warn", "--build", "/tmp/build", "wrapper",
        ]))
        .unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.gnucash.build_dir, Some(PathBuf::from("/tmp/build")));

        let layout = config.layout();
        assert_eq!(layout.src_dir, PathBuf::from("/opt/gnucash"));
        assert_eq!(layout.lib_dir(), PathBuf::from("/opt/gnucash/lib"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[logging\nlevel = ").unwrap();
        let err = Config::from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_manifest_from_config() {
        let config = Config::default();
        assert_eq!(config.manifest().unwrap(), BindingManifest::default());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "headers = []").unwrap();
        let config = Config {
            bindings: BindingsConfig {
                manifest: Some(file.path().to_path_buf()),
            },
            ..Config::default()
        };
        assert!(matches!(
            config.manifest(),
            Err(ConfigError::Manifest(ManifestError::NoHeaders))
        ));
    }

    #[test]
    fn test_subcommands() {
        assert_eq!(cli(&["manifest", "--json"]).command, Command::Manifest { json: true });
        assert_eq!(cli(&["wrapper"]).config, "gnucash.toml");
    }

    #[cfg(feature = "engine")]
    #[test]
    fn test_report_subcommands() {
        assert_eq!(
            cli(&["reconcile", "book.gnucash", "Assets:Checking"]).command,
            Command::Reconcile {
                file: "book.gnucash".to_string(),
                account: "Assets:Checking".to_string(),
            }
        );
        assert_eq!(
            cli(&["prices", "book.gnucash", "-c", "EUR"]).command,
            Command::Prices {
                file: "book.gnucash".to_string(),
                commodity: Some("EUR".to_string()),
            }
        );
        assert!(matches!(
            cli(&["analyze", "book.gnucash", "Expenses"]).command,
            Command::Analyze { .. }
        ));
    }
}
