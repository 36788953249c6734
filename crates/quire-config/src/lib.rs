//! Configuration management for Quire.
//!
//! Parses `quire.toml` with serde and discovers it in the current directory
//! or its parents. Relative paths (`root`, `[alias]` targets) are resolved
//! against the directory holding the config file, and replace rules are
//! compiled once at load time.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `root`, `base` and `title` support `${VAR}` and `${VAR:-default}`.

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use quire_markdown::ReplaceRule;
use serde::Deserialize;

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content root directory.
    pub root: Option<PathBuf>,
    /// Override route base path.
    pub base: Option<String>,
    /// Override search indexing flag.
    pub search_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quire.toml";

/// Default content file extensions.
const DEFAULT_EXTENSIONS: [&str; 6] = ["md", "mdx", "js", "jsx", "ts", "tsx"];

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content root, relative to the config file.
    root: Option<String>,
    /// Route base path (`/` or `/prefix/`).
    pub base: String,
    /// Site title for text exports.
    pub title: String,
    /// Default locale.
    pub lang: String,
    /// Configured locales. Empty means a single-locale site.
    pub locales: Vec<LocaleConfig>,
    /// Multi-version settings.
    pub multi_version: Option<MultiVersionConfig>,
    /// Route discovery settings.
    pub route: RouteSection,
    /// Search indexing settings.
    pub search: SearchConfig,
    /// Markdown extraction settings.
    pub markdown: MarkdownConfig,
    /// Text substitutions as written in the file.
    replace_rules: Vec<ReplaceRuleConfig>,
    /// Import aliases as written in the file.
    alias: BTreeMap<String, String>,

    /// Resolved content root (set after loading).
    #[serde(skip)]
    pub root_dir: PathBuf,
    /// Compiled replace rules (set after loading).
    #[serde(skip)]
    pub replace_rules_resolved: Vec<ReplaceRule>,
    /// Alias prefixes mapped to absolute directories (set after loading).
    #[serde(skip)]
    pub alias_resolved: BTreeMap<String, PathBuf>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// A locale entry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LocaleConfig {
    /// Locale code used as the path segment (`zh`).
    pub lang: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
}

/// Multi-version configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MultiVersionConfig {
    /// Version served without a path segment.
    pub default: String,
    /// All versions, used as top-level content directories.
    pub versions: Vec<String>,
}

/// Route discovery configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RouteSection {
    /// File extensions treated as pages.
    pub extensions: Vec<String>,
    /// Glob patterns, relative to the root, of files to skip.
    pub exclude: Vec<String>,
}

impl Default for RouteSection {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|&e| e.to_owned()).collect(),
            exclude: Vec::new(),
        }
    }
}

/// Search indexing configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Whether search content is produced at all.
    pub enabled: bool,
    /// Whether code blocks are kept in search content.
    pub code_blocks: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            code_blocks: true,
        }
    }
}

/// Markdown extraction configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Whether descriptions are synthesized from page prose.
    pub extract_description: bool,
    /// Deepest heading level included in the outline.
    pub toc_max_depth: u8,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extract_description: true,
            toc_max_depth: 4,
        }
    }
}

/// Replace rule as written in the file.
#[derive(Debug, Clone, Deserialize)]
struct ReplaceRuleConfig {
    search: String,
    #[serde(default)]
    replace: String,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., `base`).
        field: String,
        /// Error message (e.g., "${`DOCS_BASE`} not set").
        message: String,
    },
    /// Replace rule pattern does not compile.
    #[error("Invalid replace rule pattern {pattern:?}: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quire.toml` in current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.root {
            self.root_dir.clone_from(root);
        }
        if let Some(base) = &settings.base {
            self.base.clone_from(base);
        }
        if let Some(enabled) = settings.search_enabled {
            self.search.enabled = enabled;
        }
    }

    /// Locale codes, default locale first. Empty for single-locale sites.
    #[must_use]
    pub fn lang_codes(&self) -> Vec<String> {
        if self.locales.is_empty() {
            return Vec::new();
        }
        let mut langs = vec![self.lang.clone()];
        langs.extend(
            self.locales
                .iter()
                .map(|l| l.lang.clone())
                .filter(|l| *l != self.lang),
        );
        langs
    }

    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            root: None,
            base: "/".to_owned(),
            title: "Documentation".to_owned(),
            lang: "en".to_owned(),
            locales: Vec::new(),
            multi_version: None,
            route: RouteSection::default(),
            search: SearchConfig::default(),
            markdown: MarkdownConfig::default(),
            replace_rules: Vec::new(),
            alias: BTreeMap::new(),
            root_dir: base.join("docs"),
            replace_rules_resolved: Vec::new(),
            alias_resolved: BTreeMap::new(),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content, path.parent().unwrap_or(Path::new(".")))
            .map(|config| Self {
                config_path: Some(path.to_path_buf()),
                ..config
            })
    }

    /// Parse, expand, resolve and validate configuration text.
    fn from_toml(content: &str, config_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.resolve(config_dir)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const DEPTH_RANGE: std::ops::RangeInclusive<u8> = 2..=6;

        require_non_empty(&self.lang, "lang")?;
        if !self.base.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "base must start with '/', got {:?}",
                self.base
            )));
        }
        if !self.locales.is_empty() && !self.locales.iter().any(|l| l.lang == self.lang) {
            return Err(ConfigError::Validation(format!(
                "lang {:?} must be one of the configured locales",
                self.lang
            )));
        }
        if let Some(mv) = &self.multi_version {
            require_non_empty(&mv.default, "multi_version.default")?;
            if !mv.versions.contains(&mv.default) {
                return Err(ConfigError::Validation(format!(
                    "multi_version.default {:?} must be listed in multi_version.versions",
                    mv.default
                )));
            }
        }
        if self.route.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "route.extensions cannot be empty".to_owned(),
            ));
        }
        if !DEPTH_RANGE.contains(&self.markdown.toc_max_depth) {
            return Err(ConfigError::Validation(format!(
                "markdown.toc_max_depth must be between {} and {}",
                DEPTH_RANGE.start(),
                DEPTH_RANGE.end()
            )));
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.base = expand::expand_env(&self.base, "base")?;
        self.title = expand::expand_env(&self.title, "title")?;
        if let Some(ref root) = self.root {
            self.root = Some(expand::expand_env(root, "root")?);
        }
        Ok(())
    }

    /// Resolve paths against the config directory and compile replace rules.
    fn resolve(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        self.root_dir = config_dir.join(self.root.as_deref().unwrap_or("docs"));
        self.alias_resolved = self
            .alias
            .iter()
            .map(|(prefix, target)| (prefix.clone(), config_dir.join(target)))
            .collect();
        self.replace_rules_resolved = self
            .replace_rules
            .iter()
            .map(|rule| {
                ReplaceRule::new(&rule.search, rule.replace.as_str()).map_err(|source| {
                    ConfigError::Regex {
                        pattern: rule.search.clone(),
                        source,
                    }
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(())
    }
}
