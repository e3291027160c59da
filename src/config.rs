//! Project configuration.
//!
//! The command-line tool reads `quire.toml` from the project directory:
//!
//! ```toml
//! from = ["posts/**/*.md"]     # one pattern or a list (required)
//! as = "posts"                 # collection name (required)
//! highlighters = ["spans"]     # default: none
//! output = "quire-out/posts.json"
//! parallel = false
//! max_processes = 4            # omit for auto = CPU cores
//!
//! # Every other key goes to the HTML converter untouched.
//! smart_punctuation = true
//! ```
//!
//! Relative patterns and the output path are resolved against the
//! directory holding `quire.toml`, not the working directory.
//!
//! Unlike most TOML configs, unknown keys are not rejected: they *are* the
//! converter options bag. A typo in `highlighters` or `parallel` therefore
//! lands in the options instead of failing, which `quire check` makes
//! visible.

use crate::discover::Patterns;
use crate::highlight::{CodeBlockPattern, Highlighter, highlighter_by_name};
use crate::publisher::Publisher;
use crate::types::Options;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILENAME: &str = "quire.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("no quire.toml in {} (run `quire gen-config > quire.toml`)", .0.display())]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `quire.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Source pattern(s), relative to the config directory.
    pub from: Patterns,
    /// Collection name.
    #[serde(rename = "as")]
    pub name: String,
    /// Highlighter identifiers, tried in order.
    #[serde(default)]
    pub highlighters: Vec<String>,
    /// Regex overriding the default code-block pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_block_pattern: Option<String>,
    /// Where `quire build` writes the compiled collection.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub parallel: bool,
    /// Maximum number of worker threads when `parallel` is set.
    /// Values larger than the core count are clamped down.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
    /// Remaining keys, forwarded to the converter.
    #[serde(flatten)]
    pub options: Options,
}

fn default_output() -> PathBuf {
    PathBuf::from("quire-out/posts.json")
}

impl ContentConfig {
    pub fn new(name: impl Into<String>, from: impl Into<Patterns>) -> Self {
        Self {
            from: from.into(),
            name: name.into(),
            highlighters: Vec::new(),
            code_block_pattern: None,
            output: default_output(),
            parallel: false,
            max_processes: None,
            options: Options::new(),
        }
    }

    /// Check the values serde can't.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation("`as` must not be empty".into()));
        }
        if self.from.is_empty() {
            return Err(ConfigError::Validation(
                "`from` must name at least one pattern".into(),
            ));
        }
        if self.from.as_slice().iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "`from` patterns must not be empty".into(),
            ));
        }
        if let Some(unknown) = self
            .highlighters
            .iter()
            .find(|name| highlighter_by_name(name).is_none())
        {
            return Err(ConfigError::Validation(format!(
                "unknown highlighter {unknown:?}"
            )));
        }
        self.block_pattern()?;
        if self.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The configured code-block pattern, or the default.
    pub fn block_pattern(&self) -> Result<CodeBlockPattern, ConfigError> {
        match &self.code_block_pattern {
            Some(pattern) => CodeBlockPattern::new(pattern)
                .map_err(|e| ConfigError::Validation(e.to_string())),
            None => Ok(CodeBlockPattern::default()),
        }
    }

    pub fn resolve_highlighters(&self) -> Result<Vec<Box<dyn Highlighter>>, ConfigError> {
        self.highlighters
            .iter()
            .map(|name| {
                highlighter_by_name(name).ok_or_else(|| {
                    ConfigError::Validation(format!("unknown highlighter {name:?}"))
                })
            })
            .collect()
    }

    /// Patterns with relative entries resolved against `root`.
    pub fn patterns_in(&self, root: &Path) -> Patterns {
        let resolved: Vec<String> = self
            .from
            .as_slice()
            .iter()
            .map(|p| rooted(root, Path::new(p)).to_string_lossy().into_owned())
            .collect();
        match &self.from {
            Patterns::One(_) => resolved
                .into_iter()
                .next()
                .map_or(Patterns::Many(Vec::new()), Patterns::One),
            Patterns::Many(_) => Patterns::Many(resolved),
        }
    }

    pub fn output_in(&self, root: &Path) -> PathBuf {
        rooted(root, &self.output)
    }

    /// A publisher for this configuration, with sources under `root`.
    ///
    /// Warnings go to standard error.
    pub fn publisher(&self, root: &Path) -> Result<Publisher, ConfigError> {
        Ok(Publisher::new(self.name.clone(), self.patterns_in(root))
            .highlighters(self.resolve_highlighters()?)
            .code_block_pattern(self.block_pattern()?)
            .options(self.options.clone())
            .parallel(self.parallel))
    }

    /// SHA-256 over the settings that change compiled output.
    ///
    /// `output`, `parallel` and `max_processes` are left out: they change
    /// where and how fast, not what.
    pub fn settings_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"quire\0");
        hasher.update(self.name.as_bytes());
        for pattern in self.from.as_slice() {
            hasher.update(b"\0from\0");
            hasher.update(pattern.as_bytes());
        }
        for name in &self.highlighters {
            hasher.update(b"\0hl\0");
            hasher.update(name.as_bytes());
        }
        match &self.code_block_pattern {
            Some(pattern) => {
                hasher.update(b"\x01");
                hasher.update(pattern.as_bytes());
            }
            None => hasher.update(b"\x00"),
        }
        // serde_json's Map is sorted, so this is stable across runs.
        hasher.update(serde_json::Value::Object(self.options.clone()).to_string());
        format!("{:x}", hasher.finalize())
    }
}

fn rooted(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || root.as_os_str().is_empty() || root == Path::new(".") {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ContentConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Path of the config file in `root`.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILENAME)
}

/// Parse and validate config text.
pub fn parse_config(content: &str) -> Result<ContentConfig, ConfigError> {
    let config: ContentConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load `quire.toml` from the given directory.
pub fn load_config(root: &Path) -> Result<ContentConfig, ConfigError> {
    let path = config_path(root);
    if !path.exists() {
        return Err(ConfigError::NotFound(root.to_path_buf()));
    }
    let content = fs::read_to_string(&path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock `quire.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# quire configuration
# ===================
# `from` and `as` are required; everything else is optional.
# Paths are relative to the directory holding this file.

# Source pattern(s). One string or a list; each list entry is expanded
# on its own and the results are concatenated in order.
# Within a pattern, files are compiled in lexicographic path order.
from = ["posts/**/*.md"]

# Name of the compiled collection.
as = "posts"

# Code highlighters, tried in order for each fenced code block.
# Available: "spans" (elixir, rust). Leave empty to skip highlighting.
highlighters = ["spans"]

# Regex locating code blocks in the converted HTML. Group 1 is the
# language, group 2 the escaped code. The default matches the output of
# the built-in markdown converter.
# code_block_pattern = '<pre><code(?:\s+class="(?:language-)?([^"]*)")?>([^<]*)</code></pre>'

# Where `quire build` writes the collection and its snapshot.
output = "quire-out/posts.json"

# Read, parse and convert files on a thread pool.
parallel = false

# Maximum worker threads when `parallel` is set.
# Omit to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Converter options
# ---------------------------------------------------------------------------
# Any other key is handed to the HTML converter as-is. The built-in
# markdown converter understands these switches:
tables = true
strikethrough = true
tasklists = true
footnotes = false
smart_punctuation = false
heading_attributes = false
"##
}
