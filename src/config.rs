//! Configuration system for the indent engine
//!
//! Reads configuration from `.sleetrc.yaml` / `.sleetrc.json` at the
//! project level; every field falls back to a default so an absent file is
//! equivalent to an empty one.

use crate::diagnostic::Severity;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The indent unit: N spaces per level, or one hard tab per level.
///
/// Serializes as a bare number (`indent: 4`) or the literal string `tab`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IndentUnitRepr", into = "IndentUnitRepr")]
pub enum IndentUnit {
    /// Number of spaces per indentation level
    Spaces(usize),
    /// One tab character per indentation level
    Tab,
}

/// Wire representation of [`IndentUnit`].
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum IndentUnitRepr {
    Num(usize),
    Str(String),
}

impl TryFrom<IndentUnitRepr> for IndentUnit {
    type Error = String;

    fn try_from(repr: IndentUnitRepr) -> Result<Self, Self::Error> {
        match repr {
            IndentUnitRepr::Num(n) => Ok(IndentUnit::Spaces(n)),
            IndentUnitRepr::Str(s) if s == "tab" => Ok(IndentUnit::Tab),
            IndentUnitRepr::Str(s) => Err(format!("expected \"tab\" or a number, found {:?}", s)),
        }
    }
}

impl From<IndentUnit> for IndentUnitRepr {
    fn from(unit: IndentUnit) -> Self {
        match unit {
            IndentUnit::Spaces(n) => IndentUnitRepr::Num(n),
            IndentUnit::Tab => IndentUnitRepr::Str("tab".to_string()),
        }
    }
}

impl Default for IndentUnit {
    fn default() -> Self {
        IndentUnit::Spaces(2)
    }
}

impl IndentUnit {
    /// The character this unit indents with.
    pub fn indent_char(self) -> char {
        match self {
            IndentUnit::Spaces(_) => ' ',
            IndentUnit::Tab => '\t',
        }
    }

    /// Number of indent characters per unit.
    pub fn size(self) -> usize {
        match self {
            IndentUnit::Spaces(n) => n,
            IndentUnit::Tab => 1,
        }
    }

    /// Human-readable unit name for messages ("space" / "tab").
    pub fn unit_name(self) -> &'static str {
        match self {
            IndentUnit::Spaces(_) => "space",
            IndentUnit::Tab => "tab",
        }
    }
}

/// Close-bracket offsets, configurable per tag kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CloseBracket {
    /// One offset for every bracket kind
    Uniform(usize),
    /// Distinct offsets per tag kind
    Split(CloseBracketOffsets),
}

/// Per-tag-kind close-bracket offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloseBracketOffsets {
    /// Offset of `>` from the start tag's `<name`
    pub start_tag: usize,
    /// Offset of `>` from the end tag's `</name`
    pub end_tag: usize,
    /// Offset of `/>` from the start tag's `<name`
    pub self_closing_tag: usize,
}

impl Default for CloseBracket {
    fn default() -> Self {
        CloseBracket::Uniform(0)
    }
}

impl CloseBracket {
    pub fn start_tag(self) -> usize {
        match self {
            CloseBracket::Uniform(n) => n,
            CloseBracket::Split(o) => o.start_tag,
        }
    }

    pub fn end_tag(self) -> usize {
        match self {
            CloseBracket::Uniform(n) => n,
            CloseBracket::Split(o) => o.end_tag,
        }
    }

    pub fn self_closing_tag(self) -> usize {
        match self {
            CloseBracket::Uniform(n) => n,
            CloseBracket::Split(o) => o.self_closing_tag,
        }
    }
}

/// User-facing options of the indent engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndentOptions {
    /// Indent unit: a space width or `tab`
    pub indent: IndentUnit,

    /// Base indentation (in units) applied to every top-level unit
    pub base_indent: usize,

    /// Offset (in units) of attribute lists from their start tag
    pub attribute: usize,

    /// Align attributes vertically under the first attribute
    pub align_attributes_vertically: bool,

    /// Close-bracket offsets
    pub close_bracket: CloseBracket,

    /// Offset (in units) of `case`/`default` clauses from `switch`
    pub switch_case: usize,

    /// Node-kind glob patterns whose tokens are excluded from validation
    pub ignores: Vec<String>,

    /// Element names whose content keeps its own formatting
    pub preformatted: Vec<String>,

    /// Severity of indent diagnostics
    pub severity: Severity,
}

impl Default for IndentOptions {
    fn default() -> Self {
        Self {
            indent: IndentUnit::default(),
            base_indent: 0,
            attribute: 1,
            align_attributes_vertically: true,
            close_bracket: CloseBracket::default(),
            switch_case: 0,
            ignores: Vec::new(),
            preformatted: vec!["pre".to_string(), "textarea".to_string()],
            severity: Severity::Warning,
        }
    }
}

impl IndentOptions {
    /// Check whether an element name is preformatted.
    pub fn is_preformatted(&self, name: &str) -> bool {
        self.preformatted.iter().any(|p| p == name)
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Color mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,

    /// Color mode
    pub color: ColorMode,

    /// Verbose output
    pub verbose: bool,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Indent engine options
    pub indent: IndentOptions,

    /// Output settings
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a specific file (YAML or JSON by extension).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "json" => Ok(serde_json::from_str(&content)?),
            "yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
            other => Err(ConfigError::Invalid(format!(
                "unsupported config extension: {:?}",
                other
            ))),
        }
    }

    /// Discover `.sleetrc.yaml` / `.sleetrc.yml` / `.sleetrc.json` in a
    /// directory. Returns defaults when none exists.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        for name in [".sleetrc.yaml", ".sleetrc.yml", ".sleetrc.json"] {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }
}
