//! Configuration types and validation for the assembler
//! Author: kartik4091
//! Created: 2025-06-03

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metadata::MetadataPolicy;
use crate::redactor::RedactorConfig;

/// Environment variable naming the form template
pub const TEMPLATE_ENV: &str = "EPOA_FORM_TEMPLATE";

/// Bundled location of the complaint form
pub const DEFAULT_TEMPLATE: &str = "data/F700-200-000.pdf";

/// What to do with an evidence file that cannot be redacted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RedactionFailurePolicy {
    /// Fail the whole run
    #[default]
    Abort,
    /// Leave the file out of the output and keep going
    Skip,
}

/// How the final document is concatenated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MergeBackend {
    /// In-process merge with lopdf
    #[default]
    Native,
    /// `pdftk ... cat output`
    Pdftk,
}

/// External programs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_pdftk")]
    pub pdftk: PathBuf,
}

fn default_pdftk() -> PathBuf {
    PathBuf::from("pdftk")
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            pdftk: default_pdftk(),
        }
    }
}

/// Assembler configuration, usually loaded from a JSON or YAML file and then
/// overridden from the command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    pub template_path: PathBuf,
    pub overwrite: bool,
    pub redaction_failure_policy: RedactionFailurePolicy,
    pub merge_backend: MergeBackend,
    /// Parent for the per-run scratch directory; the system temp dir when unset
    pub workspace_root: Option<PathBuf>,
    pub tools: ToolConfig,
    pub metadata_policy: MetadataPolicy,
    /// Drop the trailer /ID from redacted evidence
    pub strip_document_id: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from(DEFAULT_TEMPLATE),
            overwrite: false,
            redaction_failure_policy: RedactionFailurePolicy::default(),
            merge_backend: MergeBackend::default(),
            workspace_root: None,
            tools: ToolConfig::default(),
            metadata_policy: MetadataPolicy::default(),
            strip_document_id: true,
        }
    }
}

impl AssemblerConfig {
    /// Reads a config file, trying JSON first and then YAML
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;

        let config: Self = serde_json::from_str(&content)
            .or_else(|_| serde_yaml::from_str(&content))
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Applies `EPOA_FORM_TEMPLATE` when it is set and non-empty
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(template) = std::env::var_os(TEMPLATE_ENV).filter(|v| !v.is_empty()) {
            self.template_path = PathBuf::from(template);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.template_path.as_os_str().is_empty() {
            return Err(Error::ConfigError("template path is empty".into()));
        }
        if self.tools.pdftk.as_os_str().is_empty() {
            return Err(Error::ConfigError("pdftk program is empty".into()));
        }
        if let Some(root) = &self.workspace_root {
            if !root.is_dir() {
                return Err(Error::ConfigError(format!(
                    "workspace root is not a directory: {}",
                    root.display()
                )));
            }
        }
        Ok(())
    }

    /// Redaction settings for a given word set
    pub fn redactor_config<'a, I>(&self, words: I) -> RedactorConfig
    where
        I: IntoIterator<Item = &'a String>,
    {
        RedactorConfig {
            words: words.into_iter().cloned().collect(),
            metadata_policy: self.metadata_policy.clone(),
            strip_document_id: self.strip_document_id,
        }
    }
}
