use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use endiancraft::{
    constants::{SynthOptions, UnresolvedPolicy, ZeroExtentPolicy},
    pattern::CyclicPattern,
};
use endiancraft_gtest::RenderConfig;
use serde::Deserialize;

use crate::args::{Cli, UnresolvedMode};

/// Settings file passed with `--config`.
///
/// ```json
/// {
///   "render": { "suite": "EndianTest", "message_header": null },
///   "synth": { "unresolved": "zero" },
///   "pattern": "11,22,33,44",
///   "defines": { "MAX_20": 20 }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub render: RenderConfig,
    pub synth: SynthOptions,
    pub pattern: Option<String>,
    /// Applied after header constants and before `-D` flags.
    pub defines: BTreeMap<String, i64>,
}

/// Fully merged settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub render: RenderConfig,
    pub synth: SynthOptions,
    pub prompt: bool,
    pub pattern: CyclicPattern,
    pub defines: Vec<(String, i64)>,
}

impl GenerateConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    /// Applies command line overrides on top of the file settings.
    pub fn merge(self, cli: &Cli) -> Result<Settings> {
        let mut render = self.render;
        if let Some(suite) = &cli.suite {
            render.suite = suite.clone();
        }
        if let Some(convert_fn) = &cli.convert_fn {
            render.convert_fn = convert_fn.clone();
        }

        let mut synth = self.synth;
        let mut prompt = false;
        match cli.unresolved {
            Some(UnresolvedMode::Strict) => synth.unresolved = UnresolvedPolicy::Strict,
            Some(UnresolvedMode::Zero) => synth.unresolved = UnresolvedPolicy::Zero,
            Some(UnresolvedMode::Prompt) => {
                synth.unresolved = UnresolvedPolicy::Strict;
                prompt = true;
            }
            None => {}
        }
        if cli.reject_zero {
            synth.zero_extent = ZeroExtentPolicy::Reject;
        }

        let pattern = match cli.pattern.as_ref().or(self.pattern.as_ref()) {
            Some(text) => text
                .parse()
                .with_context(|| format!("invalid marker pattern `{text}`"))?,
            None => CyclicPattern::default(),
        };

        let mut defines: Vec<(String, i64)> = self.defines.into_iter().collect();
        defines.extend(cli.defines.iter().cloned());

        Ok(Settings {
            render,
            synth,
            prompt,
            pattern,
            defines,
        })
    }
}
