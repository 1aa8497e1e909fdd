use anyhow::{anyhow, Result};
use lsxgen_editor::{ExpansionOptions, MatchMode, Pattern, RewriteRules, RewriteTarget};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "lsxgen.config.json";

/// lsxgen configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Selects the template nodes, relative to the document root
    pub template_pattern: Pattern,

    /// Variant that the templates already represent
    pub base_name: String,

    /// Trailing marker stripped from a template's display name
    pub base_suffix: String,

    /// `id` of the attribute element holding the display name
    pub name_attribute: String,

    /// `id` of the attribute element holding the unique ID
    pub id_attribute: String,

    /// Attribute carrying the value on attribute elements
    pub value_key: String,

    /// Values where the base name is replaced by the variant name
    pub substring_targets: Vec<SubstringTarget>,

    /// Write the new identifier as the clone's inline text
    pub label_clones: bool,

    /// Indentation used when writing output
    pub indent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstringTarget {
    /// Pattern relative to the template node
    pub pattern: Pattern,

    /// Rewrite every match instead of the first one
    #[serde(default)]
    pub all: bool,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Load an explicit config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read config {}: {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| anyhow!("Invalid config {}: {}", path.display(), e))
    }

    /// Engine options described by this config
    pub fn expansion_options(&self) -> Result<ExpansionOptions> {
        Ok(ExpansionOptions {
            template_pattern: self.template_pattern.clone(),
            base_name: self.base_name.clone(),
            rules: RewriteRules {
                name_target: attribute_pattern(&self.name_attribute)?,
                id_target: attribute_pattern(&self.id_attribute)?,
                value_key: self.value_key.clone(),
                substring_targets: self
                    .substring_targets
                    .iter()
                    .map(|target| RewriteTarget {
                        pattern: target.pattern.clone(),
                        mode: if target.all {
                            MatchMode::All
                        } else {
                            MatchMode::First
                        },
                    })
                    .collect(),
                base_suffix: self.base_suffix.clone(),
                label_clones: self.label_clones,
            },
        })
    }
}

/// Child `attribute` element with the given `id`
fn attribute_pattern(id: &str) -> Result<Pattern> {
    let quote = if id.contains('"') { '\'' } else { '"' };
    Ok(Pattern::parse(&format!(
        "attribute[@id={quote}{id}{quote}]"
    ))?)
}

impl Default for Config {
    fn default() -> Self {
        let options = ExpansionOptions::default();

        Self {
            template_pattern: options.template_pattern,
            base_name: options.base_name,
            base_suffix: options.rules.base_suffix,
            name_attribute: "Name".to_string(),
            id_attribute: "ID".to_string(),
            value_key: options.rules.value_key,
            substring_targets: options
                .rules
                .substring_targets
                .into_iter()
                .map(|target| SubstringTarget {
                    pattern: target.pattern,
                    all: target.mode == MatchMode::All,
                })
                .collect(),
            label_clones: options.rules.label_clones,
            indent: "\t".to_string(),
        }
    }
}
