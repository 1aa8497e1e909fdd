//! # Variant Expansion Engine
//!
//! Coordinates one expansion pass: Locate → Derive → Clone/Rewrite → Splice
//!
//! All clones are built from the untouched tree before the first splice, so
//! a failing template leaves the document exactly as it was.

use crate::id_generator::IDGenerator;
use crate::locator::{find_all, NodePath, Pattern, PatternError};
use crate::rewriter::{
    derive_base_identifier, expand_variant, sanitize_variant_name, BaseIdentifier, RewriteError,
    RewriteRules,
};
use crate::splicer::{ensure_disjoint, splice_all, Splice, SpliceError};
use lsxgen_parser::{Document, Node};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Default pattern selecting VisualBank resources
pub const VISUAL_BANK_PATTERN: &str =
    r#".//region[@id="VisualBank"]/node[@id="VisualBank"]/children/node[@id="Resource"]"#;

/// Default name of the base variant
pub const DEFAULT_BASE_NAME: &str = "Basis";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpansionError {
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Template at {path} is malformed: {source}")]
    Rewrite {
        path: NodePath,
        #[source]
        source: RewriteError,
    },

    #[error("Splice failed: {0}")]
    Splice(#[from] SpliceError),

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

impl ExpansionError {
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

/// Ordered variant names; index 0 is the base and is never materialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantSource {
    names: Vec<String>,
}

impl VariantSource {
    /// Validate and wrap a variant list
    ///
    /// Fails when the list is empty, does not start with `base_name`,
    /// contains an empty or repeated name, or two variants that sanitize to
    /// the same identifier fragment.
    pub fn new<I, S>(names: I, base_name: &str) -> Result<Self, ExpansionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        let first = names
            .first()
            .ok_or_else(|| ExpansionError::precondition("variant list is empty"))?;
        if first != base_name {
            return Err(ExpansionError::precondition(format!(
                "expected the first variant to be called {:?}, got {:?}",
                base_name, first
            )));
        }

        let mut fragments: HashMap<String, &str> = HashMap::new();
        for (index, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(ExpansionError::precondition(format!(
                    "variant {} has an empty name",
                    index
                )));
            }
            if names[..index].contains(name) {
                return Err(ExpansionError::precondition(format!(
                    "variant {:?} is listed twice",
                    name
                )));
            }
            if index == 0 {
                continue;
            }
            if let Some(other) = fragments.insert(sanitize_variant_name(name), name) {
                return Err(ExpansionError::precondition(format!(
                    "variants {:?} and {:?} map to the same identifier",
                    other, name
                )));
            }
        }

        Ok(Self { names })
    }

    pub fn base(&self) -> &str {
        &self.names[0]
    }

    /// Variants to materialize, in order (base excluded)
    pub fn variants(&self) -> &[String] {
        &self.names[1..]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionOptions {
    pub template_pattern: Pattern,
    pub base_name: String,
    pub rules: RewriteRules,
}

impl Default for ExpansionOptions {
    fn default() -> Self {
        Self {
            template_pattern: match Pattern::parse(VISUAL_BANK_PATTERN) {
                Ok(pattern) => pattern,
                Err(err) => unreachable!("built-in template pattern is invalid: {err}"),
            },
            base_name: DEFAULT_BASE_NAME.to_string(),
            rules: RewriteRules::default(),
        }
    }
}

/// One generated entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedEntry {
    pub variant: String,
    pub name: String,
    pub id: String,
}

/// What happened to one template node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateReport {
    /// Position of the template before expansion
    pub path: NodePath,
    pub base: BaseIdentifier,
    pub entries: Vec<GeneratedEntry>,
}

/// Result of an expansion pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionReport {
    pub templates: Vec<TemplateReport>,
}

impl ExpansionReport {
    pub fn generated_count(&self) -> usize {
        self.templates.iter().map(|t| t.entries.len()).sum()
    }
}

/// Template located in a document, with its base identifier
#[derive(Debug, Clone)]
pub struct TemplateInfo<'a> {
    pub path: NodePath,
    pub node: &'a Node,
    pub base: Result<BaseIdentifier, RewriteError>,
}

/// Variant expansion over a document tree
pub struct ExpansionEngine {
    options: ExpansionOptions,
    ids: IDGenerator,
}

impl ExpansionEngine {
    pub fn new(options: ExpansionOptions) -> Self {
        Self {
            options,
            ids: IDGenerator::new(),
        }
    }

    pub fn options(&self) -> &ExpansionOptions {
        &self.options
    }

    /// Template nodes the configured pattern selects, with their base names
    pub fn inspect<'a>(&self, doc: &'a Document) -> Vec<TemplateInfo<'a>> {
        find_all(&doc.root, &self.options.template_pattern)
            .into_iter()
            .map(|m| TemplateInfo {
                base: derive_base_identifier(m.node, &self.options.rules),
                path: m.path,
                node: m.node,
            })
            .collect()
    }

    /// Expand every template node in `doc` into one entry per variant
    #[instrument(skip_all, fields(pattern = %self.options.template_pattern, variants = variants.len()))]
    pub fn expand_document(
        &mut self,
        doc: &mut Document,
        variants: &VariantSource,
    ) -> Result<ExpansionReport, ExpansionError> {
        if variants.base() != self.options.base_name {
            return Err(ExpansionError::precondition(format!(
                "variant list starts with {:?}, expected base {:?}",
                variants.base(),
                self.options.base_name
            )));
        }

        let templates = find_all(&doc.root, &self.options.template_pattern);
        if templates.is_empty() {
            return Err(ExpansionError::precondition(format!(
                "no template nodes match {}",
                self.options.template_pattern
            )));
        }

        ensure_disjoint(templates.iter().map(|m| &m.path)).map_err(|err| {
            ExpansionError::precondition(format!("template nodes must not nest: {}", err))
        })?;

        info!(templates = templates.len(), "Starting variant expansion");

        // existing IDs are never handed out again
        self.ids.reserve(
            doc.root
                .descendants()
                .filter_map(|node| node.attribute(&self.options.rules.value_key)),
        );

        let mut report = ExpansionReport::default();
        let mut splices = Vec::with_capacity(templates.len());

        for template in &templates {
            let rewrite_error = |source| ExpansionError::Rewrite {
                path: template.path.clone(),
                source,
            };

            let base = derive_base_identifier(template.node, &self.options.rules)
                .map_err(rewrite_error)?;
            debug!(path = %template.path, base = %base.full, short = %base.short, "Expanding template");

            let mut clones = Vec::with_capacity(variants.variants().len());
            let mut entries = Vec::with_capacity(variants.variants().len());

            for variant in variants.variants() {
                let expanded = expand_variant(
                    template.node,
                    variant,
                    &base,
                    &self.options.rules,
                    &mut self.ids,
                )
                .map_err(rewrite_error)?;

                debug!(variant = %variant, name = %expanded.identifier, id = %expanded.unique_id, "Generated entry");

                entries.push(GeneratedEntry {
                    variant: variant.clone(),
                    name: expanded.identifier,
                    id: expanded.unique_id,
                });
                clones.push(expanded.node);
            }

            splices.push(Splice::new(template.path.clone(), clones));
            report.templates.push(TemplateReport {
                path: template.path.clone(),
                base,
                entries,
            });
        }

        let inserted = splice_all(&mut doc.root, splices)?;

        info!(
            templates = report.templates.len(),
            generated = inserted,
            "Variant expansion complete"
        );

        Ok(report)
    }
}

impl Default for ExpansionEngine {
    fn default() -> Self {
        Self::new(ExpansionOptions::default())
    }
}
