//! # Identifier Rewriter
//!
//! Produces one rewritten deep clone of a template node per variant.
//!
//! ## Rewrite semantics
//!
//! ### Full replace
//! - Display name: set to `<short base>_<sanitized variant>`
//! - Unique ID: set to a fresh UUID v4
//! - The target must resolve to exactly one element in the template
//!
//! ### Substring replace
//! - Every exact, case-sensitive occurrence of the full base identifier is
//!   replaced by the new identifier
//! - Missing targets and values without the base identifier are left alone

use crate::id_generator::IDGenerator;
use crate::locator::{find_all, node_at, node_at_mut, NodePath, Pattern};
use lsxgen_parser::Node;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RewriteError {
    #[error("Attribute missing: {target} (key {key:?})")]
    AttributeMissing { target: String, key: String },

    #[error("Attribute ambiguous: {target} matched {count} elements")]
    AttributeAmbiguous { target: String, count: usize },
}

/// Which matches of a substring target are rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Only the first match in document order
    First,
    /// Every match
    All,
}

/// Substring-replace target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteTarget {
    pub pattern: Pattern,
    pub mode: MatchMode,
}

impl RewriteTarget {
    pub fn first(pattern: Pattern) -> Self {
        Self {
            pattern,
            mode: MatchMode::First,
        }
    }

    pub fn all(pattern: Pattern) -> Self {
        Self {
            pattern,
            mode: MatchMode::All,
        }
    }
}

/// Rewrite configuration, relative to the template node
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteRules {
    /// Element holding the display name
    pub name_target: Pattern,
    /// Element holding the unique ID
    pub id_target: Pattern,
    /// Attribute on the target elements that carries the value
    pub value_key: String,
    pub substring_targets: Vec<RewriteTarget>,
    /// Trailing marker removed from the display name to get the short base
    pub base_suffix: String,
    /// Put the new identifier into the clone's inline text
    pub label_clones: bool,
}

impl Default for RewriteRules {
    fn default() -> Self {
        Self {
            name_target: builtin(r#"attribute[@id="Name"]"#),
            id_target: builtin(r#"attribute[@id="ID"]"#),
            value_key: "value".to_string(),
            substring_targets: vec![
                RewriteTarget::first(builtin(r#"attribute[@id="SourceFile"]"#)),
                RewriteTarget::first(builtin(r#"attribute[@id="Template"]"#)),
                RewriteTarget::all(builtin(
                    r#".//children/node[@id="Objects"]/attribute[@id="ObjectID"]"#,
                )),
            ],
            base_suffix: "_Basis".to_string(),
            label_clones: true,
        }
    }
}

fn builtin(source: &str) -> Pattern {
    match Pattern::parse(source) {
        Ok(pattern) => pattern,
        Err(err) => unreachable!("built-in pattern {source:?} is invalid: {err}"),
    }
}

/// Display name of a template and its suffix-free form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseIdentifier {
    /// Display name as found on the template, e.g. `HUM_F_Basis`
    pub full: String,
    /// `full` without the base suffix, e.g. `HUM_F`
    pub short: String,
}

/// A generated clone plus the identifiers written into it
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedVariant {
    pub node: Node,
    pub identifier: String,
    pub unique_id: String,
}

/// Map a variant name onto the identifier alphabet
///
/// Every character that is not an ASCII letter, digit or underscore becomes
/// an underscore. One character in, one character out.
pub fn sanitize_variant_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Identifier for `variant` derived from the short base identifier
pub fn variant_identifier(short: &str, variant: &str) -> String {
    format!("{}_{}", short, sanitize_variant_name(variant))
}

/// Read the display name of `template` and strip the base suffix from it
///
/// The suffix is removed only as an exact trailing substring; a name without
/// it is used as-is for the short form.
pub fn derive_base_identifier(
    template: &Node,
    rules: &RewriteRules,
) -> Result<BaseIdentifier, RewriteError> {
    let path = resolve_single(template, &rules.name_target, &rules.value_key)?;
    let full = node_at(template, &path)
        .and_then(|node| node.attribute(&rules.value_key))
        .ok_or_else(|| missing(&rules.name_target, &rules.value_key))?
        .to_string();

    let short = full
        .strip_suffix(rules.base_suffix.as_str())
        .unwrap_or(&full)
        .to_string();

    Ok(BaseIdentifier { full, short })
}

/// Clone `template` and rewrite it for `variant_name`
pub fn expand(
    template: &Node,
    variant_name: &str,
    base: &BaseIdentifier,
    rules: &RewriteRules,
    ids: &mut IDGenerator,
) -> Result<Node, RewriteError> {
    expand_variant(template, variant_name, base, rules, ids).map(|expanded| expanded.node)
}

/// Like [`expand`], also returning the identifiers that were written
pub fn expand_variant(
    template: &Node,
    variant_name: &str,
    base: &BaseIdentifier,
    rules: &RewriteRules,
    ids: &mut IDGenerator,
) -> Result<ExpandedVariant, RewriteError> {
    let identifier = variant_identifier(&base.short, variant_name);

    // Resolve full-replace targets on the template first so a malformed
    // template fails before any ID is drawn.
    let name_path = resolve_single(template, &rules.name_target, &rules.value_key)?;
    let id_path = resolve_single(template, &rules.id_target, &rules.value_key)?;

    let mut clone = template.clone();

    set_value(&mut clone, &name_path, &rules.value_key, identifier.clone());

    let unique_id = ids.new_id();
    set_value(&mut clone, &id_path, &rules.value_key, unique_id.clone());

    for target in &rules.substring_targets {
        let paths: Vec<NodePath> = find_all(&clone, &target.pattern)
            .into_iter()
            .map(|m| m.path)
            .take(match target.mode {
                MatchMode::First => 1,
                MatchMode::All => usize::MAX,
            })
            .collect();

        for path in paths {
            if let Some(node) = node_at_mut(&mut clone, &path) {
                replace_in_attribute(node, &rules.value_key, &base.full, &identifier);
            }
        }
    }

    if rules.label_clones {
        // stored the way the parser reads text back
        let label = identifier.trim();
        clone.text = (!label.is_empty()).then(|| label.to_string());
    }

    Ok(ExpandedVariant {
        node: clone,
        identifier,
        unique_id,
    })
}

/// Replace every occurrence of `from` in attribute `key`; absent key is a no-op
fn replace_in_attribute(node: &mut Node, key: &str, from: &str, to: &str) {
    if from.is_empty() {
        return;
    }
    let Some(value) = node.attribute(key) else {
        return;
    };
    if value.contains(from) {
        let replaced = value.replace(from, to);
        node.set_attribute(key, replaced);
    }
}

fn resolve_single(template: &Node, pattern: &Pattern, key: &str) -> Result<NodePath, RewriteError> {
    let mut matches = find_all(template, pattern);
    match matches.len() {
        0 => Err(missing(pattern, key)),
        1 => Ok(matches.remove(0).path),
        count => Err(RewriteError::AttributeAmbiguous {
            target: pattern.to_string(),
            count,
        }),
    }
}

fn set_value(root: &mut Node, path: &NodePath, key: &str, value: String) {
    if let Some(node) = node_at_mut(root, path) {
        node.set_attribute(key, value);
    }
}

fn missing(pattern: &Pattern, key: &str) -> RewriteError {
    RewriteError::AttributeMissing {
        target: pattern.to_string(),
        key: key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsxgen_parser::parse;

    const TEMPLATE: &str = r#"
        <node id="Resource">
            <attribute id="ID" type="FixedString" value="0b1c0c3c-6bd8-4f58-8d2c-0c2e6b0b8d11" />
            <attribute id="Name" type="LSString" value="HUM_F_Basis" />
            <attribute id="SourceFile" type="LSString" value="Generated/Public/Mod/HUM_F_Basis.GR2" />
            <attribute id="Template" type="FixedString" value="HUM_F_Basis.Dummy_Root.0" />
            <children>
                <node id="Objects">
                    <attribute id="ObjectID" type="FixedString" value="HUM_F_Basis.HUM_F_Basis_Mesh.0" />
                </node>
                <node id="Objects">
                    <attribute id="ObjectID" type="FixedString" value="HUM_F_Basis.Hair.1" />
                </node>
                <node id="Objects">
                    <attribute id="ObjectID" type="FixedString" value="Shared.Unrelated.2" />
                </node>
            </children>
        </node>"#;

    fn template() -> Node {
        parse(TEMPLATE).unwrap().root
    }

    fn value_of<'a>(node: &'a Node, attr_id: &str) -> &'a str {
        node.descendants()
            .find(|n| n.tag == "attribute" && n.attribute("id") == Some(attr_id))
            .and_then(|n| n.attribute("value"))
            .unwrap()
    }

    #[test]
    fn test_sanitize_variant_name() {
        assert_eq!(sanitize_variant_name("Slim"), "Slim");
        assert_eq!(sanitize_variant_name("Very Slim-2"), "Very_Slim_2");
        assert_eq!(sanitize_variant_name("Größe"), "Gr__e");
        assert_eq!(sanitize_variant_name("a.b/c"), "a_b_c");
        assert_eq!(sanitize_variant_name("keep_Under_9"), "keep_Under_9");
    }

    #[test]
    fn test_variant_identifier() {
        assert_eq!(variant_identifier("HUM_F", "Slim"), "HUM_F_Slim");
        assert_eq!(variant_identifier("HUM_F", "Extra Heavy"), "HUM_F_Extra_Heavy");
    }

    #[test]
    fn test_derive_base_strips_exact_suffix() {
        let base = derive_base_identifier(&template(), &RewriteRules::default()).unwrap();
        assert_eq!(base.full, "HUM_F_Basis");
        assert_eq!(base.short, "HUM_F");
    }

    #[test]
    fn test_derive_base_does_not_trim_character_set() {
        // Trimming the characters of "_Basis" one by one would eat into "Bias".
        let node = Node::new("node").with_child(
            Node::new("attribute")
                .with_attribute("id", "Name")
                .with_attribute("value", "ELF_Bias"),
        );
        let base = derive_base_identifier(&node, &RewriteRules::default()).unwrap();
        assert_eq!(base.short, "ELF_Bias");

        let node = Node::new("node").with_child(
            Node::new("attribute")
                .with_attribute("id", "Name")
                .with_attribute("value", "DGB_Sis_Basis"),
        );
        let base = derive_base_identifier(&node, &RewriteRules::default()).unwrap();
        assert_eq!(base.short, "DGB_Sis");
    }

    #[test]
    fn test_derive_base_missing_name() {
        let node = Node::new("node");
        let err = derive_base_identifier(&node, &RewriteRules::default()).unwrap_err();
        assert!(matches!(err, RewriteError::AttributeMissing { .. }));

        let node = Node::new("node")
            .with_child(Node::new("attribute").with_attribute("id", "Name"));
        let err = derive_base_identifier(&node, &RewriteRules::default()).unwrap_err();
        assert!(matches!(err, RewriteError::AttributeMissing { .. }));
    }

    #[test]
    fn test_expand_rewrites_all_targets() {
        let template = template();
        let rules = RewriteRules::default();
        let base = derive_base_identifier(&template, &rules).unwrap();
        let mut ids = IDGenerator::new();

        let expanded = expand_variant(&template, "Slim", &base, &rules, &mut ids).unwrap();
        let clone = &expanded.node;

        assert_eq!(expanded.identifier, "HUM_F_Slim");
        assert_eq!(value_of(clone, "Name"), "HUM_F_Slim");
        assert_eq!(value_of(clone, "ID"), expanded.unique_id);
        assert_ne!(value_of(clone, "ID"), "0b1c0c3c-6bd8-4f58-8d2c-0c2e6b0b8d11");
        assert_eq!(
            value_of(clone, "SourceFile"),
            "Generated/Public/Mod/HUM_F_Slim.GR2"
        );
        assert_eq!(value_of(clone, "Template"), "HUM_F_Slim.Dummy_Root.0");

        let objects: Vec<_> = clone
            .descendants()
            .filter(|n| n.attribute("id") == Some("ObjectID"))
            .map(|n| n.attribute("value").unwrap())
            .collect();
        assert_eq!(
            objects,
            vec![
                "HUM_F_Slim.HUM_F_Slim_Mesh.0",
                "HUM_F_Slim.Hair.1",
                "Shared.Unrelated.2"
            ]
        );
        assert_eq!(clone.text.as_deref(), Some("HUM_F_Slim"));
    }

    #[test]
    fn test_expand_leaves_template_untouched() {
        let template = template();
        let before = template.clone();
        let rules = RewriteRules::default();
        let base = derive_base_identifier(&template, &rules).unwrap();
        let mut ids = IDGenerator::new();

        expand(&template, "Slim", &base, &rules, &mut ids).unwrap();
        expand(&template, "Heavy", &base, &rules, &mut ids).unwrap();

        assert_eq!(template, before);
    }

    #[test]
    fn test_expand_preserves_other_attributes() {
        let template = template();
        let rules = RewriteRules::default();
        let base = derive_base_identifier(&template, &rules).unwrap();
        let clone = expand(&template, "Slim", &base, &rules, &mut IDGenerator::new()).unwrap();

        let name = clone.children.iter().find(|n| n.attribute("id") == Some("Name")).unwrap();
        let keys: Vec<_> = name.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(keys, vec!["id", "type", "value"]);
        assert_eq!(name.attribute("type"), Some("LSString"));
        assert_eq!(clone.subtree_len(), template.subtree_len());
    }

    #[test]
    fn test_substring_without_base_is_unchanged() {
        let template = Node::new("node")
            .with_child(Node::new("attribute").with_attribute("id", "ID").with_attribute("value", "x"))
            .with_child(
                Node::new("attribute")
                    .with_attribute("id", "Name")
                    .with_attribute("value", "HUM_F_Basis"),
            )
            .with_child(
                Node::new("attribute")
                    .with_attribute("id", "SourceFile")
                    .with_attribute("value", "Generated/hum_f_basis.GR2"),
            );
        let rules = RewriteRules::default();
        let base = derive_base_identifier(&template, &rules).unwrap();
        let clone = expand(&template, "Slim", &base, &rules, &mut IDGenerator::new()).unwrap();

        // case-sensitive: lowercase spelling is not the base identifier
        assert_eq!(value_of(&clone, "SourceFile"), "Generated/hum_f_basis.GR2");
    }

    #[test]
    fn test_missing_substring_targets_are_fine() {
        let template = Node::new("node")
            .with_child(Node::new("attribute").with_attribute("id", "ID").with_attribute("value", "x"))
            .with_child(
                Node::new("attribute")
                    .with_attribute("id", "Name")
                    .with_attribute("value", "HUM_F_Basis"),
            );
        let rules = RewriteRules::default();
        let base = derive_base_identifier(&template, &rules).unwrap();
        let clone = expand(&template, "Slim", &base, &rules, &mut IDGenerator::new()).unwrap();
        assert_eq!(value_of(&clone, "Name"), "HUM_F_Slim");
    }

    #[test]
    fn test_missing_id_attribute_fails() {
        let template = Node::new("node").with_child(
            Node::new("attribute")
                .with_attribute("id", "Name")
                .with_attribute("value", "HUM_F_Basis"),
        );
        let rules = RewriteRules::default();
        let base = derive_base_identifier(&template, &rules).unwrap();
        let mut ids = IDGenerator::new();
        let err = expand(&template, "Slim", &base, &rules, &mut ids).unwrap_err();

        assert!(matches!(err, RewriteError::AttributeMissing { ref target, .. } if target.contains("ID")));
        assert_eq!(ids.issued_count(), 0);
    }

    #[test]
    fn test_ambiguous_name_fails() {
        let name = Node::new("attribute")
            .with_attribute("id", "Name")
            .with_attribute("value", "HUM_F_Basis");
        let template = Node::new("node").with_child(name.clone()).with_child(name);
        let err = derive_base_identifier(&template, &RewriteRules::default()).unwrap_err();
        assert_eq!(
            err,
            RewriteError::AttributeAmbiguous {
                target: r#"attribute[@id="Name"]"#.to_string(),
                count: 2
            }
        );
    }

    #[test]
    fn test_unlabelled_clone_keeps_text() {
        let template = template();
        let rules = RewriteRules {
            label_clones: false,
            ..RewriteRules::default()
        };
        let base = derive_base_identifier(&template, &rules).unwrap();
        let clone = expand(&template, "Slim", &base, &rules, &mut IDGenerator::new()).unwrap();
        assert_eq!(clone.text, None);
    }

    #[test]
    fn test_name_without_suffix_is_used_whole() {
        let template = Node::new("node")
            .with_child(Node::new("attribute").with_attribute("id", "ID").with_attribute("value", "x"))
            .with_child(
                Node::new("attribute")
                    .with_attribute("id", "Name")
                    .with_attribute("value", "HUM_F_Body"),
            );
        let rules = RewriteRules::default();
        let base = derive_base_identifier(&template, &rules).unwrap();
        let clone = expand(&template, "Slim", &base, &rules, &mut IDGenerator::new()).unwrap();
        assert_eq!(value_of(&clone, "Name"), "HUM_F_Body_Slim");
    }

    #[test]
    fn test_label_trimmed_like_parsed_text() {
        let template = parse(
            r#"<node id="Resource">
                <attribute id="ID" value="x" />
                <attribute id="Name" value=" HUM_F_Basis" />
            </node>"#,
        )
        .unwrap()
        .root;
        let rules = RewriteRules::default();
        let base = derive_base_identifier(&template, &rules).unwrap();

        let clone = expand(&template, "Slim", &base, &rules, &mut IDGenerator::new()).unwrap();
        assert_eq!(value_of(&clone, "Name"), " HUM_F_Slim");
        assert_eq!(clone.text.as_deref(), Some("HUM_F_Slim"));
    }
}
