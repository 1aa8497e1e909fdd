use crate::ast::*;
use quick_xml::escape::escape;

/// Serializer converts a document tree back to markup
///
/// Output is deterministic for a given tree:
/// - the declaration header always comes first
/// - attribute and child order follow the tree
/// - one element per line, indented by nesting depth
/// - elements without children or text are self-closed
///
/// Source whitespace is not preserved; reparsing the output and serializing
/// again yields the same bytes.
pub struct Serializer {
    indent_level: usize,
    indent_string: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_string: "\t".to_string(),
        }
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent_level: 0,
            indent_string: indent.to_string(),
        }
    }

    /// Serialize a Document including its declaration
    pub fn serialize(&mut self, doc: &Document) -> String {
        let mut output = String::new();
        self.serialize_declaration(&doc.declaration, &mut output);
        output.push('\n');
        self.indent_level = 0;
        self.serialize_node(&doc.root, &mut output);
        output
    }

    /// Serialize a single subtree without declaration
    pub fn serialize_fragment(&mut self, node: &Node) -> String {
        let mut output = String::new();
        self.indent_level = 0;
        self.serialize_node(node, &mut output);
        output
    }

    fn serialize_declaration(&self, decl: &Declaration, output: &mut String) {
        output.push_str("<?xml version=\"");
        output.push_str(&escape(decl.version.as_str()));
        output.push_str("\" encoding=\"");
        output.push_str(&escape(decl.encoding.as_str()));
        output.push('"');
        if let Some(standalone) = &decl.standalone {
            output.push_str(" standalone=\"");
            output.push_str(&escape(standalone.as_str()));
            output.push('"');
        }
        output.push_str("?>");
    }

    fn serialize_node(&mut self, node: &Node, output: &mut String) {
        self.write_indent(output);
        output.push('<');
        output.push_str(&node.tag);
        for attr in &node.attributes {
            output.push(' ');
            output.push_str(&attr.name);
            output.push_str("=\"");
            output.push_str(&escape(attr.value.as_str()));
            output.push('"');
        }

        match (&node.text, node.children.is_empty()) {
            (None, true) => {
                output.push_str(" />\n");
            }
            (Some(text), true) => {
                output.push('>');
                output.push_str(&escape(text.as_str()));
                output.push_str("</");
                output.push_str(&node.tag);
                output.push_str(">\n");
            }
            (text, false) => {
                output.push_str(">\n");
                self.indent_level += 1;

                if let Some(text) = text {
                    self.write_indent(output);
                    output.push_str(&escape(text.as_str()));
                    output.push('\n');
                }

                for child in &node.children {
                    self.serialize_node(child, output);
                }

                self.indent_level -= 1;
                self.write_indent(output);
                output.push_str("</");
                output.push_str(&node.tag);
                output.push_str(">\n");
            }
        }
    }

    fn write_indent(&self, output: &mut String) {
        for _ in 0..self.indent_level {
            output.push_str(&self.indent_string);
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to serialize a document
pub fn serialize(doc: &Document) -> String {
    let mut serializer = Serializer::new();
    serializer.serialize(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_declaration_first() {
        let doc = Document::new(Node::new("save"));
        let output = serialize(&doc);
        assert_eq!(
            output,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<save />\n"
        );
    }

    #[test]
    fn test_serialize_nested_with_tabs() {
        let root = Node::new("save").with_child(
            Node::new("region")
                .with_attribute("id", "VisualBank")
                .with_child(Node::new("node").with_attribute("id", "VisualBank")),
        );
        let output = serialize(&Document::new(root));

        let expected = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
                        <save>\n\
                        \t<region id=\"VisualBank\">\n\
                        \t\t<node id=\"VisualBank\" />\n\
                        \t</region>\n\
                        </save>\n";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_serialize_escapes_values() {
        let root = Node::new("attribute")
            .with_attribute("value", "a<b & \"c\"")
            .with_text("x > y");
        let output = Serializer::new().serialize_fragment(&root);
        assert_eq!(
            output,
            "<attribute value=\"a&lt;b &amp; &quot;c&quot;\">x &gt; y</attribute>\n"
        );
    }

    #[test]
    fn test_serialize_text_before_children() {
        let root = Node::new("node")
            .with_text("HUM_F_Slim")
            .with_child(Node::new("attribute"));
        let output = Serializer::with_indent("  ").serialize_fragment(&root);
        assert_eq!(output, "<node>\n  HUM_F_Slim\n  <attribute />\n</node>\n");
    }

    #[test]
    fn test_standalone_written_when_present() {
        let mut doc = Document::new(Node::new("save"));
        doc.declaration.standalone = Some("yes".to_string());
        let output = serialize(&doc);
        assert!(output.starts_with(
            "<?xml version=\"1.0\" encoding=\"utf-8\" standalone=\"yes\"?>\n"
        ));
    }
}
