/// Tests to verify the serializer output survives a reload unchanged
use crate::*;

const BANK: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<save>
    <version major="4" minor="0" revision="9" build="322" />
    <region id="VisualBank">
        <node id="VisualBank">
            <children>
                <node id="Resource">
                    <attribute id="ID" type="FixedString" value="0b1c0c3c-6bd8-4f58-8d2c-0c2e6b0b8d11" />
                    <attribute id="Name" type="LSString" value="HUM_F_Basis" />
                    <attribute id="SourceFile" type="LSString" value="Generated/Public/Mod/Assets/HUM_F_Basis.GR2" />
                    <attribute id="Template" type="FixedString" value="HUM_F_Basis.Dummy_Root.0" />
                    <children>
                        <node id="Objects">
                            <attribute id="LOD" type="uint8" value="0" />
                            <attribute id="ObjectID" type="FixedString" value="HUM_F_Basis.HUM_F_Basis_Mesh.0" />
                        </node>
                    </children>
                </node>
            </children>
        </node>
    </region>
</save>"#;

#[test]
fn test_reload_is_byte_identical() {
    let doc = parse(BANK).expect("Failed to parse");
    let first = serialize(&doc);
    let reparsed = parse(&first).expect("Failed to reparse");
    let second = serialize(&reparsed);

    assert_eq!(first, second);
    assert_eq!(doc, reparsed);
}

#[test]
fn test_reload_with_text_and_escapes() {
    let source = r#"<save><node id="a &amp; b">  Label &lt;1&gt;
        <attribute value="'quoted'"/></node><leaf>inline</leaf></save>"#;

    let doc = parse(source).unwrap();
    assert_eq!(doc.root.children[0].text.as_deref(), Some("Label <1>"));

    let first = serialize(&doc);
    let second = serialize(&parse(&first).unwrap());
    assert_eq!(first, second);
}

#[test]
fn test_declaration_preserved() {
    let source = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?><save/>"#;
    let doc = parse(source).unwrap();
    let output = serialize(&doc);

    assert!(output.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#));
    assert_eq!(parse(&output).unwrap().declaration, doc.declaration);
}

#[test]
fn test_custom_indent_roundtrip() {
    let doc = parse(BANK).unwrap();
    let output = Serializer::with_indent("    ").serialize(&doc);
    assert!(output.contains("\n    <region id=\"VisualBank\">\n"));
    assert_eq!(parse(&output).unwrap(), doc);
}

#[test]
fn test_json_shape_of_tree() {
    let doc = parse(r#"<a id="1"><b/></a>"#).unwrap();
    let json = serde_json::to_string(&doc.root).unwrap();
    assert!(json.contains(r#""tag":"a""#));
    assert!(json.contains(r#""name":"id""#));
}
