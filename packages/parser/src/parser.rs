use crate::ast::{Attribute, Declaration, Document, Node};
use crate::error::{ParseError, ParseResult};
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Reader;

/// Parser for LSX / generic XML markup
///
/// Builds an owned [`Node`] tree from the quick-xml event stream. Comments,
/// processing instructions and doctype declarations are dropped;
/// whitespace-only text between elements is treated as formatting.
///
/// Mixed content is lossy: text runs on either side of a child element are
/// trimmed and joined with a single space into the parent's `text`.
pub struct Parser<'src> {
    reader: Reader<&'src [u8]>,
    declaration: Option<Declaration>,
    stack: Vec<Node>,
    root: Option<Node>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        let mut reader = Reader::from_str(source);
        reader.config_mut().check_end_names = true;

        Self {
            reader,
            declaration: None,
            stack: Vec::new(),
            root: None,
        }
    }

    /// Parse a complete document
    pub fn parse_document(mut self) -> ParseResult<Document> {
        loop {
            let pos = self.position();
            let event = self
                .reader
                .read_event()
                .map_err(|e| ParseError::malformed(pos, e.to_string()))?;

            match event {
                Event::Decl(decl) => {
                    self.declaration = Some(read_declaration(&decl, pos)?);
                }
                Event::Start(start) => {
                    let node = open_element(&start, pos)?;
                    self.stack.push(node);
                }
                Event::Empty(start) => {
                    let node = open_element(&start, pos)?;
                    self.close_element(node, pos)?;
                }
                Event::End(end) => {
                    let node = match self.stack.pop() {
                        Some(node) => node,
                        None => {
                            let name = utf8(end.name().as_ref(), pos)?;
                            return Err(ParseError::unexpected_close(pos, name));
                        }
                    };
                    self.close_element(node, pos)?;
                }
                Event::Text(text) => {
                    let value = text
                        .unescape()
                        .map_err(|e| ParseError::malformed(pos, e.to_string()))?;
                    self.push_text(&value, pos)?;
                }
                Event::CData(data) => {
                    let value = utf8(&data, pos)?;
                    self.push_text(&value, pos)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(ParseError::unexpected_eof(self.position(), open.tag.clone()));
        }

        let root = self.root.ok_or(ParseError::MissingRoot)?;

        Ok(Document {
            declaration: self.declaration.unwrap_or_default(),
            root,
        })
    }

    fn position(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    fn close_element(&mut self, node: Node, pos: usize) -> ParseResult<()> {
        match self.stack.last_mut() {
            Some(parent) => {
                parent.children.push(node);
                Ok(())
            }
            None if self.root.is_some() => Err(ParseError::multiple_roots(pos, node.tag)),
            None => {
                self.root = Some(node);
                Ok(())
            }
        }
    }

    fn push_text(&mut self, value: &str, pos: usize) -> ParseResult<()> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        let node = self
            .stack
            .last_mut()
            .ok_or(ParseError::StrayText { pos })?;

        match &mut node.text {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(trimmed);
            }
            None => node.text = Some(trimmed.to_string()),
        }
        Ok(())
    }
}

fn open_element(start: &BytesStart<'_>, pos: usize) -> ParseResult<Node> {
    let mut node = Node::new(utf8(start.name().as_ref(), pos)?);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| ParseError::malformed(pos, e.to_string()))?;
        let name = utf8(attr.key.as_ref(), pos)?;
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::malformed(pos, e.to_string()))?
            .into_owned();
        node.attributes.push(Attribute { name, value });
    }

    Ok(node)
}

fn read_declaration(decl: &BytesDecl<'_>, pos: usize) -> ParseResult<Declaration> {
    let defaults = Declaration::default();

    let version = decl
        .version()
        .map_err(|e| ParseError::malformed(pos, e.to_string()))?;
    let encoding = match decl.encoding() {
        Some(encoding) => {
            let encoding = encoding.map_err(|e| ParseError::malformed(pos, e.to_string()))?;
            let encoding = utf8(&encoding, pos)?;
            // output is always written as UTF-8
            if !is_utf8_label(&encoding) {
                return Err(ParseError::malformed(
                    pos,
                    format!("unsupported encoding {:?}, only UTF-8 is accepted", encoding),
                ));
            }
            encoding
        }
        None => defaults.encoding,
    };
    let standalone = match decl.standalone() {
        Some(standalone) => {
            let standalone =
                standalone.map_err(|e| ParseError::malformed(pos, e.to_string()))?;
            Some(utf8(&standalone, pos)?)
        }
        None => None,
    };

    Ok(Declaration {
        version: utf8(&version, pos)?,
        encoding,
        standalone,
    })
}

fn is_utf8_label(encoding: &str) -> bool {
    encoding.eq_ignore_ascii_case("utf-8") || encoding.eq_ignore_ascii_case("utf8")
}

fn utf8(bytes: &[u8], pos: usize) -> ParseResult<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| ParseError::malformed(pos, e.to_string()))
}

/// Parse markup source into a [`Document`]
pub fn parse(source: &str) -> ParseResult<Document> {
    Parser::new(source).parse_document()
}

/// Parse raw file contents; bytes that are not UTF-8 are malformed markup
pub fn parse_bytes(bytes: &[u8]) -> ParseResult<Document> {
    let source = std::str::from_utf8(bytes).map_err(|e| {
        ParseError::malformed(e.valid_up_to(), format!("invalid UTF-8: {}", e))
    })?;
    parse(source)
}
