//! Minimal XML element tree used by the XML normalizer.
//!
//! Parsing sits behind [`XmlParser`] so callers can substitute their own
//! parser; [`QuickXmlParser`] is the default, built on `quick_xml`'s event
//! reader.

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    /// Text of the first child node, if that node is text.
    pub fn first_text(&self) -> Option<&str> {
        match self.first_child()? {
            Node::Text(text) => Some(text.as_str()),
            Node::Element(_) => None,
        }
    }

    /// First descendant (not self) named `name`, in document order.
    pub fn first_descendant(&self, name: &str) -> Option<&Element> {
        for child in self.child_elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.first_descendant(name) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        // Adjacent text, CDATA and entity pieces form a single text node
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }
}

/// Turns raw response text into an element tree, or a diagnostic message.
pub trait XmlParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<Element, String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QuickXmlParser;

impl XmlParser for QuickXmlParser {
    fn parse(&self, text: &str) -> Result<Element, String> {
        let mut reader = Reader::from_str(text);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = utf8(e.name().as_ref())?;
                    if stack.is_empty() && root.is_some() {
                        return Err(format!("unexpected element <{name}> after the root element"));
                    }
                    stack.push(Element::new(name));
                }
                Ok(Event::Empty(e)) => {
                    let element = Element::new(utf8(e.name().as_ref())?);
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(e)) => {
                    let name = utf8(e.name().as_ref())?;
                    let element = stack
                        .pop()
                        .ok_or_else(|| format!("unexpected closing tag </{name}>"))?;
                    if element.name != name {
                        return Err(format!(
                            "closing tag </{name}> does not match <{}>",
                            element.name
                        ));
                    }
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(e)) => {
                    let raw = utf8(&e)?;
                    let value = unescape(&raw).map_err(|err| err.to_string())?;
                    push_text(&mut stack, &value)?;
                }
                Ok(Event::CData(e)) => {
                    let value = utf8(&e)?;
                    push_text(&mut stack, &value)?;
                }
                Ok(Event::GeneralRef(e)) => {
                    let entity = utf8(&e)?;
                    let value = resolve_reference(&entity)
                        .ok_or_else(|| format!("unknown entity &{entity};"))?;
                    push_text(&mut stack, &value)?;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(format!("{} at position {}", e, reader.error_position()));
                }
                // Declarations, comments, processing instructions and doctypes carry no rows
                _ => (),
            }
        }

        if let Some(open) = stack.last() {
            return Err(format!("unclosed element <{}>", open.name));
        }
        root.ok_or_else(|| "no root element found".to_string())
    }
}

fn utf8(bytes: &[u8]) -> Result<String, String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| e.to_string())
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_some() => {
            return Err(format!(
                "unexpected element <{}> after the root element",
                element.name
            ));
        }
        None => *root = Some(element),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.push_text(text),
        None if text.trim().is_empty() => {}
        None => return Err("text content outside the root element".to_string()),
    }
    Ok(())
}

fn resolve_reference(entity: &str) -> Option<String> {
    if let Some(code) = entity.strip_prefix('#') {
        let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse::<u32>().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    resolve_predefined_entity(entity).map(str::to_string)
}
