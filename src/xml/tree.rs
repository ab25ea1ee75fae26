use super::INDENT_UNIT;
use quick_xml::escape::{escape, unescape};
use std::borrow::Cow;

/// A parsed XML document: the root element plus whatever surrounds it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The source started with a UTF-8 byte order mark.
    pub(crate) bom: bool,
    /// Declaration, comments and whitespace before the root element.
    pub(crate) prolog: Vec<Node>,
    pub(crate) root: Element,
    /// Comments and whitespace after the root element.
    pub(crate) epilog: Vec<Node>,
}

impl Document {
    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }
}

/// A node in the tree.
///
/// Character data is stored exactly as it appeared in the source, entity
/// references included.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    CData(String),
    ProcessingInstruction(String),
    /// `<?xml ...?>`, content between `<?` and `?>`.
    Declaration(String),
    /// The whole `<!DOCTYPE ...>` markup as written.
    DocType(String),
}

impl Node {
    /// Returns `true` for a text node containing only whitespace.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Node::Text(text) if text.trim().is_empty())
    }
}

/// An attribute together with the layout it had in the source tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Whitespace between the previous token and the attribute name.
    pub(crate) lead: String,
    pub(crate) name: String,
    /// `=` and any whitespace around it.
    pub(crate) eq: String,
    pub(crate) quote: char,
    /// Escaped value, without quotes.
    pub(crate) raw: String,
}

impl Attribute {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            lead: " ".to_string(),
            name: name.to_string(),
            eq: "=".to_string(),
            quote: '"',
            raw: escape(value).into_owned(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unescaped value. Falls back to the raw text if it holds an entity
    /// reference quick-xml does not know.
    pub fn value(&self) -> Cow<'_, str> {
        unescape(&self.raw).unwrap_or(Cow::Borrowed(self.raw.as_str()))
    }

    pub fn set_value(&mut self, value: &str) {
        self.raw = escape(value).into_owned();
    }
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub(crate) name: String,
    pub(crate) attributes: Vec<Attribute>,
    /// Whitespace between the last attribute and `>` or `/>`.
    pub(crate) tag_tail: String,
    pub(crate) children: Vec<Node>,
    /// Written as `<name/>` while it has no children.
    pub(crate) self_closing: bool,
}

impl Element {
    /// Creates an empty, self-closing element.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            tag_tail: String::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    /// Builder-style [`Element::set_attribute`].
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<Cow<'_, str>> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(Attribute::value)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// Sets an attribute value, appending the attribute if it is missing.
    ///
    /// An existing attribute keeps its position and layout. A new one goes
    /// after all existing attributes and follows their layout: on its own
    /// line if the last attribute is, separated by a single space otherwise.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        if let Some(attr) = self.attributes.iter_mut().find(|a| a.name == name) {
            attr.set_value(value);
            return;
        }

        let mut attr = Attribute::new(name, value);
        if let Some(last) = self.attributes.last() {
            if last.lead.contains('\n') {
                attr.lead = last.lead.clone();
            }
        }
        self.attributes.push(attr);
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Direct child elements with the given name, in document order.
    pub fn child_elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    pub fn child_elements_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> + 'a {
        self.children.iter_mut().filter_map(move |node| match node {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// Child node indices of the direct child elements named `name`.
    pub fn child_element_indices(&self, name: &str) -> Vec<usize> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node, Node::Element(e) if e.name == name))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn child_element_at_mut(&mut self, index: usize) -> Option<&mut Element> {
        match self.children.get_mut(index) {
            Some(Node::Element(e)) => Some(e),
            _ => None,
        }
    }

    /// Visits every element below this one, depth first.
    pub fn visit_descendants_mut<F: FnMut(&mut Element)>(&mut self, f: &mut F) {
        for node in &mut self.children {
            if let Node::Element(e) = node {
                f(e);
                e.visit_descendants_mut(f);
            }
        }
    }

    /// Line break and indentation in front of the child at `index`, such as
    /// `"\n    "` or `"\r\n  "`. A child that does not start its own line gets
    /// a bare line break.
    pub fn break_before(&self, index: usize) -> String {
        let prev = index.checked_sub(1).and_then(|i| self.children.get(i));
        if let Some(Node::Text(text)) = prev {
            if let Some(pos) = text.rfind('\n') {
                if text[pos + 1..].trim().is_empty() {
                    let start = if text[..pos].ends_with('\r') { pos - 1 } else { pos };
                    return text[start..].to_string();
                }
            }
        }
        self.line_ending().to_string()
    }

    /// `"\r\n"` when the whitespace between children uses CRLF.
    pub fn line_ending(&self) -> &'static str {
        let crlf = self
            .children
            .iter()
            .any(|node| matches!(node, Node::Text(text) if text.contains("\r\n")));
        if crlf { "\r\n" } else { "\n" }
    }

    /// Leading whitespace of the first child when it can serve as the
    /// separator in front of a new child. A bare line break does not count.
    pub fn child_indent(&self) -> Option<String> {
        match self.children.first() {
            Some(Node::Text(text)) => {
                let indent = &text[..text.len() - text.trim_start().len()];
                if indent.trim_matches(['\n', '\r']).is_empty() {
                    None
                } else {
                    Some(indent.to_string())
                }
            }
            _ => None,
        }
    }

    fn separator(&self, own_break: &str) -> String {
        self.child_indent()
            .unwrap_or_else(|| format!("{}{}", own_break, INDENT_UNIT))
    }

    /// Inserts `element` as the first child, preceded by the indentation the
    /// existing children use. `own_break` is the line break and indentation
    /// in front of `self`, as returned by [`Element::break_before`].
    pub fn insert_child_first(&mut self, element: Element, own_break: &str) {
        let separator = self.separator(own_break);
        if self.children.is_empty() {
            self.children.push(Node::Text(separator));
            self.children.push(Node::Element(element));
            self.children.push(Node::Text(own_break.to_string()));
        } else {
            self.children.insert(0, Node::Element(element));
            self.children.insert(0, Node::Text(separator));
        }
    }

    /// Appends `element` after the last child, keeping the whitespace that
    /// lines up the closing tag at the end.
    pub fn append_child(&mut self, element: Element, own_break: &str) {
        let separator = self.separator(own_break);
        match self.children.last() {
            Some(last) if last.is_whitespace() => {
                let at = self.children.len() - 1;
                self.children.insert(at, Node::Element(element));
                self.children.insert(at, Node::Text(separator));
            }
            _ => {
                self.children.push(Node::Text(separator));
                self.children.push(Node::Element(element));
                self.children.push(Node::Text(own_break.to_string()));
            }
        }
    }
}
