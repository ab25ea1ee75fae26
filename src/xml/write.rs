//! Serialization: every node is written from the raw pieces it was parsed
//! from, so untouched parts of the document come out unchanged.

use super::tree::{Attribute, Document, Element, Node};
use std::fmt;

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bom {
            f.write_str("\u{feff}")?;
        }
        for node in &self.prolog {
            write!(f, "{}", node)?;
        }
        write!(f, "{}", self.root)?;
        for node in &self.epilog {
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Element(element) => write!(f, "{}", element),
            Node::Text(text) => f.write_str(text),
            Node::Comment(text) => write!(f, "<!--{}-->", text),
            Node::CData(text) => write!(f, "<![CDATA[{}]]>", text),
            Node::ProcessingInstruction(text) | Node::Declaration(text) => {
                write!(f, "<?{}?>", text)
            }
            Node::DocType(markup) => f.write_str(markup),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}{}",
            self.lead, self.name, self.eq, self.quote, self.raw, self.quote
        )
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for attr in &self.attributes {
            write!(f, "{}", attr)?;
        }

        if self.children.is_empty() && self.self_closing {
            return write!(f, "{}/>", self.tag_tail);
        }

        // An element that was `<x />` and gained children drops the space.
        if !self.self_closing {
            f.write_str(&self.tag_tail)?;
        }
        f.write_str(">")?;
        for child in &self.children {
            write!(f, "{}", child)?;
        }
        write!(f, "</{}>", self.name)
    }
}
