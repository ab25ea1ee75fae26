//! `quick-xml` event stream to [`Document`].

use super::tree::{Attribute, Document, Element, Node};
use crate::error::{FixerError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::str::FromStr;

impl FromStr for Document {
    type Err = FixerError;

    fn from_str(xml: &str) -> Result<Self> {
        parse_document(xml)
    }
}

fn parse_document(xml: &str) -> Result<Document> {
    let (bom, xml) = match xml.strip_prefix('\u{feff}') {
        Some(rest) => (true, rest),
        None => (false, xml),
    };
    let mut reader = Reader::from_str(xml);
    let mut builder = TreeBuilder {
        bom,
        ..TreeBuilder::default()
    };

    loop {
        let start = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(tag) => builder.open(element_from_tag(&tag, false)?),
            Event::Empty(tag) => builder.add(Node::Element(element_from_tag(&tag, true)?))?,
            Event::End(_) => builder.close()?,
            Event::Text(text) => builder.add(Node::Text(lossy(&text)))?,
            Event::CData(data) => builder.add(Node::CData(lossy(&data)))?,
            Event::Comment(text) => builder.add(Node::Comment(lossy(&text)))?,
            Event::Decl(decl) => builder.add(Node::Declaration(lossy(&decl)))?,
            Event::PI(pi) => builder.add(Node::ProcessingInstruction(lossy(&pi)))?,
            Event::DocType(text) => {
                let end = reader.buffer_position() as usize;
                let markup = xml
                    .get(start..end)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("<!DOCTYPE {}>", lossy(&text)));
                builder.add(Node::DocType(markup))?
            }
            Event::Eof => break,
        }
    }

    builder.finish()
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Builds an [`Element`] from a start tag, remembering the whitespace in
/// front of each attribute and the quote it was written with.
fn element_from_tag(tag: &BytesStart, self_closing: bool) -> Result<Element> {
    let raw = lossy(&tag[..]);
    let name = lossy(tag.name().as_ref());
    let mut element = Element::new(&name);
    element.self_closing = self_closing;

    let mut cursor = name.len();
    for attr in tag.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = lossy(attr.key.as_ref());
        let value = lossy(&attr.value);

        let rest = &raw[cursor..];
        let lead_len = rest.len() - rest.trim_start().len();
        let after_key = &rest[lead_len + key.len()..];
        let quote_at = after_key.find(['"', '\'']).ok_or_else(|| {
            FixerError::InvalidManifest(format!("unquoted value for attribute '{}'", key))
        })?;
        let quote = after_key[quote_at..].chars().next().unwrap_or('"');

        element.attributes.push(Attribute {
            lead: rest[..lead_len].to_string(),
            name: key.clone(),
            eq: after_key[..quote_at].to_string(),
            quote,
            raw: value.clone(),
        });

        // lead + key + `=` with spacing + quotes + value
        cursor += lead_len + key.len() + quote_at + 1 + value.len() + 1;
    }

    element.tag_tail = raw.get(cursor..).unwrap_or_default().to_string();
    Ok(element)
}

/// Stack of open elements. Closed elements attach to their parent, or
/// become the root when the stack is empty.
#[derive(Default)]
struct TreeBuilder {
    bom: bool,
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn open(&mut self, element: Element) {
        self.open.push(element);
    }

    fn close(&mut self) -> Result<()> {
        let element = self.open.pop().ok_or_else(|| {
            FixerError::InvalidManifest("closing tag without matching start tag".to_string())
        })?;
        self.add(Node::Element(element))
    }

    fn add(&mut self, node: Node) -> Result<()> {
        if let Some(parent) = self.open.last_mut() {
            push_merging_text(&mut parent.children, node);
            return Ok(());
        }

        match node {
            Node::Element(element) => {
                if self.root.is_some() {
                    return Err(FixerError::InvalidManifest(format!(
                        "second root element <{}>",
                        element.name
                    )));
                }
                self.root = Some(element);
            }
            other if self.root.is_none() => push_merging_text(&mut self.prolog, other),
            other => push_merging_text(&mut self.epilog, other),
        }
        Ok(())
    }

    fn finish(self) -> Result<Document> {
        if let Some(unclosed) = self.open.last() {
            return Err(FixerError::InvalidManifest(format!(
                "unexpected end of document inside <{}>",
                unclosed.name
            )));
        }

        let root = self
            .root
            .ok_or_else(|| FixerError::InvalidManifest("document has no root element".to_string()))?;

        Ok(Document {
            bom: self.bom,
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}

fn push_merging_text(nodes: &mut Vec<Node>, node: Node) {
    if let (Some(Node::Text(last)), Node::Text(text)) = (nodes.last_mut(), &node) {
        last.push_str(text);
        return;
    }
    nodes.push(node);
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- Copyright header -->
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="com.example.app"
    android:versionCode='0'>

    <uses-sdk android:minSdkVersion="21" />
    <application
        android:label="@string/app_name"
        android:icon="@mipmap/ic_launcher" >
        <activity android:name=".Main"><![CDATA[raw <data>]]></activity>
        <meta-data android:name="k" android:value="a &amp; b"/>
    </application>
</manifest>
"#;

    #[test]
    fn test_roundtrip_is_byte_identical() {
        let doc: Document = MANIFEST.parse().unwrap();
        assert_eq!(doc.to_string(), MANIFEST);
    }

    #[test]
    fn test_attribute_layout_is_recorded() {
        let doc: Document = MANIFEST.parse().unwrap();
        let root = doc.root();
        assert_eq!(root.name(), "manifest");
        assert_eq!(root.attributes().len(), 3);
        assert_eq!(root.attributes()[1].lead, "\n    ");
        assert_eq!(root.attributes()[2].quote, '\'');
        assert_eq!(root.attribute("android:versionCode").unwrap(), "0");
    }

    #[test]
    fn test_prolog_and_epilog() {
        let doc: Document = MANIFEST.parse().unwrap();
        assert!(matches!(doc.prolog[0], Node::Declaration(_)));
        assert!(
            doc.prolog
                .iter()
                .any(|n| matches!(n, Node::Comment(c) if c.contains("Copyright")))
        );
        assert_eq!(doc.epilog, vec![Node::Text("\n".to_string())]);
    }

    #[test]
    fn test_rejects_second_root() {
        let err = "<a/><b/>".parse::<Document>().unwrap_err();
        assert!(matches!(err, FixerError::InvalidManifest(_)));
    }

    #[test]
    fn test_rejects_empty_document() {
        assert!("".parse::<Document>().is_err());
        assert!("<!-- only a comment -->".parse::<Document>().is_err());
    }

    #[test]
    fn test_rejects_mismatched_tags() {
        assert!("<a><b></a>".parse::<Document>().is_err());
    }

    #[test]
    fn test_attribute_spacing_around_equals_survives() {
        let input = "<manifest\tx=\"1\"\ty = '2' a = \"1\"\n    b\n= '2'/>";
        let doc: Document = input.parse().unwrap();
        assert_eq!(doc.to_string(), input);
        assert_eq!(doc.root().attribute("y").unwrap(), "2");
        assert_eq!(doc.root().attribute("b").unwrap(), "2");
    }

    #[test]
    fn test_byte_order_mark_survives() {
        let input = "\u{feff}<?xml version=\"1.0\"?>\n<manifest/>\n";
        let doc: Document = input.parse().unwrap();
        assert!(doc.bom);
        assert_eq!(doc.to_string(), input);
    }

    #[test]
    fn test_doctype_spacing_survives() {
        let input = "<!DOCTYPE  manifest>\n<manifest/>";
        let doc: Document = input.parse().unwrap();
        assert_eq!(doc.to_string(), input);
    }
}
