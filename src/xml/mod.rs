//! Order-preserving XML tree.
//!
//! The manifest rules edit a [`Document`] in place. Parsing goes through
//! `quick-xml`; writing is the `Display` impl of the tree. Nodes that no rule
//! touched are written back byte-for-byte: text and comments are kept in
//! their raw form and every attribute remembers the whitespace in front of
//! it and its quote character.
//!
//! ```
//! # use manifest_fixer::xml::Document;
//! # fn example() -> manifest_fixer::Result<()> {
//! let input = "<manifest>\n    <application/>\n</manifest>\n";
//! let mut doc: Document = input.parse()?;
//!
//! if let Some(app) = doc.root_mut().child_elements_mut("application").next() {
//!     app.set_attribute("hasCode", "false");
//! }
//!
//! assert_eq!(
//!     doc.to_string(),
//!     "<manifest>\n    <application hasCode=\"false\"/>\n</manifest>\n"
//! );
//! # Ok(())
//! # }
//! ```

mod parse;
mod tree;
mod write;

pub use tree::{Attribute, Document, Element, Node};

/// One indentation step for inserted elements.
pub const INDENT_UNIT: &str = "    ";
