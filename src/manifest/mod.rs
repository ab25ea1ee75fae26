//! Android manifest editing.
//!
//! A [`Manifest`] wraps a parsed [`Document`] whose root is `<manifest>` and
//! remembers the prefix the document binds to the Android namespace. The
//! rules live in three submodules:
//!
//! - **`sdk`**: `<uses-sdk>` min/target version
//! - **`application`**: flags, libraries and metadata on `<application>`
//! - **`placeholder`**: build-time substitution of sentinel values
//!
//! [`pipeline`] runs the enabled rules in a fixed order.

pub mod application;
pub mod pipeline;
pub mod placeholder;
pub mod sdk;

use crate::error::{FixerError, Result};
use crate::xml::{Document, Element};
use std::borrow::Cow;
use std::fmt;

pub use application::{
    add_extract_native_libs, add_logging_parent, add_use_embedded_dex, add_uses_libraries,
    add_uses_non_sdk_api, set_has_code_to_false, set_test_only_flag_to_true,
};
pub use pipeline::{FixOptions, SdkOptions, apply};
pub use placeholder::{override_placeholder_version, replace_max_sdk_placeholder};
pub use sdk::raise_min_sdk_version;

/// Namespace of every attribute the rules read or write.
pub const ANDROID_NS: &str = "http://schemas.android.com/apk/res/android";

pub(crate) const APPLICATION: &str = "application";
pub(crate) const USES_SDK: &str = "uses-sdk";

/// Which of the matching elements a rule edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only the first match in document order.
    First,
    /// Every match.
    All,
}

/// What a rule does when no element matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// Leave the manifest alone.
    Skip,
    /// Create one as the first child of `<manifest>`.
    InsertFirst,
    /// Create one as the last child of `<manifest>`.
    Append,
}

/// A manifest document ready for editing.
#[derive(Debug, Clone)]
pub struct Manifest {
    doc: Document,
    prefix: String,
}

impl Manifest {
    /// Wraps a parsed document.
    ///
    /// # Errors
    ///
    /// - `InvalidManifest`: root is not `<manifest>`, or the root does not
    ///   declare a prefix for [`ANDROID_NS`]
    pub fn new(doc: Document) -> Result<Self> {
        let root = doc.root();
        if root.name() != "manifest" {
            return Err(FixerError::InvalidManifest(format!(
                "root element is <{}>, expected <manifest>",
                root.name()
            )));
        }

        let prefix = root
            .attributes()
            .iter()
            .find_map(|attr| {
                attr.name()
                    .strip_prefix("xmlns:")
                    .filter(|_| attr.value() == ANDROID_NS)
                    .map(str::to_string)
            })
            .ok_or_else(|| {
                FixerError::InvalidManifest(format!(
                    "<manifest> does not declare the namespace {}",
                    ANDROID_NS
                ))
            })?;

        log::debug!("Android namespace bound to prefix '{}'", prefix);
        Ok(Self { doc, prefix })
    }

    /// Parses and wraps a manifest.
    pub fn parse(xml: &str) -> Result<Self> {
        Self::new(xml.parse()?)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Prefix bound to [`ANDROID_NS`], usually `android`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn root(&self) -> &Element {
        self.doc.root()
    }

    /// Qualified name of an attribute in the Android namespace.
    pub fn attr_name(&self, local: &str) -> String {
        qualify(&self.prefix, local)
    }

    pub(crate) fn root_and_prefix(&mut self) -> (&mut Element, &str) {
        (self.doc.root_mut(), &self.prefix)
    }

    /// Runs `f` on the `<manifest>` children named `tag` selected by
    /// `scope`, creating one first according to `missing`.
    ///
    /// This is the single traversal every top-level rule goes through.
    pub(crate) fn for_each_top_level<F>(
        &mut self,
        tag: &str,
        scope: Scope,
        missing: Missing,
        mut f: F,
    ) -> Result<()>
    where
        F: FnMut(Site<'_>) -> Result<()>,
    {
        let (root, prefix) = self.root_and_prefix();

        let mut indices = root.child_element_indices(tag);
        if indices.is_empty() {
            let root_break = root.line_ending();
            match missing {
                Missing::Skip => return Ok(()),
                Missing::InsertFirst => root.insert_child_first(Element::new(tag), root_break),
                Missing::Append => root.append_child(Element::new(tag), root_break),
            }
            log::debug!("Inserted <{}> into <manifest>", tag);
            indices = root.child_element_indices(tag);
        }

        if scope == Scope::First {
            indices.truncate(1);
        }

        for idx in indices {
            let line_break = root.break_before(idx);
            if let Some(element) = root.child_element_at_mut(idx) {
                f(Site {
                    element,
                    line_break,
                    prefix,
                })?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.doc)
    }
}

pub(crate) fn qualify(prefix: &str, local: &str) -> String {
    format!("{}:{}", prefix, local)
}

/// An element handed to a rule, with Android-namespace attribute access.
pub(crate) struct Site<'a> {
    pub element: &'a mut Element,
    /// Line break and indentation in front of the element itself.
    pub line_break: String,
    prefix: &'a str,
}

impl Site<'_> {
    pub fn attr_name(&self, local: &str) -> String {
        qualify(self.prefix, local)
    }

    pub fn get(&self, local: &str) -> Option<Cow<'_, str>> {
        self.element.attribute(&self.attr_name(local))
    }

    pub fn set(&mut self, local: &str, value: &str) {
        let name = self.attr_name(local);
        self.element.set_attribute(&name, value);
    }

    /// Appends a child element, indented one level below this element.
    pub fn append_child(&mut self, child: Element) {
        self.element.append_child(child, &self.line_break);
    }

    /// Android-namespace `name` attribute of each direct child named `tag`.
    pub fn child_names(&self, tag: &str) -> Vec<String> {
        let name_attr = self.attr_name("name");
        self.element
            .child_elements(tag)
            .filter_map(|e| e.attribute(&name_attr).map(Cow::into_owned))
            .collect()
    }
}
