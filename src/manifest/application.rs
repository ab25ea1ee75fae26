//! Rules that edit `<application>`.
//!
//! Every rule here except [`add_logging_parent`] applies to all top-level
//! `<application>` elements and appends one when the manifest has none.

use super::{APPLICATION, Manifest, Missing, Scope};
use crate::error::{FixerError, Result};
use crate::xml::Element;

/// `meta-data` key of the logging parent.
pub const LOGGING_PARENT_KEY: &str = "android.content.pm.LOGGING_PARENT";

const META_DATA: &str = "meta-data";
const USES_LIBRARY: &str = "uses-library";

/// How a boolean attribute rule treats a value already in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagPolicy {
    /// Any explicit value wins.
    KeepExisting,
    /// An explicit value must match; a mismatch is a [`FixerError::Conflict`].
    RequireMatch,
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Ensures `android:<local>` holds `value` on every `<application>`.
pub fn ensure_application_flag(
    manifest: &mut Manifest,
    local: &str,
    value: bool,
    policy: FlagPolicy,
) -> Result<()> {
    let wanted = bool_str(value);

    manifest.for_each_top_level(APPLICATION, Scope::All, Missing::Append, |mut site| {
        let existing = site.get(local).map(|v| v.into_owned());
        match existing {
            None => {
                log::debug!("Setting {} = {}", site.attr_name(local), wanted);
                site.set(local, wanted);
            }
            Some(existing) if policy == FlagPolicy::RequireMatch && existing != wanted => {
                return Err(FixerError::Conflict {
                    element: APPLICATION.to_string(),
                    attribute: local.to_string(),
                    existing,
                    requested: wanted.to_string(),
                });
            }
            Some(existing) => {
                log::debug!("Keeping {} = {}", site.attr_name(local), existing);
            }
        }
        Ok(())
    })
}

/// Marks every application as allowed to use non-SDK APIs, unless it says
/// otherwise.
pub fn add_uses_non_sdk_api(manifest: &mut Manifest) -> Result<()> {
    ensure_application_flag(manifest, "usesNonSdkApi", true, FlagPolicy::KeepExisting)
}

/// Requires `useEmbeddedDex="true"` on every application.
///
/// # Errors
///
/// - `Conflict`: an application declares `useEmbeddedDex="false"`
pub fn add_use_embedded_dex(manifest: &mut Manifest) -> Result<()> {
    ensure_application_flag(manifest, "useEmbeddedDex", true, FlagPolicy::RequireMatch)
}

/// Requires `extractNativeLibs` to equal `value` on every application.
///
/// # Errors
///
/// - `Conflict`: an application declares the opposite value
pub fn add_extract_native_libs(manifest: &mut Manifest, value: bool) -> Result<()> {
    ensure_application_flag(manifest, "extractNativeLibs", value, FlagPolicy::RequireMatch)
}

/// Adds `hasCode="false"` where no `hasCode` is declared.
pub fn set_has_code_to_false(manifest: &mut Manifest) -> Result<()> {
    ensure_application_flag(manifest, "hasCode", false, FlagPolicy::KeepExisting)
}

/// Adds `testOnly="true"` where no `testOnly` is declared.
pub fn set_test_only_flag_to_true(manifest: &mut Manifest) -> Result<()> {
    ensure_application_flag(manifest, "testOnly", true, FlagPolicy::KeepExisting)
}

/// Appends `<uses-library>` entries to every application.
///
/// Names already declared in an application, required or not, are skipped
/// for that application only. An empty `names` leaves the manifest untouched,
/// even when it has no `<application>`.
pub fn add_uses_libraries<S: AsRef<str>>(
    manifest: &mut Manifest,
    names: &[S],
    required: bool,
) -> Result<()> {
    if names.is_empty() {
        return Ok(());
    }

    manifest.for_each_top_level(APPLICATION, Scope::All, Missing::Append, |mut site| {
        let mut declared = site.child_names(USES_LIBRARY);

        for name in names {
            let name: &str = name.as_ref();
            if declared.iter().any(|d| d == name) {
                log::debug!("<uses-library> {} already declared", name);
                continue;
            }

            let library = Element::new(USES_LIBRARY)
                .with_attribute(&site.attr_name("name"), name)
                .with_attribute(&site.attr_name("required"), bool_str(required));
            site.append_child(library);
            declared.push(name.to_string());
            log::debug!("Added <uses-library> {} (required={})", name, required);
        }
        Ok(())
    })
}

/// Records the logging parent as `<meta-data>` on the first application.
///
/// `None` or an empty string leaves the manifest untouched. Otherwise an
/// `<application>` is created as the first child of `<manifest>` when there
/// is none, and an existing logging-parent entry has its value replaced
/// rather than being duplicated.
pub fn add_logging_parent(manifest: &mut Manifest, logging_parent: Option<&str>) -> Result<()> {
    let Some(value) = logging_parent.filter(|v| !v.is_empty()) else {
        return Ok(());
    };

    manifest.for_each_top_level(APPLICATION, Scope::First, Missing::InsertFirst, |mut site| {
        let name_attr = site.attr_name("name");
        let value_attr = site.attr_name("value");

        let existing = site
            .element
            .child_elements_mut(META_DATA)
            .find(|e| e.attribute(&name_attr).as_deref() == Some(LOGGING_PARENT_KEY));

        match existing {
            Some(meta) => {
                log::debug!("Updating existing {} entry", LOGGING_PARENT_KEY);
                meta.set_attribute(&value_attr, value);
            }
            None => {
                let meta = Element::new(META_DATA)
                    .with_attribute(&name_attr, LOGGING_PARENT_KEY)
                    .with_attribute(&value_attr, value);
                site.append_child(meta);
            }
        }
        Ok(())
    })
}
