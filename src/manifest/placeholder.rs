//! Sentinel values the build fills in.
//!
//! Source manifests use `"0"` for `versionCode` and `"current"` for a
//! permission's `maxSdkVersion` to mean "assigned at build time". These
//! rules substitute the literal sentinel only; any other value is left
//! exactly as written.

use super::{Manifest, qualify};
use crate::error::Result;
use crate::xml::Element;

/// `versionCode` value that means "not assigned yet".
pub const VERSION_CODE_PLACEHOLDER: &str = "0";

/// `maxSdkVersion` value that means "the SDK being built".
pub const MAX_SDK_PLACEHOLDER: &str = "current";

const PERMISSION_TAGS: &[&str] = &["permission", "uses-permission"];

/// Replaces `maxSdkVersion="current"` with `current_sdk` on every
/// `<permission>` and `<uses-permission>`, at any depth.
///
/// Returns the number of attributes replaced.
pub fn replace_max_sdk_placeholder(manifest: &mut Manifest, current_sdk: &str) -> Result<usize> {
    let (root, prefix) = manifest.root_and_prefix();
    let max_sdk = qualify(prefix, "maxSdkVersion");
    let mut replaced = 0;

    root.visit_descendants_mut(&mut |element: &mut Element| {
        if !PERMISSION_TAGS.contains(&element.name()) {
            return;
        }
        if element.attribute(&max_sdk).as_deref() == Some(MAX_SDK_PLACEHOLDER) {
            element.set_attribute(&max_sdk, current_sdk);
            replaced += 1;
        }
    });

    log::debug!(
        "Replaced {} maxSdkVersion placeholder(s) with {}",
        replaced,
        current_sdk
    );
    Ok(replaced)
}

/// Replaces a `versionCode` of exactly `"0"` on `<manifest>` with `version`.
///
/// Returns `true` if the placeholder was found and replaced.
pub fn override_placeholder_version(manifest: &mut Manifest, version: &str) -> Result<bool> {
    let (root, prefix) = manifest.root_and_prefix();
    let version_code = qualify(prefix, "versionCode");

    if root.attribute(&version_code).as_deref() != Some(VERSION_CODE_PLACEHOLDER) {
        return Ok(false);
    }

    log::debug!("Setting versionCode: {} → {}", VERSION_CODE_PLACEHOLDER, version);
    root.set_attribute(&version_code, version);
    Ok(true)
}
