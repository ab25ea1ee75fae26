//! `<uses-sdk>` version bounds.

use super::{Manifest, Missing, Scope, USES_SDK};
use crate::error::Result;
use crate::version::{VersionToken, compare_version_gt};

/// Target SDK written into library manifests that declare none.
///
/// A library must not force a higher target on the app that embeds it, so
/// libraries get the historical minimum instead of the build's target.
pub const LEGACY_LIBRARY_TARGET_SDK: &str = "16";

/// Raises `minSdkVersion` and fills in a missing `targetSdkVersion` on every
/// top-level `<uses-sdk>`.
///
/// A manifest without `<uses-sdk>` gets one as the first child of
/// `<manifest>`, indented like its siblings.
///
/// ## Rules
/// - `minSdkVersion`: set to `min_sdk` when absent or lower; a higher
///   existing value (codenames included) is never lowered
/// - `targetSdkVersion`: an existing value is kept; otherwise `target_sdk`,
///   or [`LEGACY_LIBRARY_TARGET_SDK`] when `library` is set
///
/// # Errors
///
/// - `MalformedVersion`: `min_sdk`, `target_sdk` or an existing
///   `minSdkVersion` is not a valid version token
pub fn raise_min_sdk_version(
    manifest: &mut Manifest,
    min_sdk: &str,
    target_sdk: &str,
    library: bool,
) -> Result<()> {
    VersionToken::parse(min_sdk)?;
    VersionToken::parse(target_sdk)?;

    manifest.for_each_top_level(USES_SDK, Scope::All, Missing::InsertFirst, |mut site| {
        let existing_min = site.get("minSdkVersion").map(|v| v.into_owned());
        match existing_min {
            Some(existing) if !compare_version_gt(min_sdk, &existing)? => {
                log::debug!(
                    "Keeping minSdkVersion {} (requested {})",
                    existing,
                    min_sdk
                );
            }
            existing => {
                log::debug!(
                    "Setting minSdkVersion: {} → {}",
                    existing.as_deref().unwrap_or("<absent>"),
                    min_sdk
                );
                site.set("minSdkVersion", min_sdk);
            }
        }

        if site.get("targetSdkVersion").is_none() {
            let target = if library {
                LEGACY_LIBRARY_TARGET_SDK
            } else {
                target_sdk
            };
            log::debug!("Setting targetSdkVersion: {}", target);
            site.set("targetSdkVersion", target);
        }

        Ok(())
    })
}
