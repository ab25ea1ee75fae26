//! The fixed sequence of rules a build runs over one manifest.

use super::{
    Manifest, add_extract_native_libs, add_logging_parent, add_use_embedded_dex,
    add_uses_libraries, add_uses_non_sdk_api, override_placeholder_version,
    raise_min_sdk_version, replace_max_sdk_placeholder, set_has_code_to_false,
    set_test_only_flag_to_true,
};
use crate::error::Result;

/// Parameters of the SDK-raising rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkOptions {
    pub min_sdk: String,
    pub target_sdk: String,
    /// The manifest belongs to a library rather than an app.
    pub library: bool,
}

/// Which rules to run and with what values. The default runs nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixOptions {
    pub raise_sdk: Option<SdkOptions>,
    pub uses_libraries: Vec<String>,
    pub optional_uses_libraries: Vec<String>,
    pub uses_non_sdk_api: bool,
    pub logging_parent: Option<String>,
    pub use_embedded_dex: bool,
    pub has_no_code: bool,
    pub test_only: bool,
    pub extract_native_libs: Option<bool>,
    pub override_placeholder_version: Option<String>,
    pub max_sdk_placeholder: Option<String>,
}

/// Applies every enabled rule to `manifest`, in order:
///
/// 1. Raise min SDK / fill target SDK
/// 2. Required, then optional `<uses-library>`
/// 3. `usesNonSdkApi`
/// 4. Logging parent
/// 5. `useEmbeddedDex`, `hasCode`, `testOnly`, `extractNativeLibs`
/// 6. `versionCode` and `maxSdkVersion` placeholders
///
/// Stops at the first error; the manifest is then partially edited and must
/// be discarded.
pub fn apply(manifest: &mut Manifest, options: &FixOptions) -> Result<()> {
    if let Some(sdk) = &options.raise_sdk {
        log::info!(
            "Raising minSdkVersion to {} (target {}, library: {})",
            sdk.min_sdk,
            sdk.target_sdk,
            sdk.library
        );
        raise_min_sdk_version(manifest, &sdk.min_sdk, &sdk.target_sdk, sdk.library)?;
    }

    if !options.uses_libraries.is_empty() {
        log::info!("Adding required libraries: {}", options.uses_libraries.join(", "));
        add_uses_libraries(manifest, &options.uses_libraries, true)?;
    }

    if !options.optional_uses_libraries.is_empty() {
        log::info!(
            "Adding optional libraries: {}",
            options.optional_uses_libraries.join(", ")
        );
        add_uses_libraries(manifest, &options.optional_uses_libraries, false)?;
    }

    if options.uses_non_sdk_api {
        log::info!("Allowing non-SDK API usage");
        add_uses_non_sdk_api(manifest)?;
    }

    if let Some(parent) = &options.logging_parent {
        log::info!("Setting logging parent: {}", parent);
        add_logging_parent(manifest, Some(parent))?;
    }

    if options.use_embedded_dex {
        log::info!("Requiring embedded dex");
        add_use_embedded_dex(manifest)?;
    }

    if options.has_no_code {
        log::info!("Marking application as code-free");
        set_has_code_to_false(manifest)?;
    }

    if options.test_only {
        log::info!("Marking application as test-only");
        set_test_only_flag_to_true(manifest)?;
    }

    if let Some(extract) = options.extract_native_libs {
        log::info!("Requiring extractNativeLibs={}", extract);
        add_extract_native_libs(manifest, extract)?;
    }

    if let Some(version) = &options.override_placeholder_version {
        if override_placeholder_version(manifest, version)? {
            log::info!("Replaced placeholder versionCode with {}", version);
        }
    }

    if let Some(current) = &options.max_sdk_placeholder {
        let replaced = replace_max_sdk_placeholder(manifest, current)?;
        if replaced > 0 {
            log::info!("Replaced {} maxSdkVersion placeholder(s) with {}", replaced, current);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{manifest, parse};
    use super::*;
    use crate::error::FixerError;

    #[test]
    fn test_default_options_change_nothing() {
        let body = "    <uses-sdk android:minSdkVersion=\"21\"/>\n    <application/>\n";
        let mut m = parse(body);
        apply(&mut m, &FixOptions::default()).unwrap();
        assert_eq!(m.to_string(), manifest(body));
    }

    #[test]
    fn test_full_pipeline() {
        let input = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<manifest xmlns:android=\"http://schemas.android.com/apk/res/android\"\n    package=\"com.example\"\n    android:versionCode=\"0\">\n    <uses-permission android:name=\"p\" android:maxSdkVersion=\"current\"/>\n    <application android:label=\"App\"/>\n</manifest>\n";

        let options = FixOptions {
            raise_sdk: Some(SdkOptions {
                min_sdk: "28".to_string(),
                target_sdk: "30".to_string(),
                library: false,
            }),
            uses_libraries: vec!["foo".to_string()],
            optional_uses_libraries: vec!["bar".to_string()],
            uses_non_sdk_api: true,
            logging_parent: Some("PARENT".to_string()),
            has_no_code: true,
            extract_native_libs: Some(false),
            override_placeholder_version: Some("42".to_string()),
            max_sdk_placeholder: Some("34".to_string()),
            ..FixOptions::default()
        };

        let mut m = Manifest::parse(input).unwrap();
        apply(&mut m, &options).unwrap();

        let expected = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<manifest xmlns:android=\"http://schemas.android.com/apk/res/android\"\n    package=\"com.example\"\n    android:versionCode=\"42\">\n    <uses-sdk android:minSdkVersion=\"28\" android:targetSdkVersion=\"30\"/>\n    <uses-permission android:name=\"p\" android:maxSdkVersion=\"34\"/>\n    <application android:label=\"App\" android:usesNonSdkApi=\"true\" android:hasCode=\"false\" android:extractNativeLibs=\"false\">\n        <uses-library android:name=\"foo\" android:required=\"true\"/>\n        <uses-library android:name=\"bar\" android:required=\"false\"/>\n        <meta-data android:name=\"android.content.pm.LOGGING_PARENT\" android:value=\"PARENT\"/>\n    </application>\n</manifest>\n";
        assert_eq!(m.to_string(), expected);
    }

    #[test]
    fn test_conflict_aborts() {
        let mut m = parse("    <application android:extractNativeLibs=\"true\"/>\n");
        let options = FixOptions {
            extract_native_libs: Some(false),
            ..FixOptions::default()
        };
        assert!(matches!(
            apply(&mut m, &options).unwrap_err(),
            FixerError::Conflict { .. }
        ));
    }
}
