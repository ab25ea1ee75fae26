use crate::error::{FixerError, Result};
use crate::fs::{read_manifest, write_atomic};
use crate::manifest::{self, FixOptions, Manifest, SdkOptions};
use anyhow::Context;
use clap::Args;
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "Fix options")]
pub struct FixArgs {
    /// Manifest to read
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the fixed manifest (defaults to stdout)
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Minimum SDK version to require
    #[arg(long = "minSdkVersion", visible_alias = "min-sdk-version", value_name = "VERSION")]
    pub min_sdk_version: Option<String>,

    /// Target SDK version to fill in when none is declared (defaults to the min SDK)
    #[arg(
        long = "targetSdkVersion",
        visible_alias = "target-sdk-version",
        value_name = "VERSION"
    )]
    pub target_sdk_version: Option<String>,

    /// Raise minSdkVersion in <uses-sdk> to --minSdkVersion
    #[arg(long, requires = "min_sdk_version")]
    pub raise_min_sdk_version: bool,

    /// The manifest belongs to a library
    ///
    /// Libraries without a targetSdkVersion get the legacy default instead
    /// of --targetSdkVersion.
    #[arg(long)]
    pub library: bool,

    /// Add a required <uses-library> (repeatable)
    #[arg(long = "uses-library", value_name = "NAME")]
    pub uses_libraries: Vec<String>,

    /// Add an optional <uses-library> (repeatable)
    #[arg(long = "optional-uses-library", value_name = "NAME")]
    pub optional_uses_libraries: Vec<String>,

    /// Allow the application to use non-SDK APIs
    #[arg(long)]
    pub uses_non_sdk_api: bool,

    /// Record a logging parent in the application's meta-data
    #[arg(long, value_name = "ID")]
    pub logging_parent: Option<String>,

    /// Require the application to load dex from the APK
    #[arg(long)]
    pub use_embedded_dex: bool,

    /// Mark the application as having no code
    #[arg(long)]
    pub has_no_code: bool,

    /// Mark the application as test-only
    #[arg(long)]
    pub test_only: bool,

    /// Require extractNativeLibs to have this value
    #[arg(long, value_name = "BOOL")]
    pub extract_native_libs: Option<bool>,

    /// Replace a versionCode of "0" with this value
    #[arg(long, value_name = "CODE")]
    pub override_placeholder_version: Option<String>,

    /// Replace maxSdkVersion="current" on permissions with this value
    #[arg(long = "replaceMaxSdkVersionPlaceholder", value_name = "SDK")]
    pub replace_max_sdk_version_placeholder: Option<String>,

    /// Report whether the manifest would change without writing anything
    #[arg(long, short = 'n')]
    pub dry_run: bool,
}

impl FixArgs {
    /// Rejects argument combinations clap cannot express.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = self
            .uses_libraries
            .iter()
            .find(|name| self.optional_uses_libraries.contains(name))
        {
            return Err(FixerError::InvalidArgs(format!(
                "library '{}' is both required and optional",
                name
            )));
        }

        if self.min_sdk_version.is_some() && !self.raise_min_sdk_version {
            log::warn!("--minSdkVersion has no effect without --raise-min-sdk-version");
        }
        if self.library && !self.raise_min_sdk_version {
            log::warn!("--library has no effect without --raise-min-sdk-version");
        }

        Ok(())
    }

    /// Builds the rule selection for [`manifest::apply`].
    pub fn to_options(&self) -> FixOptions {
        let raise_sdk = match (&self.min_sdk_version, self.raise_min_sdk_version) {
            (Some(min), true) => Some(SdkOptions {
                min_sdk: min.clone(),
                target_sdk: self
                    .target_sdk_version
                    .clone()
                    .unwrap_or_else(|| min.clone()),
                library: self.library,
            }),
            _ => None,
        };

        FixOptions {
            raise_sdk,
            uses_libraries: self.uses_libraries.clone(),
            optional_uses_libraries: self.optional_uses_libraries.clone(),
            uses_non_sdk_api: self.uses_non_sdk_api,
            logging_parent: self.logging_parent.clone(),
            use_embedded_dex: self.use_embedded_dex,
            has_no_code: self.has_no_code,
            test_only: self.test_only,
            extract_native_libs: self.extract_native_libs,
            override_placeholder_version: self.override_placeholder_version.clone(),
            max_sdk_placeholder: self.replace_max_sdk_version_placeholder.clone(),
        }
    }

    fn output_label(&self) -> String {
        self.output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<stdout>".to_string())
    }
}

pub fn execute(args: FixArgs) -> Result<()> {
    args.validate()?;
    let options = args.to_options();

    let source = read_manifest(&args.input)?;
    let mut manifest = Manifest::parse(&source)?;
    log::debug!(
        "Parsed {} (Android prefix '{}')",
        args.input.display(),
        manifest.prefix()
    );

    manifest::apply(&mut manifest, &options)?;
    let fixed = manifest.to_string();
    let changed = fixed != source;

    if args.dry_run {
        if changed {
            println!(
                "{} {} → {}",
                "Would update".yellow().bold(),
                args.input.display(),
                args.output_label()
            );
        } else {
            println!("{} {}", "Unchanged".green(), args.input.display());
        }
        return Ok(());
    }

    match &args.output {
        Some(path) => {
            write_atomic(path, &fixed)?;
            log::info!(
                "Wrote {} ({})",
                path.display(),
                if changed { "modified" } else { "unchanged" }
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(fixed.as_bytes())
                .and_then(|_| stdout.flush())
                .context("Failed to write manifest to stdout")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> FixArgs {
        FixArgs {
            input: PathBuf::from("AndroidManifest.xml"),
            ..FixArgs::default()
        }
    }

    #[test]
    fn test_target_defaults_to_min() {
        let a = FixArgs {
            min_sdk_version: Some("28".to_string()),
            raise_min_sdk_version: true,
            ..args()
        };
        let sdk = a.to_options().raise_sdk.unwrap();
        assert_eq!(sdk.min_sdk, "28");
        assert_eq!(sdk.target_sdk, "28");
        assert!(!sdk.library);
    }

    #[test]
    fn test_min_without_raise_selects_nothing() {
        let a = FixArgs {
            min_sdk_version: Some("28".to_string()),
            target_sdk_version: Some("30".to_string()),
            ..args()
        };
        assert!(a.validate().is_ok());
        assert_eq!(a.to_options(), FixOptions::default());
    }

    #[test]
    fn test_required_and_optional_overlap_rejected() {
        let a = FixArgs {
            uses_libraries: vec!["foo".to_string(), "bar".to_string()],
            optional_uses_libraries: vec!["bar".to_string()],
            ..args()
        };
        match a.validate().unwrap_err() {
            FixerError::InvalidArgs(msg) => assert!(msg.contains("'bar'")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_options_carry_flags() {
        let a = FixArgs {
            has_no_code: true,
            extract_native_libs: Some(false),
            replace_max_sdk_version_placeholder: Some("34".to_string()),
            ..args()
        };
        let options = a.to_options();
        assert!(options.has_no_code);
        assert_eq!(options.extract_native_libs, Some(false));
        assert_eq!(options.max_sdk_placeholder.as_deref(), Some("34"));
        assert!(options.raise_sdk.is_none());
    }
}
