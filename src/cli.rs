use crate::command::FixArgs;
use clap::{ArgAction, Parser};

/// Inject build-determined attributes into an Android manifest.
#[derive(Parser, Debug)]
#[command(name = "manifest-fixer", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub fix: FixArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_camel_case_and_aliases() {
        let cli = Cli::try_parse_from([
            "manifest-fixer",
            "--minSdkVersion",
            "28",
            "--target-sdk-version",
            "30",
            "--raise-min-sdk-version",
            "--uses-library",
            "foo",
            "--uses-library",
            "bar",
            "--extract-native-libs",
            "false",
            "-vv",
            "in.xml",
            "out.xml",
        ])
        .unwrap();

        assert_eq!(cli.fix.min_sdk_version.as_deref(), Some("28"));
        assert_eq!(cli.fix.target_sdk_version.as_deref(), Some("30"));
        assert!(cli.fix.raise_min_sdk_version);
        assert_eq!(cli.fix.uses_libraries, ["foo", "bar"]);
        assert_eq!(cli.fix.extract_native_libs, Some(false));
        assert_eq!(cli.fix.output.as_deref(), Some(std::path::Path::new("out.xml")));
        assert_eq!(cli.log_level(), "debug");
    }

    #[test]
    fn test_raise_requires_min_sdk() {
        let result = Cli::try_parse_from(["manifest-fixer", "--raise-min-sdk-version", "in.xml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_native_libs_rejects_non_bool() {
        let result =
            Cli::try_parse_from(["manifest-fixer", "--extract-native-libs", "maybe", "in.xml"]);
        assert!(result.is_err());
    }
}
