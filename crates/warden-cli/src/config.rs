//! Configuration loading helpers for the Warden CLI.
//!
//! Leading configuration flags are routed to `ortho-config`; everything from
//! the first other token onwards is parsed by `clap`.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use warden_config::Config;

use crate::AppError;

/// CLI flags recognised by the configuration loader.
///
/// Must match the fields of [`warden_config::Config`] that accept flags.
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &["--config-path", "--log-filter", "--log-format"];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the leading configuration flags.
    ///
    /// Configuration flags appearing after the first command token are left
    /// to `clap`, which rejects them.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    let (flag, has_inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (text.as_ref(), false),
    };

    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !has_inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Arguments split between the configuration loader and the command parser.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    /// Program name followed by the leading configuration flags.
    pub(crate) config_arguments: Vec<OsString>,
    /// Program name followed by everything else.
    pub(crate) command_arguments: Vec<OsString>,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit::default();
    };

    let mut config_arguments = vec![program.clone()];
    let mut remaining = rest.iter();
    let mut command_arguments = vec![program.clone()];

    while let Some(argument) = remaining.next() {
        match classify(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                if needs_value && let Some(value) = remaining.next() {
                    config_arguments.push(value.clone());
                }
            }
            FlagAction::Stop => {
                command_arguments.push(argument.clone());
                break;
            }
        }
    }
    command_arguments.extend(remaining.cloned());

    ConfigArgumentSplit {
        config_arguments,
        command_arguments,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case("--log-filter=debug", false)]
    #[case("--log-filter", true)]
    #[case("--config-path", true)]
    fn recognises_config_flags(#[case] flag: &str, #[case] expects_value: bool) {
        match classify(OsStr::new(flag)) {
            FlagAction::Include { needs_value } => assert_eq!(needs_value, expects_value),
            FlagAction::Stop => panic!("expected {flag} to be a configuration flag"),
        }
    }

    #[rstest]
    #[case("ls")]
    #[case("--root")]
    #[case("--unknown=1")]
    fn other_tokens_stop_the_scan(#[case] token: &str) {
        assert!(matches!(classify(OsStr::new(token)), FlagAction::Stop));
    }

    #[test]
    fn splits_leading_config_flags_from_the_command() {
        let split = split_config_arguments(&os(&[
            "warden",
            "--log-filter",
            "debug",
            "--log-format=compact",
            "--root",
            "/srv",
            "ls",
        ]));
        assert_eq!(
            split.config_arguments,
            os(&["warden", "--log-filter", "debug", "--log-format=compact"])
        );
        assert_eq!(
            split.command_arguments,
            os(&["warden", "--root", "/srv", "ls"])
        );
    }

    #[test]
    fn config_flags_after_the_command_stay_with_the_command() {
        let split = split_config_arguments(&os(&["warden", "ls", "--log-filter", "debug"]));
        assert_eq!(split.config_arguments, os(&["warden"]));
        assert_eq!(
            split.command_arguments,
            os(&["warden", "ls", "--log-filter", "debug"])
        );
    }

    #[test]
    fn empty_arguments_produce_empty_split() {
        assert_eq!(split_config_arguments(&[]), ConfigArgumentSplit::default());
    }
}
