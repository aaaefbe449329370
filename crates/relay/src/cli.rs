use std::{ffi::OsString, path::PathBuf};

use clap::Parser;

/// Nostr relay backed by a Postgres event store
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "relay", version, about)]
pub struct Cli {
  /// path to .env file
  #[arg(long = "env", value_name = "PATH", default_value = ".env")]
  pub env: PathBuf,
}

impl Cli {
  /// Parses `args` (program name first), exiting on error or `--help`.
  pub fn parse_args<I, T>(args: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
  {
    Self::parse_from(normalize_args(args))
  }

  pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
  where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
  {
    Self::try_parse_from(normalize_args(args))
  }
}

/// Rewrites the single-dash long form (`-env <path>`, `-env=<path>`)
/// into the `--env` form clap understands.
fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
  I: IntoIterator<Item = T>,
  T: Into<OsString>,
{
  let mut options_ended = false;

  args
    .into_iter()
    .map(Into::<OsString>::into)
    .map(|arg| {
      if options_ended {
        return arg;
      }

      let rewritten = match arg.to_str() {
        Some("--") => {
          options_ended = true;
          None
        }
        Some(flag) if flag == "-env" || flag.starts_with("-env=") => {
          Some(OsString::from(format!("-{flag}")))
        }
        _ => None,
      };
      rewritten.unwrap_or(arg)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_args(std::iter::once("relay").chain(args.iter().copied()))
  }

  #[test]
  fn test_env_defaults_to_dot_env() {
    assert_eq!(parse(&[]).unwrap().env, PathBuf::from(".env"));
  }

  #[test]
  fn test_accepts_single_and_double_dash_forms() {
    for args in [
      vec!["-env", "conf/relay.env"],
      vec!["-env=conf/relay.env"],
      vec!["--env", "conf/relay.env"],
      vec!["--env=conf/relay.env"],
    ] {
      assert_eq!(parse(&args).unwrap().env, PathBuf::from("conf/relay.env"));
    }
  }

  #[test]
  fn test_rejects_unknown_flags() {
    assert!(parse(&["-port", "3334"]).is_err());
    assert!(parse(&["--port", "3334"]).is_err());
  }

  #[test]
  fn test_missing_value_is_an_error() {
    assert!(parse(&["-env"]).is_err());
  }
}
