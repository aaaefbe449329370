use std::{
  collections::HashMap,
  env, fmt,
  path::{Path, PathBuf},
};

pub const DB_USER: &str = "DB_USER";
pub const DB_PASSWORD: &str = "DB_PASSWORD";
pub const DB_HOST: &str = "DB_HOST";
pub const DB_PORT: &str = "DB_PORT";
pub const DB_NAME: &str = "DB_NAME";

/// [`Config`] error
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("could not read env file {}: {source}", path.display())]
  EnvFile {
    path: PathBuf,
    #[source]
    source: dotenvy::Error,
  },
  #[error("missing required variable {0}")]
  MissingVar(&'static str),
  #[error("variable {0} must not be empty")]
  EmptyVar(&'static str),
}

///
/// Database connection parameters, read once at startup.
///
/// Values come from the env file given on the command line; variables
/// already set in the process environment take precedence.
///
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
  pub db_user: String,
  pub db_password: String,
  pub db_host: String,
  pub db_port: String,
  pub db_name: String,
}

impl Config {
  /// Loads the configuration from the env file at `path`.
  /// A missing or malformed file is an error.
  pub fn load<P>(path: P) -> Result<Self, Error>
  where
    P: AsRef<Path>,
  {
    Self::load_with_env(path, |key| env::var(key).ok())
  }

  /// Same as [`Config::load`] with `env` standing in for the process environment.
  pub fn load_with_env<P, F>(path: P, env: F) -> Result<Self, Error>
  where
    P: AsRef<Path>,
    F: Fn(&str) -> Option<String>,
  {
    let path = path.as_ref();
    let env_file_error = |source| Error::EnvFile {
      path: path.to_path_buf(),
      source,
    };

    // the file is read without touching the process environment
    let mut file_vars: HashMap<String, String> = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(env_file_error)? {
      let (key, value) = item.map_err(env_file_error)?;
      file_vars.insert(key, value);
    }

    Self::from_lookup(|key| env(key).or_else(|| file_vars.get(key).cloned()))
  }

  pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
  where
    F: Fn(&str) -> Option<String>,
  {
    let required = |name: &'static str| match lookup(name) {
      None => Err(Error::MissingVar(name)),
      Some(value) if value.is_empty() => Err(Error::EmptyVar(name)),
      Some(value) => Ok(value),
    };

    Ok(Self {
      db_user: required(DB_USER)?,
      // an empty password is valid (e.g. trust authentication)
      db_password: lookup(DB_PASSWORD).ok_or(Error::MissingVar(DB_PASSWORD))?,
      db_host: required(DB_HOST)?,
      db_port: required(DB_PORT)?,
      db_name: required(DB_NAME)?,
    })
  }

  /// `postgres://<user>:<password>@<host>:<port>/<name>?sslmode=disable`
  pub fn connection_string(&self) -> String {
    format!(
      "postgres://{}:{}@{}:{}/{}?sslmode=disable",
      self.db_user, self.db_password, self.db_host, self.db_port, self.db_name
    )
  }

  /// `<host>:<port>/<name>`, safe to log.
  pub fn database_target(&self) -> String {
    format!("{}:{}/{}", self.db_host, self.db_port, self.db_name)
  }
}

impl fmt::Debug for Config {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Config")
      .field("db_user", &self.db_user)
      .field("db_password", &"<redacted>")
      .field("db_host", &self.db_host)
      .field("db_port", &self.db_port)
      .field("db_name", &self.db_name)
      .finish()
  }
}
