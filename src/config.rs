use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    verifier::{FieldCheck, Validate, Verifier, VerifyError},
};

/// Prefix for environment variables that override file values.
pub const ENV_PREFIX: &str = "DIDYOUMEAN";

/// Connection descriptor for the document database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MongoConfig {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub database: String,
}

impl Validate for MongoConfig {
    fn checks(&self) -> Vec<FieldCheck> {
        vec![
            FieldCheck::required("URI", &self.uri),
            FieldCheck::required("Database", &self.database),
        ]
    }
}

/// Validated process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    pub mongo: MongoConfig,
}

/// Configuration as read from disk, before validation.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    mongo: Option<MongoConfig>,
}

impl Validate for FileConfig {
    fn checks(&self) -> Vec<FieldCheck> {
        let mut checks = vec![FieldCheck::required("Mongo", &self.mongo)];
        if let Some(mongo) = &self.mongo {
            checks.extend(mongo.checks());
        }
        checks
    }
}

impl ManagerConfig {
    /// Load `path`, apply `DIDYOUMEAN_*` overrides from the process
    /// environment, and validate the result.
    pub fn load(path: &Path, verifier: &Verifier) -> Result<Self> {
        Self::load_with_env(path, verifier, |key| std::env::var(key).ok())
    }

    /// Same as [`ManagerConfig::load`] with an explicit environment lookup.
    ///
    /// A file that cannot be read is skipped so the environment alone can
    /// configure the process; a file that cannot be parsed is an error.
    pub fn load_with_env<F>(
        path: &Path,
        verifier: &Verifier,
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut raw = match std::fs::read_to_string(path) {
            Ok(text) => {
                tracing::info!(path = %path.display(), "using config file");
                parse(&text)?
            }
            Err(err) => {
                tracing::debug!(
                    path = %path.display(),
                    error = %err,
                    "config file not read"
                );
                FileConfig::default()
            }
        };

        apply_env(&mut raw, env);
        verifier.check(&raw)?;

        let mongo = raw.mongo.ok_or(VerifyError::NilTarget)?;
        Ok(Self { mongo })
    }
}

fn parse(text: &str) -> Result<FileConfig> {
    if text.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    Ok(serde_yaml::from_str(text)?)
}

fn env_key(section: &str, field: &str) -> String {
    format!("{ENV_PREFIX}_{section}_{field}").to_uppercase()
}

fn apply_env<F>(raw: &mut FileConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let uri = env(&env_key("mongo", "uri"));
    let database = env(&env_key("mongo", "database"));
    if uri.is_none() && database.is_none() {
        return;
    }

    let mongo = raw.mongo.get_or_insert_with(MongoConfig::default);
    if let Some(uri) = uri {
        mongo.uri = uri;
    }
    if let Some(database) = database {
        mongo.database = database;
    }
}
