//! Runtime configuration, read from the environment
use super::service::DEFAULT_ID_PREFIX;
use super::store::SledContractRepository;
use super::utils;
use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;

pub const ENV_DB_PATH: &str = "CONTRACTS_DB_PATH";
pub const ENV_DB_TEMPORARY: &str = "CONTRACTS_DB_TEMPORARY";
pub const ENV_ID_PREFIX: &str = "CONTRACTS_ID_PREFIX";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    /// Remove the database when it is dropped, for throwaway stores.
    pub temporary: bool,
    /// bech32 human readable part of minted contract ids
    pub id_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("contracts.db"),
            temporary: false,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup, unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(flag) = lookup(ENV_DB_TEMPORARY) {
            config.temporary =
                parse_flag(&flag).with_context(|| format!("reading {}", ENV_DB_TEMPORARY))?;
        }
        if let Some(prefix) = lookup(ENV_ID_PREFIX) {
            utils::validate_prefix(&prefix)
                .with_context(|| format!("{} is not a usable id prefix", ENV_ID_PREFIX))?;
            config.id_prefix = prefix;
        }

        Ok(config)
    }

    pub fn open_store(&self) -> anyhow::Result<SledContractRepository> {
        let db = sled::Config::new()
            .path(&self.db_path)
            .temporary(self.temporary)
            .open()
            .with_context(|| format!("opening contract store at {}", self.db_path.display()))?;

        SledContractRepository::new(Arc::new(db)).context("opening contracts tree")
    }
}

fn parse_flag(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(anyhow::anyhow!("expected a boolean, got '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reads_every_key() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/tmp/contracts-test.db"),
            (ENV_DB_TEMPORARY, "TRUE"),
            (ENV_ID_PREFIX, "job_"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/contracts-test.db"));
        assert!(config.temporary);
        assert_eq!(config.id_prefix, "job_");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup_from(&[(ENV_DB_TEMPORARY, "maybe")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[(ENV_ID_PREFIX, "")])).is_err());
    }

    #[test]
    fn opens_temporary_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            db_path: dir.path().join("store.db"),
            temporary: true,
            ..Config::default()
        };

        assert!(config.open_store().is_ok());
    }
}
