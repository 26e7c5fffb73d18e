use crate::core::{MapSqlError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Connection credentials parsed from a YAML/JSON file or an in-memory
/// mapping. Consumed when a connection is opened and not retained.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    pub db: String,
    pub host: String,
    pub charset: String,
}

/// Supported credential file formats, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFormat {
    Yaml,
    Json,
}

impl CredentialFormat {
    /// Detects the credential format from a file extension
    /// (case-insensitive `.yaml` or `.json`). Any other extension is
    /// rejected as a configuration error.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            MapSqlError::Config(format!("no file extension on '{}'", path.display()))
        })?;

        if ext.eq_ignore_ascii_case("yaml") {
            Ok(CredentialFormat::Yaml)
        } else if ext.eq_ignore_ascii_case("json") {
            Ok(CredentialFormat::Json)
        } else {
            Err(MapSqlError::Config(format!(
                "unsupported credential file extension '.{}'",
                ext
            )))
        }
    }
}

impl Credentials {
    /// Loads credentials from a YAML or JSON file at the given path.
    ///
    /// The file extension selects the loader. The file must contain a
    /// mapping with the keys `user`, `password`, `db`, `host` and
    /// `charset`.
    ///
    /// # Errors
    ///
    /// Returns `MapSqlError::Config` for an unsupported extension or an
    /// unparsable file, `MapSqlError::Io` if the file cannot be read.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = CredentialFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;

        let credentials: Credentials = match format {
            CredentialFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| {
                MapSqlError::Config(format!("invalid YAML credentials in '{}': {}", path.display(), e))
            })?,
            CredentialFormat::Json => serde_json::from_str(&content).map_err(|e| {
                MapSqlError::Config(format!("invalid JSON credentials in '{}': {}", path.display(), e))
            })?,
        };

        debug!(
            "loaded credentials for {}@{}/{} from {}",
            credentials.user,
            credentials.host,
            credentials.db,
            path.display()
        );
        Ok(credentials)
    }

    /// Builds credentials from an in-memory mapping with the same five
    /// required keys as the file format. Every value must be a string.
    pub fn from_map(map: &serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let field = |key: &str| -> Result<String> {
            map.get(key)
                .and_then(|v| v.as_str())
                .map(String::from)
                .ok_or_else(|| {
                    MapSqlError::Config(format!("credential mapping missing string key '{}'", key))
                })
        };

        Ok(Credentials {
            user: field("user")?,
            password: field("password")?,
            db: field("db")?,
            host: field("host")?,
            charset: field("charset")?,
        })
    }
}
