use crate::adapters::{FileStore, MemoryStore, StoreClient};
use crate::core::history::DEFAULT_HISTORY_LIMIT;
use crate::core::service::{ReportZone, DEFAULT_WINDOW_DAYS};
use crate::utils::error::{OmikujiError, Result};
use crate::utils::validation::{
    require_fields, validate_identifier, validate_path, validate_positive_number, Validate,
};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OmikujiConfig {
    pub store: StoreConfig,
    pub history: HistoryConfig,
    pub stats: StatsConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory holding the collection file; required for the file backend.
    pub path: Option<String>,
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            path: None,
            collection: "results".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub default_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_HISTORY_LIMIT.get(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub default_window_days: u32,
    /// e.g. "+09:00"; the machine's local zone when absent.
    pub utc_offset: Option<String>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            default_window_days: DEFAULT_WINDOW_DAYS,
            utc_offset: None,
        }
    }
}

impl OmikujiConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OmikujiError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| OmikujiError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OMIKUJI_DATA})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| OmikujiError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn report_zone(&self) -> Result<ReportZone> {
        match self.stats.utc_offset.as_deref().map(str::trim) {
            None | Some("") => Ok(ReportZone::Local),
            Some(raw) => parse_utc_offset(raw).map(ReportZone::Fixed),
        }
    }
}

/// Accepts `Z`, `UTC`, `+09:00` and `+0900`.
fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    use regex::Regex;
    let invalid = |reason: &str| OmikujiError::InvalidConfigValueError {
        field: "stats.utc_offset".to_string(),
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    if raw == "Z" || raw.eq_ignore_ascii_case("UTC") {
        return FixedOffset::east_opt(0).ok_or_else(|| invalid("offset out of range"));
    }

    let re = Regex::new(r"^([+-])(\d{2}):?(\d{2})$").map_err(|e| OmikujiError::ConfigError {
        message: format!("offset pattern: {}", e),
    })?;
    let caps = re
        .captures(raw)
        .ok_or_else(|| invalid("expected an offset like +09:00"))?;

    let hours: i32 = caps[2].parse().map_err(|_| invalid("bad hours"))?;
    let minutes: i32 = caps[3].parse().map_err(|_| invalid("bad minutes"))?;
    if hours > 23 || minutes > 59 {
        return Err(invalid("offset out of range"));
    }

    let seconds = (hours * 3600 + minutes * 60) * if &caps[1] == "-" { -1 } else { 1 };
    FixedOffset::east_opt(seconds).ok_or_else(|| invalid("offset out of range"))
}

impl StoreConfig {
    fn validate_store(&self) -> Result<()> {
        require_fields(&[(
            "store.path",
            self.backend != StoreBackend::File || self.path.is_some(),
        )])?;

        if let Some(path) = &self.path {
            validate_path("store.path", path)?;
        }
        validate_identifier("store.collection", &self.collection)
    }

    /// Validates eagerly and builds the one store client the process uses.
    pub fn connect(&self) -> Result<StoreClient> {
        self.validate_store()?;

        let client = match (self.backend, self.path.as_deref()) {
            (StoreBackend::Memory, _) => StoreClient::Memory(MemoryStore::new()),
            (StoreBackend::File, Some(path)) => StoreClient::File(FileStore::new(path, &self.collection)),
            (StoreBackend::File, None) => {
                return Err(OmikujiError::MissingConfigError {
                    fields: vec!["store.path".to_string()],
                })
            }
        };

        tracing::info!(
            "🗄️ Connected {} store (collection '{}')",
            client.backend_name(),
            self.collection
        );
        Ok(client)
    }
}

impl Validate for OmikujiConfig {
    fn validate(&self) -> Result<()> {
        self.store.validate_store()?;
        validate_positive_number("history.default_limit", self.history.default_limit, 1)?;
        self.report_zone()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[store]
backend = "file"
path = "./data"
collection = "draws"

[history]
default_limit = 10

[stats]
default_window_days = 30
utc_offset = "+09:00"
"#;

        let config = OmikujiConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.store.path.as_deref(), Some("./data"));
        assert_eq!(config.store.collection, "draws");
        assert_eq!(config.history.default_limit, 10);
        assert_eq!(config.stats.default_window_days, 30);
        assert_eq!(
            config.report_zone().unwrap(),
            ReportZone::Fixed(FixedOffset::east_opt(9 * 3600).unwrap())
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = OmikujiConfig::from_toml_str("").unwrap();
        assert_eq!(config.store.collection, "results");
        assert_eq!(config.history.default_limit, 5);
        assert_eq!(config.stats.default_window_days, 7);
        assert_eq!(config.report_zone().unwrap(), ReportZone::Local);
    }

    #[test]
    fn test_file_backend_without_path_fails_eagerly() {
        let config = OmikujiConfig::from_toml_str("[store]\nbackend = \"file\"\n").unwrap();

        match config.store.connect() {
            Err(OmikujiError::MissingConfigError { fields }) => {
                assert_eq!(fields, vec!["store.path"]);
            }
            other => panic!("expected MissingConfigError, got {:?}", other),
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_memory_backend_needs_no_path() {
        let config = OmikujiConfig::from_toml_str("[store]\nbackend = \"memory\"\n").unwrap();
        let client = config.store.connect().unwrap();
        assert_eq!(client.backend_name(), "memory");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("OMIKUJI_TEST_DATA_DIR", "/tmp/omikuji-test");

        let config =
            OmikujiConfig::from_toml_str("[store]\npath = \"${OMIKUJI_TEST_DATA_DIR}\"\n").unwrap();
        assert_eq!(config.store.path.as_deref(), Some("/tmp/omikuji-test"));

        std::env::remove_var("OMIKUJI_TEST_DATA_DIR");
    }

    #[test]
    fn test_unset_env_var_is_rejected_by_validation() {
        let config =
            OmikujiConfig::from_toml_str("[store]\npath = \"${OMIKUJI_SURELY_UNSET_VAR}\"\n").unwrap();
        assert!(config.store.connect().is_err());
    }

    #[test]
    fn test_invalid_values() {
        let bad_offset = OmikujiConfig::from_toml_str(
            "[store]\nbackend = \"memory\"\n[stats]\nutc_offset = \"Tokyo\"\n",
        )
        .unwrap();
        assert!(bad_offset.validate().is_err());

        let bad_limit = OmikujiConfig::from_toml_str(
            "[store]\nbackend = \"memory\"\n[history]\ndefault_limit = 0\n",
        )
        .unwrap();
        assert!(bad_limit.validate().is_err());

        assert!(OmikujiConfig::from_toml_str("[store]\nbackend = \"firestore\"\n").is_err());
    }

    #[test]
    fn test_parse_utc_offset_forms() {
        assert_eq!(parse_utc_offset("Z").unwrap(), FixedOffset::east_opt(0).unwrap());
        assert_eq!(
            parse_utc_offset("+0530").unwrap(),
            FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
        );
        assert_eq!(
            parse_utc_offset("-08:00").unwrap(),
            FixedOffset::west_opt(8 * 3600).unwrap()
        );
        assert!(parse_utc_offset("+24:00").is_err());
        assert!(parse_utc_offset("9").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[store]\nbackend = \"memory\"\ncollection = \"from_file\"\n")
            .unwrap();

        let config = OmikujiConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.store.collection, "from_file");
        assert_eq!(config.store.backend, StoreBackend::Memory);
    }
}
