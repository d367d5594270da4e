//! 설정 관리 -- ndfilter.toml 파싱 및 런타임 설정
//!
//! [`NdfilterConfig`]는 로깅과 필터 파이프라인 설정을 담는 최상위 구조체입니다.
//! 한 번 구성된 뒤에는 변경되지 않으며, 각 실행 단위에 참조로 전달됩니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`NDFILTER_FILTER_CONCURRENCY=8` 형식)
//! 3. 설정 파일 (`ndfilter.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), ndfilter_core::error::NdfilterError> {
//! use ndfilter_core::config::NdfilterConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = NdfilterConfig::load("ndfilter.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = NdfilterConfig::parse("[filter]\nformat = \"csv\"")?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, NdfilterError};

/// 허용되는 로그 레벨
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
/// 허용되는 로그 형식
pub const LOG_FORMATS: &[&str] = &["json", "pretty"];
/// 허용되는 출력 형식
pub const OUTPUT_FORMATS: &[&str] = &["json", "csv"];
/// 허용되는 출력 순서
pub const OUTPUT_ORDERS: &[&str] = &["arrival", "input"];
/// 허용되는 비문자열 값 처리 정책
pub const NON_STRING_POLICIES: &[&str] = &["reject", "stringify"];

const MAX_CONCURRENCY: usize = 1024;
const MAX_CHANNEL_CAPACITY: usize = 1_000_000;
const MAX_LINE_BYTES: usize = 64 * 1024 * 1024;

/// ndfilter 통합 설정
///
/// `ndfilter.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NdfilterConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 필터 파이프라인 설정
    #[serde(default)]
    pub filter: FilterConfig,
}

impl NdfilterConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, NdfilterError> {
        let mut config = Self::from_file(path).await?;
        for warning in config.apply_env_overrides() {
            warning.log();
        }
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    ///
    /// 검증은 하지 않습니다. 이후 오버라이드가 잘못된 값을 고칠 수 있으므로
    /// 호출자가 모든 오버라이드를 적용한 뒤 [`validate`](Self::validate)를 호출합니다.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, NdfilterError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                NdfilterError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                NdfilterError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, NdfilterError> {
        toml::from_str(toml_str).map_err(|e| {
            NdfilterError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `NDFILTER_{SECTION}_{FIELD}`
    /// 예: `NDFILTER_FILTER_FORMAT=csv`
    ///
    /// 파싱할 수 없는 값은 무시하고 [`EnvOverrideWarning`]으로 반환합니다.
    /// 로깅 초기화 전에 호출될 수 있으므로 직접 로그를 남기지 않습니다.
    pub fn apply_env_overrides(&mut self) -> Vec<EnvOverrideWarning> {
        let mut warnings = Vec::new();

        // General
        override_string(&mut self.general.log_level, "NDFILTER_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "NDFILTER_GENERAL_LOG_FORMAT");

        // Filter
        warnings.extend(override_json_map(
            &mut self.filter.filters,
            "NDFILTER_FILTER_FILTERS",
        ));
        warnings.extend(override_usize(
            &mut self.filter.concurrency,
            "NDFILTER_FILTER_CONCURRENCY",
        ));
        override_csv(&mut self.filter.project, "NDFILTER_FILTER_PROJECT");
        override_string(&mut self.filter.format, "NDFILTER_FILTER_FORMAT");
        override_string(&mut self.filter.order, "NDFILTER_FILTER_ORDER");
        override_string(&mut self.filter.non_string, "NDFILTER_FILTER_NON_STRING");
        warnings.extend(override_usize(
            &mut self.filter.channel_capacity,
            "NDFILTER_FILTER_CHANNEL_CAPACITY",
        ));
        warnings.extend(override_usize(
            &mut self.filter.max_line_bytes,
            "NDFILTER_FILTER_MAX_LINE_BYTES",
        ));

        warnings
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), NdfilterError> {
        check_one_of("general.log_level", &self.general.log_level, LOG_LEVELS)?;
        check_one_of("general.log_format", &self.general.log_format, LOG_FORMATS)?;
        self.filter.validate()?;
        Ok(())
    }
}

/// 무시된 환경변수 오버라이드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvOverrideWarning {
    /// 환경변수 이름
    pub env_key: String,
    /// 환경변수 값
    pub value: String,
    /// 무시된 이유
    pub reason: String,
}

impl EnvOverrideWarning {
    /// 경고 로그로 남깁니다.
    pub fn log(&self) {
        warn!(
            env_key = self.env_key.as_str(),
            value = self.value.as_str(),
            reason = self.reason.as_str(),
            "ignoring unparsable env override"
        );
    }
}

impl fmt::Display for EnvOverrideWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ignoring {}='{}': {}",
            self.env_key, self.value, self.reason
        )
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 필터 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// 필드 이름 → 정규식 패턴 (비어 있으면 모든 레코드 통과)
    pub filters: BTreeMap<String, String>,
    /// 워커 수
    pub concurrency: usize,
    /// 출력할 필드 목록 (비어 있으면 전체 필드)
    pub project: Vec<String>,
    /// 출력 형식 (json, csv)
    pub format: String,
    /// 출력 순서 (arrival, input)
    pub order: String,
    /// 문자열이 아닌 JSON 값 처리 (reject, stringify)
    pub non_string: String,
    /// 작업/결과 채널 용량
    pub channel_capacity: usize,
    /// 한 줄의 최대 바이트 수
    pub max_line_bytes: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            filters: BTreeMap::new(),
            concurrency: 4,
            project: Vec::new(),
            format: "json".to_owned(),
            order: "arrival".to_owned(),
            non_string: "reject".to_owned(),
            channel_capacity: 1024,
            max_line_bytes: 1024 * 1024, // 1MB
        }
    }
}

impl FilterConfig {
    /// 필터 섹션을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::InvalidValue {
                field: "filter.concurrency".to_owned(),
                reason: format!("must be 1-{}", MAX_CONCURRENCY),
            });
        }

        if self.channel_capacity == 0 || self.channel_capacity > MAX_CHANNEL_CAPACITY {
            return Err(ConfigError::InvalidValue {
                field: "filter.channel_capacity".to_owned(),
                reason: format!("must be 1-{}", MAX_CHANNEL_CAPACITY),
            });
        }

        if self.max_line_bytes == 0 || self.max_line_bytes > MAX_LINE_BYTES {
            return Err(ConfigError::InvalidValue {
                field: "filter.max_line_bytes".to_owned(),
                reason: format!("must be 1-{}", MAX_LINE_BYTES),
            });
        }

        check_one_of("filter.format", &self.format, OUTPUT_FORMATS)?;
        check_one_of("filter.order", &self.order, OUTPUT_ORDERS)?;
        check_one_of("filter.non_string", &self.non_string, NON_STRING_POLICIES)?;

        if self.filters.keys().any(|field| field.is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "filter.filters".to_owned(),
                reason: "field name must not be empty".to_owned(),
            });
        }

        Ok(())
    }
}

fn check_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: format!("'{}' is not one of: {}", value, allowed.join(", ")),
    })
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) -> Option<EnvOverrideWarning> {
    let val = std::env::var(env_key).ok()?;
    match val.parse::<usize>() {
        Ok(parsed) => {
            *target = parsed;
            None
        }
        Err(e) => Some(EnvOverrideWarning {
            env_key: env_key.to_owned(),
            value: val,
            reason: format!("not an unsigned integer: {e}"),
        }),
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

fn override_json_map(
    target: &mut BTreeMap<String, String>,
    env_key: &str,
) -> Option<EnvOverrideWarning> {
    let val = std::env::var(env_key).ok()?;
    match serde_json::from_str::<BTreeMap<String, String>>(&val) {
        Ok(parsed) => {
            *target = parsed;
            None
        }
        Err(e) => Some(EnvOverrideWarning {
            env_key: env_key.to_owned(),
            value: val,
            reason: format!("not a JSON object of strings: {e}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = NdfilterConfig::default();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.log_format, "pretty");
        assert!(config.filter.filters.is_empty());
        assert_eq!(config.filter.concurrency, 4);
        assert!(config.filter.project.is_empty());
        assert_eq!(config.filter.format, "json");
        assert_eq!(config.filter.order, "arrival");
        assert_eq!(config.filter.non_string, "reject");
    }

    #[test]
    fn default_config_passes_validation() {
        NdfilterConfig::default().validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = NdfilterConfig::parse("").unwrap();
        assert_eq!(config.filter.concurrency, 4);
        assert_eq!(config.filter.channel_capacity, 1024);
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[filter]
format = "csv"
project = ["id", "status"]

[filter.filters]
status = "^ok$"
"#;
        let config = NdfilterConfig::parse(toml).unwrap();
        assert_eq!(config.filter.format, "csv");
        assert_eq!(config.filter.project, vec!["id", "status"]);
        assert_eq!(config.filter.filters.get("status").unwrap(), "^ok$");
        // 나머지는 기본값 유지
        assert_eq!(config.filter.concurrency, 4);
        assert_eq!(config.general.log_level, "warn");
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let err = NdfilterConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            NdfilterError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_unknown_format() {
        let mut config = NdfilterConfig::default();
        config.filter.format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("filter.format"));
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = NdfilterConfig::default();
        config.filter.concurrency = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn validate_rejects_zero_channel_capacity() {
        let mut config = NdfilterConfig::default();
        config.filter.channel_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_order_and_policy() {
        let mut config = NdfilterConfig::default();
        config.filter.order = "random".to_owned();
        assert!(config.validate().unwrap_err().to_string().contains("order"));

        let mut config = NdfilterConfig::default();
        config.filter.non_string = "coerce".to_owned();
        assert!(
            config
                .validate()
                .unwrap_err()
                .to_string()
                .contains("non_string")
        );
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = NdfilterConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_empty_filter_field() {
        let mut config = NdfilterConfig::default();
        config.filter.filters.insert(String::new(), "x".to_owned());
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn env_override_usize() {
        let mut val = 4;
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_NDFILTER_USIZE", "16") };
        assert!(override_usize(&mut val, "TEST_NDFILTER_USIZE").is_none());
        assert_eq!(val, 16);
        unsafe { std::env::remove_var("TEST_NDFILTER_USIZE") };
    }

    #[test]
    #[serial]
    fn env_override_usize_invalid_keeps_original() {
        let mut val = 4;
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_NDFILTER_USIZE_BAD", "many") };
        let warning = override_usize(&mut val, "TEST_NDFILTER_USIZE_BAD").unwrap();
        assert_eq!(val, 4);
        assert_eq!(warning.env_key, "TEST_NDFILTER_USIZE_BAD");
        assert_eq!(warning.value, "many");
        assert!(warning.to_string().contains("TEST_NDFILTER_USIZE_BAD"));
        unsafe { std::env::remove_var("TEST_NDFILTER_USIZE_BAD") };
    }

    #[test]
    #[serial]
    fn env_override_csv_drops_empty_entries() {
        let mut val = Vec::new();
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_NDFILTER_CSV", "id, ,status,") };
        override_csv(&mut val, "TEST_NDFILTER_CSV");
        assert_eq!(val, vec!["id", "status"]);
        unsafe { std::env::remove_var("TEST_NDFILTER_CSV") };
    }

    #[test]
    #[serial]
    fn env_override_json_map() {
        let mut val = BTreeMap::new();
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_NDFILTER_MAP", r#"{"status":"ok"}"#) };
        assert!(override_json_map(&mut val, "TEST_NDFILTER_MAP").is_none());
        assert_eq!(val.get("status").map(String::as_str), Some("ok"));
        unsafe { std::env::remove_var("TEST_NDFILTER_MAP") };
    }

    #[test]
    #[serial]
    fn env_override_json_map_invalid_keeps_original() {
        let mut val = BTreeMap::from([("a".to_owned(), "b".to_owned())]);
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_NDFILTER_MAP_BAD", "[1,2]") };
        assert!(override_json_map(&mut val, "TEST_NDFILTER_MAP_BAD").is_some());
        assert_eq!(val.len(), 1);
        unsafe { std::env::remove_var("TEST_NDFILTER_MAP_BAD") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_NDFILTER_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let mut config = NdfilterConfig::default();
        config
            .filter
            .filters
            .insert("level".to_owned(), "warn|error".to_owned());
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = NdfilterConfig::parse(&toml_str).unwrap();
        assert_eq!(parsed.filter.filters, config.filter.filters);
        assert_eq!(parsed.filter.concurrency, config.filter.concurrency);
    }

    #[tokio::test]
    async fn from_file_defers_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ndfilter.toml");
        std::fs::write(&path, "[filter]\nconcurrency = 0\n").unwrap();

        let config = NdfilterConfig::from_file(&path).await.unwrap();
        assert_eq!(config.filter.concurrency, 0);
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let err = NdfilterConfig::from_file("/nonexistent/path/ndfilter.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NdfilterError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
