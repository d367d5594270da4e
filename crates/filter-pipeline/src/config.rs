//! 필터 파이프라인 설정
//!
//! [`PipelineConfig`]는 core의 [`FilterConfig`](ndfilter_core::config::FilterConfig)를
//! 기반으로 문자열 설정값을 타입이 있는 열거형으로 변환한 실행 설정입니다.
//!
//! # 사용 예시
//! ```ignore
//! use ndfilter_core::config::NdfilterConfig;
//! use ndfilter_pipeline::config::PipelineConfig;
//!
//! let core_config = NdfilterConfig::default();
//! let config = PipelineConfig::from_core(&core_config.filter)?;
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FilterPipelineError;

/// 출력 형식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `{"k": "v"}` 형식의 JSON 한 줄 (기본값)
    #[default]
    Json,
    /// 키 사전순 값들의 CSV 한 줄
    Csv,
}

impl OutputFormat {
    /// 설정 파일에서 사용하는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = FilterPipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(FilterPipelineError::Config {
                field: "format".to_owned(),
                reason: format!("unsupported output format '{other}' (expected json or csv)"),
            }),
        }
    }
}

/// 출력 순서
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputOrder {
    /// 워커가 결과를 보낸 순서 그대로 (기본값)
    #[default]
    Arrival,
    /// 입력 라인 순서로 재정렬
    Input,
}

impl OutputOrder {
    /// 설정 파일에서 사용하는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arrival => "arrival",
            Self::Input => "input",
        }
    }
}

impl fmt::Display for OutputOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputOrder {
    type Err = FilterPipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arrival" => Ok(Self::Arrival),
            "input" => Ok(Self::Input),
            other => Err(FilterPipelineError::Config {
                field: "order".to_owned(),
                reason: format!("unsupported output order '{other}' (expected arrival or input)"),
            }),
        }
    }
}

/// 문자열이 아닌 JSON 값 처리 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonStringPolicy {
    /// 레코드 전체를 디코딩 실패로 처리 (기본값)
    #[default]
    Reject,
    /// JSON 텍스트로 변환하여 유지
    Stringify,
}

impl NonStringPolicy {
    /// 설정 파일에서 사용하는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Stringify => "stringify",
        }
    }
}

impl fmt::Display for NonStringPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NonStringPolicy {
    type Err = FilterPipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reject" => Ok(Self::Reject),
            "stringify" => Ok(Self::Stringify),
            other => Err(FilterPipelineError::Config {
                field: "non_string".to_owned(),
                reason: format!(
                    "unsupported non-string policy '{other}' (expected reject or stringify)"
                ),
            }),
        }
    }
}

/// 필터 파이프라인 실행 설정
///
/// 한 번 구성된 뒤 변경되지 않으며, 파이프라인이 각 실행 단위에 나눠 줍니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 필드 이름 → 정규식 패턴
    pub filters: BTreeMap<String, String>,
    /// 워커 수
    pub concurrency: usize,
    /// 출력할 필드 목록 (비어 있으면 전체)
    pub project: Vec<String>,
    /// 출력 형식
    pub format: OutputFormat,
    /// 출력 순서
    pub order: OutputOrder,
    /// 비문자열 값 처리 정책
    pub non_string: NonStringPolicy,
    /// 작업/결과 채널 용량
    pub channel_capacity: usize,
    /// 한 줄의 최대 바이트 수
    pub max_line_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            filters: BTreeMap::new(),
            concurrency: 4,
            project: Vec::new(),
            format: OutputFormat::Json,
            order: OutputOrder::Arrival,
            non_string: NonStringPolicy::Reject,
            channel_capacity: 1024,
            max_line_bytes: 1024 * 1024,
        }
    }
}

impl PipelineConfig {
    /// core의 `FilterConfig`에서 파이프라인 설정을 생성합니다.
    ///
    /// 문자열 열거값을 파싱하고 범위를 검증합니다.
    pub fn from_core(core: &ndfilter_core::config::FilterConfig) -> Result<Self, FilterPipelineError> {
        let config = Self {
            filters: core.filters.clone(),
            concurrency: core.concurrency,
            project: core.project.clone(),
            format: core.format.parse()?,
            order: core.order.parse()?,
            non_string: core.non_string.parse()?,
            channel_capacity: core.channel_capacity,
            max_line_bytes: core.max_line_bytes,
        };
        config.validate()?;
        Ok(config)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), FilterPipelineError> {
        const MAX_CONCURRENCY: usize = 1024;
        const MAX_CHANNEL_CAPACITY: usize = 1_000_000;

        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(FilterPipelineError::Config {
                field: "concurrency".to_owned(),
                reason: format!("must be 1-{}", MAX_CONCURRENCY),
            });
        }

        if self.channel_capacity == 0 || self.channel_capacity > MAX_CHANNEL_CAPACITY {
            return Err(FilterPipelineError::Config {
                field: "channel_capacity".to_owned(),
                reason: format!("must be 1-{}", MAX_CHANNEL_CAPACITY),
            });
        }

        if self.max_line_bytes == 0 {
            return Err(FilterPipelineError::Config {
                field: "max_line_bytes".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}

/// 파이프라인 설정 빌더
///
/// 3개 이상의 설정 필드가 있으므로 빌더 패턴을 사용합니다.
#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 필드 필터 하나를 추가합니다.
    pub fn filter(mut self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.config.filters.insert(field.into(), pattern.into());
        self
    }

    /// 필드 필터 전체를 설정합니다.
    pub fn filters(mut self, filters: BTreeMap<String, String>) -> Self {
        self.config.filters = filters;
        self
    }

    /// 워커 수를 설정합니다.
    pub fn concurrency(mut self, workers: usize) -> Self {
        self.config.concurrency = workers;
        self
    }

    /// 출력 필드 목록을 설정합니다.
    pub fn project<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.project = fields.into_iter().map(Into::into).collect();
        self
    }

    /// 출력 형식을 설정합니다.
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    /// 출력 순서를 설정합니다.
    pub fn order(mut self, order: OutputOrder) -> Self {
        self.config.order = order;
        self
    }

    /// 비문자열 값 정책을 설정합니다.
    pub fn non_string(mut self, policy: NonStringPolicy) -> Self {
        self.config.non_string = policy;
        self
    }

    /// 채널 용량을 설정합니다.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// 최대 라인 길이를 설정합니다.
    pub fn max_line_bytes(mut self, max: usize) -> Self {
        self.config.max_line_bytes = max;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    pub fn build(self) -> Result<PipelineConfig, FilterPipelineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
