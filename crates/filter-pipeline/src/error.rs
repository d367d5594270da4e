//! 필터 파이프라인 에러 타입
//!
//! [`FilterPipelineError`]는 필터 파이프라인 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<FilterPipelineError> for NdfilterError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use ndfilter_core::error::{ConfigError, DecodeError, NdfilterError, PipelineError, RenderError};

/// 필터 파이프라인 도메인 에러
///
/// 레코드 단위 에러(디코딩, 타입 불일치, 렌더링)와 실행 전체를 중단시키는
/// 에러(설정, 입력/출력 I/O, 워커 실패)를 함께 포괄합니다.
#[derive(Debug, thiserror::Error)]
pub enum FilterPipelineError {
    /// 입력 라인 디코딩 실패
    #[error("decode error: {format} at column {offset}: {reason}")]
    Decode {
        /// 디코더 형식 (json 등)
        format: String,
        /// 실패 위치 (열 번호)
        offset: usize,
        /// 실패 사유
        reason: String,
    },

    /// 최상위 값이 객체가 아님
    #[error("not an object: found {found}")]
    NotAnObject {
        /// 실제 JSON 타입
        found: String,
    },

    /// 문자열이 아닌 필드 값 (reject 정책)
    #[error("type mismatch: field '{field}' is {found}")]
    TypeMismatch {
        /// 필드 이름
        field: String,
        /// 실제 JSON 타입
        found: String,
    },

    /// 최대 라인 길이 초과
    #[error("line too large: {size} bytes (max: {max})")]
    LineTooLarge {
        /// 라인 크기
        size: usize,
        /// 허용 최대 크기
        max: usize,
    },

    /// 필터 명세 파싱 실패
    #[error("invalid filter spec: {0}")]
    FilterSpec(String),

    /// 필터 파일 로딩 실패
    #[error("filter file load error: {path}: {reason}")]
    FilterLoad {
        /// 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 렌더링 실패
    #[error("render error: {format}: {reason}")]
    Render {
        /// 출력 형식
        format: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 입력 스트림 읽기 실패
    #[error("input error: {0}")]
    Input(#[source] std::io::Error),

    /// 출력 스트림 쓰기 실패
    #[error("output error: {0}")]
    Output(#[source] std::io::Error),

    /// 워커 태스크 실패 (panic 등)
    #[error("worker error: {0}")]
    Worker(String),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<FilterPipelineError> for NdfilterError {
    fn from(err: FilterPipelineError) -> Self {
        match err {
            FilterPipelineError::Decode { offset, reason, .. } => {
                DecodeError::Malformed { offset, reason }.into()
            }
            FilterPipelineError::NotAnObject { found } => DecodeError::NotAnObject { found }.into(),
            FilterPipelineError::TypeMismatch { field, found } => {
                DecodeError::TypeMismatch { field, found }.into()
            }
            FilterPipelineError::LineTooLarge { size, max } => {
                DecodeError::TooLarge { size, max }.into()
            }
            FilterPipelineError::Render { format, reason } => {
                RenderError::Failed { format, reason }.into()
            }
            FilterPipelineError::FilterSpec(reason) => ConfigError::InvalidValue {
                field: "filter.filters".to_owned(),
                reason,
            }
            .into(),
            FilterPipelineError::FilterLoad { path, reason } => ConfigError::InvalidValue {
                field: "filters_file".to_owned(),
                reason: format!("{path}: {reason}"),
            }
            .into(),
            FilterPipelineError::Config { field, reason } => {
                ConfigError::InvalidValue { field, reason }.into()
            }
            FilterPipelineError::Regex(e) => ConfigError::InvalidValue {
                field: "filter.filters".to_owned(),
                reason: e.to_string(),
            }
            .into(),
            FilterPipelineError::Input(e) => PipelineError::Input(e.to_string()).into(),
            FilterPipelineError::Output(e) => PipelineError::Output(e.to_string()).into(),
            FilterPipelineError::Worker(reason) => PipelineError::Worker(reason).into(),
        }
    }
}
