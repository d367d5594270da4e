//! ndfilter 공통 크레이트
//!
//! 파이프라인 크레이트와 CLI가 함께 사용하는 레코드 타입, 에러 분류,
//! 설정 구조체, 확장 trait, 메트릭 이름을 정의합니다.
//!
//! # 모듈 구성
//!
//! - [`record`]: 한 줄의 JSON에서 디코딩된 불변 레코드
//! - [`pipeline`]: 디코더 / 필터 / 렌더러 trait
//! - [`config`]: `ndfilter.toml` 파싱 및 검증
//! - [`error`]: 도메인별 에러 타입
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod record;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, DecodeError, NdfilterError, PipelineError, RenderError};

// 설정
pub use config::{EnvOverrideWarning, FilterConfig, GeneralConfig, NdfilterConfig};

// 파이프라인 trait
pub use pipeline::{RecordDecoder, RecordPredicate, RecordRenderer};

// 도메인 타입
pub use record::Record;
