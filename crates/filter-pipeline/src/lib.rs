//! ndfilter 필터 파이프라인
//!
//! 줄 단위 JSON 입력을 읽어 필드별 정규식으로 필터링하고, 필요한 필드만
//! 남겨 JSON 또는 CSV로 출력하는 동시성 파이프라인입니다.
//!
//! # 모듈 구성
//!
//! - [`decoder`]: JSON 한 줄 → [`Record`](ndfilter_core::Record) 디코더
//! - [`predicate`]: 필드별 정규식 조건 집합 및 필터 명세 로더
//! - [`projector`]: 출력 필드 선택
//! - [`render`]: JSON / CSV 렌더러
//! - [`ingest`]: 입력 수집 단계
//! - [`worker`]: 디코딩/필터/프로젝션 워커
//! - [`output`]: 렌더링 및 쓰기 단계
//! - [`pipeline`]: 전체 파이프라인 오케스트레이션
//! - [`config`]: 파이프라인 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! ingest -> work mpsc -> Worker x N -> result mpsc -> output
//!   |                      |                           |
//! lines            decode/filter/project         render + write
//! ```

pub mod config;
pub mod error;
pub mod item;
pub mod pipeline;

pub mod decoder;
pub mod ingest;
pub mod output;
pub mod predicate;
pub mod projector;
pub mod render;
pub mod worker;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{FilterPipeline, FilterPipelineBuilder, PipelineSummary};

// 설정
pub use config::{
    NonStringPolicy, OutputFormat, OutputOrder, PipelineConfig, PipelineConfigBuilder,
};

// 에러
pub use error::FilterPipelineError;

// 디코더
pub use decoder::JsonRecordDecoder;

// 필터
pub use predicate::{FieldMatcher, PredicateSet, load_filter_file, parse_filter_spec};

// 프로젝션
pub use projector::Projection;

// 렌더러
pub use render::{CsvRenderer, JsonRenderer, build_renderer};
