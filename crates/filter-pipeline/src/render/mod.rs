//! 렌더링 모듈 -- 레코드를 출력 한 줄로 변환
//!
//! 각 렌더러는 core의 [`RecordRenderer`] trait을 구현하며,
//! 필드는 항상 키 사전순으로 출력됩니다. 반환되는 줄에는 줄 끝 문자가 없고,
//! 줄 끝은 출력 단계가 붙입니다.
//!
//! # 지원 형식
//! - `json` ([`JsonRenderer`]): `{"k1": "v1", "k2": "v2"}`
//! - `csv` ([`CsvRenderer`]): 값만, RFC 4180 인용, 헤더 없음

pub mod csv;
pub mod json;

pub use self::csv::CsvRenderer;
pub use self::json::JsonRenderer;

use std::sync::Arc;

use ndfilter_core::pipeline::RecordRenderer;

use crate::config::OutputFormat;

/// 출력 형식에 맞는 렌더러를 생성합니다.
pub fn build_renderer(format: OutputFormat) -> Arc<dyn RecordRenderer> {
    match format {
        OutputFormat::Json => Arc::new(JsonRenderer::new()),
        OutputFormat::Csv => Arc::new(CsvRenderer::new()),
    }
}
