//! 레코드 디코딩 모듈
//!
//! 원시 입력 한 줄을 [`Record`](ndfilter_core::Record)로 변환합니다.
//! 각 디코더는 core의 [`RecordDecoder`](ndfilter_core::pipeline::RecordDecoder) trait을 구현합니다.
//!
//! # 지원 형식
//! - 평탄(flat) JSON 객체 ([`JsonRecordDecoder`])

pub mod json;

pub use json::JsonRecordDecoder;
