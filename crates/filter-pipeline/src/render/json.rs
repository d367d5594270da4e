//! JSON 렌더러
//!
//! 키 사전순, 키와 값 사이 `": "`, 쌍 사이 `", "`를 사용합니다.
//! 키와 값은 표준 JSON 문자열 이스케이프를 거칩니다.

use ndfilter_core::error::NdfilterError;
use ndfilter_core::pipeline::RecordRenderer;
use ndfilter_core::record::Record;

use crate::error::FilterPipelineError;

/// `{"k": "v", ...}` 형식 렌더러
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    /// 새 렌더러를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// 레코드를 한 줄의 JSON 텍스트로 변환합니다.
    pub fn render_line(&self, record: &Record) -> Result<String, FilterPipelineError> {
        let mut line = String::with_capacity(2 + record.len() * 16);
        line.push('{');
        for (idx, (key, value)) in record.iter().enumerate() {
            if idx > 0 {
                line.push_str(", ");
            }
            line.push_str(&quote(key)?);
            line.push_str(": ");
            line.push_str(&quote(value)?);
        }
        line.push('}');
        Ok(line)
    }
}

impl RecordRenderer for JsonRenderer {
    fn format_name(&self) -> &str {
        "json"
    }

    fn render(&self, record: &Record) -> Result<String, NdfilterError> {
        self.render_line(record).map_err(NdfilterError::from)
    }
}

fn quote(text: &str) -> Result<String, FilterPipelineError> {
    serde_json::to_string(text).map_err(|e| FilterPipelineError::Render {
        format: "json".to_owned(),
        reason: e.to_string(),
    })
}
