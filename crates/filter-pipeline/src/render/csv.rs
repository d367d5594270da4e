//! CSV 렌더러
//!
//! 값만 키 사전순으로 출력하며 헤더는 없습니다. 구분자, 따옴표, 줄바꿈을
//! 포함한 값은 RFC 4180 규칙으로 인용됩니다. 작성기가 붙인 줄 끝 문자는 제거합니다.

use ndfilter_core::error::NdfilterError;
use ndfilter_core::pipeline::RecordRenderer;
use ndfilter_core::record::Record;

use crate::error::FilterPipelineError;

/// 값 전용 CSV 렌더러
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl CsvRenderer {
    /// 새 렌더러를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// 레코드를 한 줄의 CSV 텍스트로 변환합니다.
    pub fn render_line(&self, record: &Record) -> Result<String, FilterPipelineError> {
        // 필드가 없거나 빈 값 하나뿐이면 빈 줄 (csv 작성기는 `""`로 인용함)
        if record.values().all(str::is_empty) && record.len() <= 1 {
            return Ok(String::new());
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::with_capacity(record.len() * 16));
        writer.write_record(record.values()).map_err(render_error)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| render_error(e.into_error()))?;
        let mut line = String::from_utf8(bytes).map_err(|e| FilterPipelineError::Render {
            format: "csv".to_owned(),
            reason: e.to_string(),
        })?;

        // 작성기의 줄 끝 문자만 제거 (값의 공백은 유지)
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }
}

impl RecordRenderer for CsvRenderer {
    fn format_name(&self) -> &str {
        "csv"
    }

    fn render(&self, record: &Record) -> Result<String, NdfilterError> {
        self.render_line(record).map_err(NdfilterError::from)
    }
}

fn render_error(e: impl std::fmt::Display) -> FilterPipelineError {
    FilterPipelineError::Render {
        format: "csv".to_owned(),
        reason: e.to_string(),
    }
}
