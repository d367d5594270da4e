//! JSON 레코드 디코더
//!
//! 한 줄의 JSON 객체를 평탄한 문자열 레코드로 변환합니다.
//! 최상위 값은 반드시 객체여야 하며, 값이 문자열이 아닌 필드는
//! [`NonStringPolicy`]에 따라 거부하거나 문자열로 변환합니다.
//!
//! # 사용 예시
//! ```ignore
//! use ndfilter_pipeline::decoder::JsonRecordDecoder;
//! use ndfilter_core::pipeline::RecordDecoder;
//!
//! let decoder = JsonRecordDecoder::default();
//! let record = decoder.decode(br#"{"id":"1","status":"ok"}"#)?;
//! assert_eq!(record.get("status"), Some("ok"));
//! ```

use std::collections::BTreeMap;

use ndfilter_core::error::NdfilterError;
use ndfilter_core::pipeline::RecordDecoder;
use ndfilter_core::record::Record;
use serde_json::Value;

use crate::config::NonStringPolicy;
use crate::error::FilterPipelineError;

/// JSON 레코드 디코더
///
/// 내부 상태가 없으므로 여러 워커가 `Arc`로 공유합니다.
#[derive(Debug, Clone)]
pub struct JsonRecordDecoder {
    /// 비문자열 값 처리 정책
    non_string: NonStringPolicy,
    /// 최대 허용 입력 크기 (바이트)
    max_input_size: usize,
}

impl JsonRecordDecoder {
    /// 지정한 비문자열 정책으로 새 디코더를 생성합니다.
    pub fn new(non_string: NonStringPolicy) -> Self {
        Self {
            non_string,
            max_input_size: 1024 * 1024, // 1MB
        }
    }

    /// 최대 입력 크기를 설정합니다.
    pub fn with_max_input_size(mut self, size: usize) -> Self {
        self.max_input_size = size;
        self
    }

    /// 현재 비문자열 정책
    pub fn non_string_policy(&self) -> NonStringPolicy {
        self.non_string
    }

    /// JSON 바이트를 디코딩하여 `Record`를 생성합니다.
    pub fn decode_line(&self, raw: &[u8]) -> Result<Record, FilterPipelineError> {
        if raw.len() > self.max_input_size {
            return Err(FilterPipelineError::LineTooLarge {
                size: raw.len(),
                max: self.max_input_size,
            });
        }

        let value: Value = serde_json::from_slice(raw).map_err(|e| FilterPipelineError::Decode {
            format: "json".to_owned(),
            offset: e.column(),
            reason: e.to_string(),
        })?;

        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(FilterPipelineError::NotAnObject {
                    found: json_type_name(&other).to_owned(),
                });
            }
        };

        let mut fields = BTreeMap::new();
        for (key, val) in object {
            let text = match val {
                Value::String(s) => s,
                other => match self.non_string {
                    NonStringPolicy::Reject => {
                        return Err(FilterPipelineError::TypeMismatch {
                            field: key,
                            found: json_type_name(&other).to_owned(),
                        });
                    }
                    NonStringPolicy::Stringify => stringify(&other),
                },
            };
            fields.insert(key, text);
        }

        Ok(Record::new(fields))
    }
}

impl Default for JsonRecordDecoder {
    fn default() -> Self {
        Self::new(NonStringPolicy::default())
    }
}

impl RecordDecoder for JsonRecordDecoder {
    fn format_name(&self) -> &str {
        "json"
    }

    fn decode(&self, raw: &[u8]) -> Result<Record, NdfilterError> {
        self.decode_line(raw).map_err(NdfilterError::from)
    }
}

/// 비문자열 값을 문자열로 변환합니다.
///
/// 숫자/불리언은 JSON 텍스트, `null`은 빈 문자열, 배열/객체는 압축 JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
