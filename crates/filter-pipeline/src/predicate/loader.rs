//! 필터 명세 로더 -- JSON 객체 문자열/파일에서 필드 → 패턴 맵을 읽습니다.
//!
//! 명세는 `{"field": "pattern", ...}` 형태의 JSON 객체여야 하며
//! 값은 모두 문자열이어야 합니다.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::error::FilterPipelineError;

/// 필터 파일 최대 크기
const MAX_FILTER_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// JSON 객체 문자열을 필드 → 패턴 맵으로 파싱합니다.
///
/// 공백뿐인 문자열은 빈 맵으로 취급합니다.
///
/// # Errors
/// - JSON 문법 오류
/// - 최상위가 객체가 아닌 경우
/// - 문자열이 아닌 값 또는 빈 필드 이름
pub fn parse_filter_spec(spec: &str) -> Result<BTreeMap<String, String>, FilterPipelineError> {
    if spec.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let value: Value = serde_json::from_str(spec)
        .map_err(|e| FilterPipelineError::FilterSpec(format!("invalid JSON: {e}")))?;

    let Value::Object(object) = value else {
        return Err(FilterPipelineError::FilterSpec(
            "expected a JSON object of field -> pattern".to_owned(),
        ));
    };

    let mut filters = BTreeMap::new();
    for (field, pattern) in object {
        if field.is_empty() {
            return Err(FilterPipelineError::FilterSpec(
                "field name must not be empty".to_owned(),
            ));
        }
        match pattern {
            Value::String(pattern) => {
                filters.insert(field, pattern);
            }
            _ => {
                return Err(FilterPipelineError::FilterSpec(format!(
                    "pattern for field '{field}' must be a string"
                )));
            }
        }
    }

    Ok(filters)
}

/// JSON 파일에서 필터 명세를 로드합니다.
pub async fn load_filter_file(
    path: impl AsRef<Path>,
) -> Result<BTreeMap<String, String>, FilterPipelineError> {
    let path = path.as_ref();

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| FilterPipelineError::FilterLoad {
            path: path.display().to_string(),
            reason: format!("failed to read file metadata: {e}"),
        })?;

    if metadata.len() > MAX_FILTER_FILE_SIZE {
        return Err(FilterPipelineError::FilterLoad {
            path: path.display().to_string(),
            reason: format!(
                "file too large: {} bytes (max: {MAX_FILTER_FILE_SIZE})",
                metadata.len()
            ),
        });
    }

    let content =
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FilterPipelineError::FilterLoad {
                path: path.display().to_string(),
                reason: format!("failed to read file: {e}"),
            })?;

    let filters = parse_filter_spec(&content).map_err(|e| FilterPipelineError::FilterLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    tracing::debug!(
        path = %path.display(),
        count = filters.len(),
        "loaded filter file"
    );

    Ok(filters)
}
