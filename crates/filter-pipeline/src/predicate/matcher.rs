//! 필드 매처 -- 단일 (필드, 정규식) 조건 평가
//!
//! [`FieldMatcher`]는 생성 시 정규식을 한 번만 컴파일합니다.
//! 컴파일에 실패한 패턴은 어떤 값과도 일치하지 않습니다.

use ndfilter_core::record::Record;
use regex::Regex;
use tracing::warn;

use crate::error::FilterPipelineError;

/// 필드 하나에 대한 정규식 조건
#[derive(Debug, Clone)]
pub struct FieldMatcher {
    /// 검사할 필드 이름
    field: String,
    /// 원본 패턴 문자열
    pattern: String,
    /// 컴파일된 정규식 (컴파일 실패 시 None)
    regex: Option<Regex>,
}

impl FieldMatcher {
    /// 패턴을 컴파일합니다. 잘못된 패턴이면 에러를 반환합니다.
    pub fn try_compile(
        field: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Result<Self, FilterPipelineError> {
        let pattern = pattern.into();
        let regex = Regex::new(&pattern)?;
        Ok(Self {
            field: field.into(),
            pattern,
            regex: Some(regex),
        })
    }

    /// 패턴을 컴파일합니다.
    ///
    /// 잘못된 패턴은 경고 로그를 남기고, 항상 불일치하는 매처가 됩니다.
    pub fn compile(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        let field = field.into();
        let pattern = pattern.into();
        match Self::try_compile(field.as_str(), pattern.as_str()) {
            Ok(matcher) => matcher,
            Err(e) => {
                warn!(
                    field = %field,
                    pattern = %pattern,
                    error = %e,
                    "invalid filter pattern, field will never match"
                );
                Self {
                    field,
                    pattern,
                    regex: None,
                }
            }
        }
    }

    /// 필드 이름
    pub fn field(&self) -> &str {
        &self.field
    }

    /// 원본 패턴
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// 정규식 컴파일 성공 여부
    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }

    /// 레코드가 조건을 만족하는지 평가합니다.
    ///
    /// 필드가 없거나, 값에 패턴과 일치하는 부분이 없거나,
    /// 패턴이 잘못된 경우 false입니다.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(regex) = &self.regex else {
            return false;
        };
        record
            .get(&self.field)
            .is_some_and(|value| regex.is_match(value))
    }
}
