//! 레코드 필터 모듈 -- 필드별 정규식 조건의 AND 결합
//!
//! [`PredicateSet`]은 시작 시 한 번 구성되고 이후 변경되지 않으며,
//! 모든 워커가 `Arc`로 공유합니다.
//!
//! # 매칭 규칙
//! - 조건이 없으면 모든 레코드가 통과합니다.
//! - 각 조건은 필드가 존재하고, 값의 일부가 패턴과 일치해야 통과합니다 (검색 의미).
//! - 잘못된 패턴은 해당 필드에서 항상 불일치입니다.
//!
//! # 사용 예시
//! ```ignore
//! use ndfilter_pipeline::predicate::{PredicateSet, parse_filter_spec};
//!
//! let filters = parse_filter_spec(r#"{"status":"ok"}"#)?;
//! let predicates = PredicateSet::from_filters(&filters);
//! assert!(predicates.matches(&record));
//! ```

pub mod loader;
pub mod matcher;

pub use loader::{load_filter_file, parse_filter_spec};
pub use matcher::FieldMatcher;

use std::collections::BTreeMap;

use ndfilter_core::pipeline::RecordPredicate;
use ndfilter_core::record::Record;

/// 필드 조건 집합
#[derive(Debug, Clone, Default)]
pub struct PredicateSet {
    /// 필드 이름 사전순으로 정렬된 매처 목록
    matchers: Vec<FieldMatcher>,
}

impl PredicateSet {
    /// 빈 조건 집합을 생성합니다 (모든 레코드 통과).
    pub fn new() -> Self {
        Self::default()
    }

    /// 필드 → 패턴 맵에서 조건 집합을 생성합니다.
    ///
    /// 잘못된 패턴은 실패로 처리하지 않고 [`invalid_patterns`](Self::invalid_patterns)로 보고합니다.
    pub fn from_filters(filters: &BTreeMap<String, String>) -> Self {
        let matchers = filters
            .iter()
            .map(|(field, pattern)| FieldMatcher::compile(field.as_str(), pattern.as_str()))
            .collect();
        Self { matchers }
    }

    /// 컴파일에 실패한 (필드, 패턴) 목록
    pub fn invalid_patterns(&self) -> Vec<(&str, &str)> {
        self.matchers
            .iter()
            .filter(|m| !m.is_valid())
            .map(|m| (m.field(), m.pattern()))
            .collect()
    }

    /// 조건 수
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// 조건이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// 매처 목록
    pub fn matchers(&self) -> &[FieldMatcher] {
        &self.matchers
    }
}

impl RecordPredicate for PredicateSet {
    fn name(&self) -> &str {
        "field-regex"
    }

    fn matches(&self, record: &Record) -> bool {
        // AND 결합: 하나라도 실패하면 전체 실패
        self.matchers.iter().all(|m| m.matches(record))
    }
}
