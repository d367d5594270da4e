//! 프로젝션 -- 출력할 필드 부분집합 선택
//!
//! [`Projection`]은 시작 시 한 번 구성되는 불변 값입니다.
//! 요청된 필드가 원본 레코드에 없으면 빈 문자열로 채웁니다.

use std::collections::BTreeMap;

use ndfilter_core::record::Record;

/// 출력 필드 명세
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    /// 모든 필드 유지
    #[default]
    All,
    /// 지정 필드만 유지 (중복 제거됨, 첫 등장 순서)
    Fields(Vec<String>),
}

impl Projection {
    /// 쉼표 구분 목록에서 프로젝션을 생성합니다.
    ///
    /// 각 항목은 앞뒤 공백이 제거되며, 빈 항목은 무시됩니다.
    /// 결과가 비어 있으면 [`Projection::All`]입니다.
    pub fn parse(spec: &str) -> Self {
        Self::from_fields(spec.split(','))
    }

    /// 필드 목록에서 프로젝션을 생성합니다.
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for field in fields {
            let field = field.as_ref().trim();
            if field.is_empty() || unique.iter().any(|f| f == field) {
                continue;
            }
            unique.push(field.to_owned());
        }

        if unique.is_empty() {
            Self::All
        } else {
            Self::Fields(unique)
        }
    }

    /// 전체 필드 유지 여부
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// 레코드에 프로젝션을 적용합니다.
    pub fn apply(&self, record: Record) -> Record {
        match self {
            Self::All => record,
            Self::Fields(fields) => {
                let projected: BTreeMap<String, String> = fields
                    .iter()
                    .map(|field| {
                        let value = record.get(field).unwrap_or_default().to_owned();
                        (field.clone(), value)
                    })
                    .collect();
                Record::new(projected)
            }
        }
    }
}
