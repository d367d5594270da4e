//! 레코드 타입 -- 입력 한 줄에서 디코딩된 평탄한 필드 맵
//!
//! [`Record`]는 생성 후 변경되지 않습니다. 필드는 `BTreeMap`에 저장되므로
//! 순회 순서는 항상 키의 사전순이며, 렌더러는 이 순서를 그대로 사용합니다.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 필드 이름 → 문자열 값의 불변 매핑
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// 필드 맵으로 레코드를 생성합니다.
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    /// 필드 값을 조회합니다.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// 필드 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 필드가 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// (이름, 값) 쌍을 키 사전순으로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 필드 이름을 사전순으로 순회합니다.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// 필드 값을 키 사전순으로 순회합니다.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.values().map(String::as_str)
    }

    /// 내부 필드 맵을 꺼냅니다.
    pub fn into_fields(self) -> BTreeMap<String, String> {
        self.fields
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<BTreeMap<String, String>> for Record {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Self::new(fields)
    }
}
