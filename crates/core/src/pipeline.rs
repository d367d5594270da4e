//! 파이프라인 trait -- 확장 포인트 정의

use crate::error::NdfilterError;
use crate::record::Record;

/// 원시 입력 한 줄을 레코드로 변환하는 trait
///
/// 새로운 입력 형식을 지원하려면 이 trait을 구현합니다.
/// 여러 워커가 동시에 호출하므로 내부 상태를 변경하지 않아야 합니다.
pub trait RecordDecoder: Send + Sync {
    /// 지원하는 입력 형식 이름
    fn format_name(&self) -> &str;

    /// 원시 바이트를 레코드로 디코딩
    fn decode(&self, raw: &[u8]) -> Result<Record, NdfilterError>;
}

/// 레코드 유지 여부를 결정하는 trait
pub trait RecordPredicate: Send + Sync {
    /// 필터 이름 (로깅용)
    fn name(&self) -> &str;

    /// 레코드를 유지해야 하면 true
    fn matches(&self, record: &Record) -> bool;
}

/// 레코드를 출력 한 줄로 변환하는 trait
///
/// 반환 문자열에는 줄 끝 문자가 포함되지 않습니다.
pub trait RecordRenderer: Send + Sync {
    /// 출력 형식 이름
    fn format_name(&self) -> &str;

    /// 레코드를 한 줄로 렌더링
    fn render(&self, record: &Record) -> Result<String, NdfilterError>;
}
