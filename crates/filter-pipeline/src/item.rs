//! 채널을 오가는 작업/결과 단위

use bytes::Bytes;
use ndfilter_core::record::Record;

/// 입력 한 줄 (줄 끝 문자 제거됨)
///
/// 작업 채널을 통해 정확히 하나의 워커에게 소유권이 넘어갑니다.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// 0부터 시작하는 입력 순번
    pub seq: u64,
    /// 원시 라인 바이트
    pub line: Bytes,
    /// 최대 길이를 넘어 버려진 라인의 실제 크기 (이 경우 `line`은 비어 있음)
    pub oversized: Option<usize>,
}

/// 워커의 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// 필터를 통과하고 프로젝션된 레코드
    Kept(Record),
    /// 디코딩 실패 또는 필터 불일치 (입력 순서 모드의 tombstone)
    Dropped,
}

/// 결과 채널을 통해 출력 단계로 전달되는 단위
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    /// 원본 라인의 입력 순번
    pub seq: u64,
    /// 처리 결과
    pub verdict: Verdict,
}

impl ResultItem {
    /// 유지된 레코드 결과
    pub fn kept(seq: u64, record: Record) -> Self {
        Self {
            seq,
            verdict: Verdict::Kept(record),
        }
    }

    /// tombstone 결과
    pub fn dropped(seq: u64) -> Self {
        Self {
            seq,
            verdict: Verdict::Dropped,
        }
    }
}
