//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 파이프라인 크레이트는 이 상수를 사용하여 `metrics::counter!()`,
//! `metrics::histogram!()` 매크로를 호출합니다. 전역 레코더가 설치되지
//! 않으면 호출은 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `ndfilter_`
//! - 접미어: `_total` (counter), `_seconds` (histogram), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(ndfilter_core::metrics::LINES_READ_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 출력 형식 레이블 키 (json, csv)
pub const LABEL_FORMAT: &str = "format";

/// 실패 사유 레이블 키 (malformed, not_an_object, type_mismatch, too_large)
pub const LABEL_REASON: &str = "reason";

// ─── 파이프라인 메트릭 ────────────────────────────────────────────

/// 입력에서 읽은 전체 라인 수 (counter)
pub const LINES_READ_TOTAL: &str = "ndfilter_lines_read_total";

/// 디코딩 실패 수 (counter, label: reason)
pub const DECODE_FAILURES_TOTAL: &str = "ndfilter_decode_failures_total";

/// 필터에 의해 제외된 레코드 수 (counter)
pub const RECORDS_FILTERED_TOTAL: &str = "ndfilter_records_filtered_total";

/// 필터를 통과한 레코드 수 (counter)
pub const RECORDS_KEPT_TOTAL: &str = "ndfilter_records_kept_total";

/// 출력에 기록된 레코드 수 (counter, label: format)
pub const RECORDS_WRITTEN_TOTAL: &str = "ndfilter_records_written_total";

/// 렌더링 실패 수 (counter, label: format)
pub const RENDER_FAILURES_TOTAL: &str = "ndfilter_render_failures_total";

/// 실행 중인 워커 수 (gauge)
pub const WORKERS_ACTIVE: &str = "ndfilter_workers_active";

/// 파이프라인 한 번 실행에 걸린 시간 (histogram, 초)
pub const RUN_DURATION_SECONDS: &str = "ndfilter_run_duration_seconds";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!(LINES_READ_TOTAL, "Total number of input lines read");
    describe_counter!(
        DECODE_FAILURES_TOTAL,
        "Total number of lines that failed to decode into a record"
    );
    describe_counter!(
        RECORDS_FILTERED_TOTAL,
        "Total number of decoded records rejected by the predicate set"
    );
    describe_counter!(
        RECORDS_KEPT_TOTAL,
        "Total number of records that passed the predicate set"
    );
    describe_counter!(
        RECORDS_WRITTEN_TOTAL,
        "Total number of records written to the output stream"
    );
    describe_counter!(
        RENDER_FAILURES_TOTAL,
        "Total number of records that could not be rendered"
    );
    describe_gauge!(WORKERS_ACTIVE, "Number of filter workers currently running");
    describe_histogram!(
        RUN_DURATION_SECONDS,
        "Wall-clock duration of a single pipeline run in seconds"
    );
}
