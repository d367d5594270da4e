//! 필터 워커 -- 디코딩, 필터 평가, 프로젝션
//!
//! N개의 워커가 하나의 작업 채널 수신측을 async mutex로 공유하므로
//! 각 작업 항목은 정확히 하나의 워커에게 전달됩니다.
//! 디코딩 실패는 레코드 단위로 처리되며 워커를 중단시키지 않습니다.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use ndfilter_core::error::{DecodeError, NdfilterError};
use ndfilter_core::metrics as m;
use ndfilter_core::pipeline::{RecordDecoder, RecordPredicate};

use crate::item::{ResultItem, Verdict, WorkItem};
use crate::projector::Projection;

/// 작업 채널 수신측 (워커 간 공유)
pub type SharedWorkReceiver = Arc<Mutex<mpsc::Receiver<WorkItem>>>;

/// 모든 워커가 공유하는 불변 처리 컨텍스트
pub struct WorkerContext {
    /// 라인 디코더
    pub decoder: Arc<dyn RecordDecoder>,
    /// 필터 조건
    pub predicate: Arc<dyn RecordPredicate>,
    /// 출력 필드 명세
    pub projection: Arc<Projection>,
    /// 제외된 라인에 대해 tombstone을 보낼지 여부 (입력 순서 모드)
    pub emit_tombstones: bool,
    /// 라인 최대 바이트 수 (수집 단계에서 버려진 라인의 실패 보고용)
    pub max_line_bytes: usize,
}

impl WorkerContext {
    /// 한 라인을 처리하여 결과를 결정합니다.
    pub fn evaluate(&self, worker: usize, item: &WorkItem, report: &mut WorkerReport) -> Verdict {
        report.processed += 1;

        let decoded = match item.oversized {
            Some(size) => Err(NdfilterError::from(DecodeError::TooLarge {
                size,
                max: self.max_line_bytes,
            })),
            None => self.decoder.decode(&item.line),
        };
        let record = match decoded {
            Ok(record) => record,
            Err(e) => {
                report.decode_failures += 1;
                metrics::counter!(m::DECODE_FAILURES_TOTAL, m::LABEL_REASON => failure_reason(&e))
                    .increment(1);
                debug!(worker, seq = item.seq, error = %e, "dropping undecodable line");
                return Verdict::Dropped;
            }
        };

        if !self.predicate.matches(&record) {
            report.filtered += 1;
            metrics::counter!(m::RECORDS_FILTERED_TOTAL).increment(1);
            return Verdict::Dropped;
        }

        report.kept += 1;
        metrics::counter!(m::RECORDS_KEPT_TOTAL).increment(1);
        Verdict::Kept(self.projection.apply(record))
    }
}

/// 워커 종료 보고
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// 워커 번호
    pub id: usize,
    /// 처리한 라인 수
    pub processed: u64,
    /// 디코딩 실패 수
    pub decode_failures: u64,
    /// 필터에 의해 제외된 레코드 수
    pub filtered: u64,
    /// 필터를 통과한 레코드 수
    pub kept: u64,
}

/// 작업 채널이 닫히고 비워지거나 취소될 때까지 라인을 처리합니다.
pub async fn run_worker(
    id: usize,
    ctx: Arc<WorkerContext>,
    work_rx: SharedWorkReceiver,
    result_tx: mpsc::Sender<ResultItem>,
    cancel: CancellationToken,
) -> WorkerReport {
    let mut report = WorkerReport {
        id,
        ..WorkerReport::default()
    };

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            item = recv_next(&work_rx) => item,
        };
        let Some(item) = next else {
            break;
        };

        let verdict = ctx.evaluate(id, &item, &mut report);
        if verdict == Verdict::Dropped && !ctx.emit_tombstones {
            continue;
        }

        let result = ResultItem {
            seq: item.seq,
            verdict,
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            sent = result_tx.send(result) => {
                if sent.is_err() {
                    debug!(worker = id, "result channel closed, stopping worker");
                    break;
                }
            }
        }
    }

    debug!(
        worker = id,
        processed = report.processed,
        decode_failures = report.decode_failures,
        filtered = report.filtered,
        kept = report.kept,
        "worker finished"
    );
    report
}

async fn recv_next(work_rx: &SharedWorkReceiver) -> Option<WorkItem> {
    work_rx.lock().await.recv().await
}

fn failure_reason(err: &NdfilterError) -> &'static str {
    match err {
        NdfilterError::Decode(DecodeError::Malformed { .. }) => "malformed",
        NdfilterError::Decode(DecodeError::NotAnObject { .. }) => "not_an_object",
        NdfilterError::Decode(DecodeError::TypeMismatch { .. }) => "type_mismatch",
        NdfilterError::Decode(DecodeError::TooLarge { .. }) => "too_large",
        _ => "other",
    }
}
