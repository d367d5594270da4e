//! 출력 단계 -- 결과를 렌더링하여 한 줄씩 기록합니다.
//!
//! 결과 채널이 닫히고 비워질 때까지 동작하며, 종료 전에 항상 flush합니다.
//! 대기 중인 결과가 없을 때마다 flush하므로 파이프 입력에도 지연 없이 출력됩니다.
//!
//! `input` 순서 모드에서는 순번 기반 재정렬 버퍼를 사용합니다.
//! 워커는 제외된 라인에 대해 tombstone을 보내므로 버퍼가 멈추지 않습니다.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use ndfilter_core::metrics as m;
use ndfilter_core::pipeline::RecordRenderer;
use ndfilter_core::record::Record;

use crate::config::OutputOrder;
use crate::item::{ResultItem, Verdict};

/// 출력 단계 종료 보고
#[derive(Debug, Default)]
pub struct OutputReport {
    /// 기록한 레코드 수
    pub written: u64,
    /// 렌더링 실패 수
    pub render_failures: u64,
    /// 쓰기 에러 (있을 경우 출력 중단)
    pub error: Option<std::io::Error>,
}

/// 결과 채널을 비우며 출력에 기록합니다.
///
/// 쓰기 에러가 발생하면 `cancel`을 발동하여 나머지 단계를 멈추고 즉시 반환합니다.
pub async fn run_output<W>(
    mut rx: mpsc::Receiver<ResultItem>,
    writer: &mut W,
    renderer: Arc<dyn RecordRenderer>,
    order: OutputOrder,
    cancel: CancellationToken,
) -> OutputReport
where
    W: AsyncWrite + Unpin,
{
    let mut sink = LineSink {
        out: BufWriter::new(writer),
        renderer,
        report: OutputReport::default(),
    };
    let mut reorder: BTreeMap<u64, Verdict> = BTreeMap::new();
    let mut next_seq: u64 = 0;

    let result = loop {
        if cancel.is_cancelled() {
            debug!("output stage cancelled");
            break Ok(());
        }

        let item = match rx.try_recv() {
            Ok(item) => item,
            Err(TryRecvError::Disconnected) => break Ok(()),
            Err(TryRecvError::Empty) => {
                // 대기 전에 지금까지의 출력을 내보냄
                if let Err(e) = sink.out.flush().await {
                    break Err(e);
                }
                let received = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    item = rx.recv() => item,
                };
                match received {
                    Some(item) => item,
                    None => break Ok(()),
                }
            }
        };

        let written = match order {
            OutputOrder::Arrival => match item.verdict {
                Verdict::Kept(record) => sink.write(&record).await,
                Verdict::Dropped => Ok(()),
            },
            OutputOrder::Input => {
                reorder.insert(item.seq, item.verdict);
                drain_ready(&mut reorder, &mut next_seq, &mut sink).await
            }
        };
        if let Err(e) = written {
            break Err(e);
        }
    };

    if !reorder.is_empty() {
        debug!(
            pending = reorder.len(),
            next_seq, "discarding out-of-order results after early stop"
        );
    }

    let result = match result {
        Ok(()) => sink.out.flush().await,
        Err(e) => Err(e),
    };

    let mut report = sink.report;
    if let Err(e) = result {
        error!(error = %e, written = report.written, "failed to write output");
        cancel.cancel();
        report.error = Some(e);
    }
    report
}

/// 순번이 이어지는 결과를 버퍼에서 꺼내 기록합니다.
async fn drain_ready<W>(
    reorder: &mut BTreeMap<u64, Verdict>,
    next_seq: &mut u64,
    sink: &mut LineSink<'_, W>,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(verdict) = reorder.remove(next_seq) {
        *next_seq += 1;
        if let Verdict::Kept(record) = verdict {
            sink.write(&record).await?;
        }
    }
    Ok(())
}

struct LineSink<'a, W> {
    out: BufWriter<&'a mut W>,
    renderer: Arc<dyn RecordRenderer>,
    report: OutputReport,
}

impl<W> LineSink<'_, W>
where
    W: AsyncWrite + Unpin,
{
    /// 레코드 하나를 렌더링하여 기록합니다. 렌더링 실패는 건너뜁니다.
    async fn write(&mut self, record: &Record) -> std::io::Result<()> {
        let format = self.renderer.format_name().to_owned();
        let line = match self.renderer.render(record) {
            Ok(line) => line,
            Err(e) => {
                self.report.render_failures += 1;
                metrics::counter!(m::RENDER_FAILURES_TOTAL, m::LABEL_FORMAT => format).increment(1);
                warn!(error = %e, "failed to render record, skipping");
                return Ok(());
            }
        };

        self.out.write_all(line.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.report.written += 1;
        metrics::counter!(m::RECORDS_WRITTEN_TOTAL, m::LABEL_FORMAT => format).increment(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::JsonRenderer;

    fn record(id: &str) -> Record {
        [("id", id)].into_iter().collect()
    }

    async fn render_all(items: Vec<ResultItem>, order: OutputOrder) -> (OutputReport, String) {
        let (tx, rx) = mpsc::channel(items.len().max(1));
        for item in items {
            tx.send(item).await.unwrap();
        }
        drop(tx);

        let mut out = Vec::new();
        let report = run_output(
            rx,
            &mut out,
            Arc::new(JsonRenderer::new()),
            order,
            CancellationToken::new(),
        )
        .await;
        (report, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn arrival_order_writes_as_received() {
        let items = vec![
            ResultItem::kept(2, record("c")),
            ResultItem::kept(0, record("a")),
        ];
        let (report, out) = render_all(items, OutputOrder::Arrival).await;
        assert_eq!(report.written, 2);
        assert_eq!(out, "{\"id\": \"c\"}\n{\"id\": \"a\"}\n");
    }

    #[tokio::test]
    async fn input_order_reorders_and_skips_tombstones() {
        let items = vec![
            ResultItem::kept(2, record("c")),
            ResultItem::dropped(1),
            ResultItem::kept(0, record("a")),
        ];
        let (report, out) = render_all(items, OutputOrder::Input).await;
        assert_eq!(report.written, 2);
        assert_eq!(out, "{\"id\": \"a\"}\n{\"id\": \"c\"}\n");
    }

    #[tokio::test]
    async fn empty_channel_writes_nothing() {
        let (report, out) = render_all(Vec::new(), OutputOrder::Arrival).await;
        assert_eq!(report.written, 0);
        assert!(report.error.is_none());
        assert!(out.is_empty());
    }
}
