//! 입력 수집 단계 -- 입력 스트림을 줄 단위로 읽어 작업 채널로 보냅니다.
//!
//! 작업 채널은 bounded이므로 워커가 따라오지 못하면 읽기가 대기합니다.
//! 입력 끝, 읽기 에러, 취소 중 하나가 발생하면 송신측을 닫고 종료합니다.
//!
//! 최대 길이를 넘는 라인은 버퍼에 쌓지 않고 소비만 한 뒤
//! 크기 정보만 담은 작업 항목으로 보냅니다.

use std::io;

use bytes::Bytes;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use ndfilter_core::metrics as m;

use crate::item::WorkItem;

/// 수집 단계 종료 보고
#[derive(Debug, Default)]
pub struct IngestReport {
    /// 작업 채널로 보낸 라인 수
    pub lines_read: u64,
    /// 취소로 종료되었는지 여부
    pub cancelled: bool,
    /// 읽기 에러 (있을 경우 수집 중단)
    pub error: Option<std::io::Error>,
}

/// 입력을 끝까지 읽어 작업 채널로 보냅니다.
///
/// 줄 끝 문자를 제외하고 `max_line_bytes`를 넘는 라인은 내용 없이
/// `oversized`에 크기만 담아 보내므로 메모리 사용량이 라인 길이에 비례하지 않습니다.
/// `tx`는 반환 시점에 drop되어 작업 채널이 닫힙니다.
pub async fn ingest<R>(
    mut input: R,
    tx: mpsc::Sender<WorkItem>,
    max_line_bytes: usize,
    cancel: CancellationToken,
) -> IngestReport
where
    R: AsyncBufRead + Unpin,
{
    let mut report = IngestReport::default();
    let mut seq: u64 = 0;
    // 줄 끝 문자(\r\n)까지 담을 수 있는 상한
    let cap = max_line_bytes.saturating_add(2);

    loop {
        let mut buf = Vec::new();
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                report.cancelled = true;
                break;
            }
            result = read_line_bounded(&mut input, &mut buf, cap) => result,
        };

        match read {
            Ok(read) if read.consumed == 0 => {
                debug!(lines = report.lines_read, "input exhausted");
                break;
            }
            Ok(read) => {
                let size = read.consumed - read.terminator;
                let oversized = (size > max_line_bytes).then_some(size);
                if oversized.is_some() {
                    debug!(seq, size, max = max_line_bytes, "discarding oversized line");
                    buf = Vec::new();
                } else {
                    buf.truncate(size);
                }
                let item = WorkItem {
                    seq,
                    line: Bytes::from(buf),
                    oversized,
                };
                seq += 1;

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        report.cancelled = true;
                        break;
                    }
                    result = tx.send(item) => {
                        if result.is_err() {
                            debug!("work channel closed, stopping ingestion");
                            break;
                        }
                    }
                }

                report.lines_read += 1;
                metrics::counter!(m::LINES_READ_TOTAL).increment(1);
            }
            Err(e) => {
                error!(error = %e, lines = report.lines_read, "failed to read input");
                report.error = Some(e);
                break;
            }
        }
    }

    drop(tx);
    report
}

/// 한 줄 읽기 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineRead {
    /// 입력에서 소비한 바이트 수 (줄 끝 문자 포함)
    consumed: usize,
    /// 줄 끝 문자 길이 (`\n`은 1, `\r\n`은 2, 입력 끝은 0)
    terminator: usize,
}

/// `\n`까지 한 줄을 소비하되 버퍼에는 최대 `cap` 바이트만 담습니다.
async fn read_line_bounded<R>(input: &mut R, buf: &mut Vec<u8>, cap: usize) -> io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let mut consumed = 0;
    let mut last = None;
    loop {
        let available = input.fill_buf().await?;
        if available.is_empty() {
            return Ok(LineRead {
                consumed,
                terminator: 0,
            });
        }

        let (chunk_len, newline) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };
        let room = cap.saturating_sub(buf.len());
        buf.extend_from_slice(&available[..chunk_len.min(room)]);
        let before_newline = if chunk_len >= 2 {
            Some(available[chunk_len - 2])
        } else {
            last
        };
        last = Some(available[chunk_len - 1]);
        input.consume(chunk_len);
        consumed += chunk_len;

        if newline {
            let terminator = if before_newline == Some(b'\r') { 2 } else { 1 };
            return Ok(LineRead {
                consumed,
                terminator,
            });
        }
    }
}
