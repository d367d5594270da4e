//! 파이프라인 오케스트레이션 -- 수집/워커/출력 단계의 전체 흐름을 관리합니다.
//!
//! # 내부 아키텍처
//! ```text
//! input -> ingest -> work mpsc (bounded) -> worker x N -> result mpsc (bounded) -> output -> writer
//!                         |                     |
//!                 Arc<Mutex<Receiver>>   decode + filter + project
//! ```
//!
//! # 종료 순서
//! 1. 수집 단계는 입력 끝/읽기 에러/취소 시 작업 채널 송신측을 닫습니다.
//! 2. 각 워커는 처리 중인 항목을 마친 뒤 종료합니다.
//! 3. 모든 워커가 join된 뒤에만 결과 채널의 원본 송신측을 닫습니다.
//! 4. 출력 단계는 결과 채널이 닫히고 비워진 뒤 flush하고 종료합니다.
//!
//! `run`은 모든 단계가 끝나기 전에 반환하지 않습니다.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use ndfilter_core::metrics as m;
use ndfilter_core::pipeline::{RecordDecoder, RecordPredicate, RecordRenderer};

use crate::config::{OutputOrder, PipelineConfig};
use crate::decoder::JsonRecordDecoder;
use crate::error::FilterPipelineError;
use crate::ingest::ingest;
use crate::output::run_output;
use crate::predicate::PredicateSet;
use crate::projector::Projection;
use crate::render::build_renderer;
use crate::worker::{WorkerContext, WorkerReport, run_worker};

/// 한 번의 실행 결과 요약
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    /// 입력에서 읽은 라인 수
    pub lines_read: u64,
    /// 디코딩 실패 수
    pub decode_failures: u64,
    /// 필터에 의해 제외된 레코드 수
    pub records_filtered: u64,
    /// 필터를 통과한 레코드 수
    pub records_kept: u64,
    /// 출력에 기록된 레코드 수
    pub records_written: u64,
    /// 렌더링 실패 수
    pub render_failures: u64,
    /// 외부 취소로 중단되었는지 여부
    pub cancelled: bool,
}

/// 필터 파이프라인
///
/// 구성 요소(디코더, 필터, 프로젝션, 렌더러)는 모두 불변이며
/// 실행 시 각 단계에 `Arc`로 공유됩니다.
///
/// # 사용 예시
/// ```ignore
/// use ndfilter_pipeline::{FilterPipelineBuilder, PipelineConfig};
///
/// let pipeline = FilterPipelineBuilder::new().config(config).build()?;
/// let summary = pipeline.run(tokio::io::BufReader::new(stdin), &mut stdout).await?;
/// ```
pub struct FilterPipeline {
    /// 파이프라인 설정
    config: PipelineConfig,
    /// 라인 디코더
    decoder: Arc<dyn RecordDecoder>,
    /// 필터 조건
    predicates: Arc<PredicateSet>,
    /// 출력 필드 명세
    projection: Arc<Projection>,
    /// 출력 렌더러
    renderer: Arc<dyn RecordRenderer>,
    /// 외부 취소 토큰
    cancel: CancellationToken,
}

impl FilterPipeline {
    /// 파이프라인 설정
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 필터 조건 집합
    pub fn predicates(&self) -> &PredicateSet {
        &self.predicates
    }

    /// 출력 필드 명세
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// 실행을 중단시키는 토큰 (시그널 핸들러 등에 전달)
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 입력을 끝까지 처리하여 출력에 기록합니다.
    ///
    /// 수집, N개의 워커, 출력 단계가 동시에 실행되며 모든 단계가 종료된 뒤 반환합니다.
    /// 외부 취소는 에러가 아니며 `cancelled = true`인 요약을 반환합니다.
    ///
    /// # Errors
    /// 여러 에러가 겹치면 워커 실패, 입력 에러, 출력 에러 순으로 우선합니다.
    pub async fn run<R, W>(
        &self,
        input: R,
        output: &mut W,
    ) -> Result<PipelineSummary, FilterPipelineError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let started = Instant::now();
        // 내부 중단(출력 에러, 워커 실패)이 외부 토큰에 번지지 않도록 자식 토큰 사용
        let cancel = self.cancel.child_token();
        let capacity = self.config.channel_capacity;

        let (work_tx, work_rx) = mpsc::channel(capacity);
        let (result_tx, result_rx) = mpsc::channel(capacity);
        let work_rx = Arc::new(Mutex::new(work_rx));

        let ctx = Arc::new(WorkerContext {
            decoder: Arc::clone(&self.decoder),
            predicate: Arc::clone(&self.predicates) as Arc<dyn RecordPredicate>,
            projection: Arc::clone(&self.projection),
            emit_tombstones: self.config.order == OutputOrder::Input,
            max_line_bytes: self.config.max_line_bytes,
        });

        let mut handles = Vec::with_capacity(self.config.concurrency);
        for id in 0..self.config.concurrency {
            handles.push(tokio::spawn(run_worker(
                id,
                Arc::clone(&ctx),
                Arc::clone(&work_rx),
                result_tx.clone(),
                cancel.clone(),
            )));
        }
        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!(m::WORKERS_ACTIVE).set(self.config.concurrency as f64);

        let join_workers = {
            let cancel = cancel.clone();
            async move {
                let mut reports: Vec<WorkerReport> = Vec::with_capacity(handles.len());
                let mut failure = None;
                for handle in handles {
                    match handle.await {
                        Ok(report) => reports.push(report),
                        Err(e) => {
                            error!(error = %e, "worker task failed");
                            cancel.cancel();
                            failure.get_or_insert_with(|| e.to_string());
                        }
                    }
                }
                // 모든 워커가 끝난 뒤에만 결과 채널을 닫음
                drop(result_tx);
                (reports, failure)
            }
        };

        let (ingest_report, (worker_reports, worker_failure), output_report) = tokio::join!(
            ingest(input, work_tx, self.config.max_line_bytes, cancel.clone()),
            join_workers,
            run_output(
                result_rx,
                output,
                Arc::clone(&self.renderer),
                self.config.order,
                cancel.clone(),
            ),
        );
        metrics::gauge!(m::WORKERS_ACTIVE).set(0.0);

        let mut summary = PipelineSummary {
            lines_read: ingest_report.lines_read,
            records_written: output_report.written,
            render_failures: output_report.render_failures,
            cancelled: self.cancel.is_cancelled(),
            ..PipelineSummary::default()
        };
        for report in &worker_reports {
            summary.decode_failures += report.decode_failures;
            summary.records_filtered += report.filtered;
            summary.records_kept += report.kept;
        }

        let elapsed = started.elapsed();
        metrics::histogram!(m::RUN_DURATION_SECONDS).record(elapsed.as_secs_f64());
        info!(
            lines_read = summary.lines_read,
            decode_failures = summary.decode_failures,
            records_filtered = summary.records_filtered,
            records_kept = summary.records_kept,
            records_written = summary.records_written,
            render_failures = summary.render_failures,
            cancelled = summary.cancelled,
            elapsed_ms = elapsed.as_millis() as u64,
            "filter pipeline finished"
        );

        if let Some(reason) = worker_failure {
            return Err(FilterPipelineError::Worker(reason));
        }
        if let Some(e) = ingest_report.error {
            return Err(FilterPipelineError::Input(e));
        }
        if let Some(e) = output_report.error {
            return Err(FilterPipelineError::Output(e));
        }
        Ok(summary)
    }
}

/// 파이프라인 빌더
///
/// 디코더와 렌더러를 지정하지 않으면 설정에 맞는 기본 구현을 사용합니다.
pub struct FilterPipelineBuilder {
    /// 파이프라인 설정
    config: PipelineConfig,
    /// 사용자 지정 디코더
    decoder: Option<Arc<dyn RecordDecoder>>,
    /// 사용자 지정 렌더러
    renderer: Option<Arc<dyn RecordRenderer>>,
    /// 외부 취소 토큰
    cancel: Option<CancellationToken>,
}

impl FilterPipelineBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            decoder: None,
            renderer: None,
            cancel: None,
        }
    }

    /// 파이프라인 설정을 지정합니다.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// 디코더를 교체합니다.
    pub fn decoder(mut self, decoder: Arc<dyn RecordDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// 렌더러를 교체합니다.
    pub fn renderer(mut self, renderer: Arc<dyn RecordRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// 외부 취소 토큰을 연결합니다.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// 설정을 검증하고 파이프라인을 빌드합니다.
    ///
    /// 잘못된 정규식은 에러가 아니며 경고 로그로 보고됩니다.
    pub fn build(self) -> Result<FilterPipeline, FilterPipelineError> {
        self.config.validate()?;

        let predicates = PredicateSet::from_filters(&self.config.filters);
        for (field, pattern) in predicates.invalid_patterns() {
            warn!(field, pattern, "filter pattern failed to compile");
        }

        let projection = Projection::from_fields(&self.config.project);

        let decoder: Arc<dyn RecordDecoder> = match self.decoder {
            Some(decoder) => decoder,
            None => Arc::new(
                JsonRecordDecoder::new(self.config.non_string)
                    .with_max_input_size(self.config.max_line_bytes),
            ),
        };
        let renderer = match self.renderer {
            Some(renderer) => renderer,
            None => build_renderer(self.config.format),
        };

        info!(
            workers = self.config.concurrency,
            filters = predicates.len(),
            projection = ?projection,
            format = %self.config.format,
            order = %self.config.order,
            non_string = %self.config.non_string,
            channel_capacity = self.config.channel_capacity,
            "filter pipeline configured"
        );

        Ok(FilterPipeline {
            config: self.config,
            decoder,
            predicates: Arc::new(predicates),
            projection: Arc::new(projection),
            renderer,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

impl Default for FilterPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
