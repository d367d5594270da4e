//! Configuration resolution and pipeline execution for the `ndfilter` binary.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ndfilter_core::config::{EnvOverrideWarning, NdfilterConfig};
use ndfilter_pipeline::{
    FilterPipelineBuilder, PipelineConfig, PipelineSummary, load_filter_file, parse_filter_spec,
};

use crate::cli::{Cli, DEFAULT_CONFIG_FILE, is_std_stream};
use crate::error::CliError;

type BoxedReader = Box<dyn AsyncRead + Unpin + Send>;
type BoxedWriter = Box<dyn AsyncWrite + Unpin + Send>;

/// Effective configuration plus the env overrides that were ignored.
///
/// Resolution runs before logging is initialised, so warnings are held
/// here and emitted with [`ResolvedConfig::log_warnings`] afterwards.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: NdfilterConfig,
    pub warnings: Vec<EnvOverrideWarning>,
}

impl ResolvedConfig {
    /// Log every ignored env override at `warn`.
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warning.log();
        }
    }
}

/// Resolve the effective configuration.
///
/// Precedence: CLI flags > environment > config file > defaults.
/// Filters merge key by key: `--filters` > `--filters-file` > `[filter.filters]`.
///
/// # Errors
///
/// An explicitly named config file that does not exist is an error; the
/// implicit `./ndfilter.toml` is only read when present.
pub async fn resolve_config(cli: &Cli) -> Result<ResolvedConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => NdfilterConfig::from_file(path).await?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if tokio::fs::try_exists(default_path).await.unwrap_or(false) {
                NdfilterConfig::from_file(default_path).await?
            } else {
                NdfilterConfig::default()
            }
        }
    };
    let warnings = config.apply_env_overrides();

    if let Some(path) = &cli.filters_file {
        let from_file = load_filter_file(path).await?;
        config.filter.filters.extend(from_file);
    }
    if let Some(spec) = &cli.filters {
        let from_flag = parse_filter_spec(spec)?;
        config.filter.filters.extend(from_flag);
    }

    apply_cli_overrides(&mut config, cli);
    config.validate()?;
    Ok(ResolvedConfig { config, warnings })
}

fn apply_cli_overrides(config: &mut NdfilterConfig, cli: &Cli) {
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.general.log_format = format.as_str().to_owned();
    }

    let filter = &mut config.filter;
    if let Some(concurrency) = cli.concurrency {
        filter.concurrency = concurrency;
    }
    if let Some(project) = &cli.project {
        filter.project = project
            .split(',')
            .map(|field| field.trim().to_owned())
            .filter(|field| !field.is_empty())
            .collect();
    }
    if let Some(format) = cli.format {
        filter.format = format.as_str().to_owned();
    }
    if let Some(order) = cli.order {
        filter.order = order.as_str().to_owned();
    }
    if let Some(policy) = cli.non_string {
        filter.non_string = policy.as_str().to_owned();
    }
    if let Some(capacity) = cli.channel_capacity {
        filter.channel_capacity = capacity;
    }
    if let Some(max) = cli.max_line_bytes {
        filter.max_line_bytes = max;
    }
}

/// Check that the resolved configuration builds a pipeline and render it as TOML.
///
/// Invalid filter patterns are reported as warnings, not errors.
pub fn validate(config: &NdfilterConfig) -> Result<String, CliError> {
    let pipeline_config = PipelineConfig::from_core(&config.filter)?;
    let pipeline = FilterPipelineBuilder::new()
        .config(pipeline_config)
        .build()?;

    for (field, pattern) in pipeline.predicates().invalid_patterns() {
        warn!(field, pattern, "pattern will never match");
    }

    Ok(toml::to_string_pretty(config)?)
}

/// Run the filter over the configured input and output.
///
/// Ctrl-C cancels the run; a cancelled run is reported as
/// [`CliError::Interrupted`].
pub async fn run(cli: &Cli, config: &NdfilterConfig) -> Result<PipelineSummary, CliError> {
    let pipeline_config = PipelineConfig::from_core(&config.filter)?;
    let input = open_input(cli.input.as_ref()).await?;
    let output = open_output(cli.output.as_ref()).await?;

    let cancel = CancellationToken::new();
    let signal = tokio::spawn(watch_interrupt(cancel.clone()));

    let result = execute(pipeline_config, BufReader::new(input), output, cancel).await;
    signal.abort();
    result
}

/// Build a pipeline and drive it to completion over the given streams.
pub async fn execute<R, W>(
    pipeline_config: PipelineConfig,
    input: R,
    mut output: W,
    cancel: CancellationToken,
) -> Result<PipelineSummary, CliError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let pipeline = FilterPipelineBuilder::new()
        .config(pipeline_config)
        .cancel_token(cancel)
        .build()?;

    let summary = pipeline.run(input, &mut output).await?;
    output.shutdown().await?;

    if summary.cancelled {
        info!(
            records_written = summary.records_written,
            "run interrupted"
        );
        return Err(CliError::Interrupted);
    }
    Ok(summary)
}

async fn open_input(path: Option<&PathBuf>) -> Result<BoxedReader, CliError> {
    let path = match path {
        Some(path) if !is_std_stream(Some(path)) => path,
        _ => {
            debug!("reading from stdin");
            return Ok(Box::new(tokio::io::stdin()));
        }
    };
    let file = tokio::fs::File::open(path).await?;
    debug!(path = %path.display(), "reading input file");
    Ok(Box::new(file))
}

async fn open_output(path: Option<&PathBuf>) -> Result<BoxedWriter, CliError> {
    let path = match path {
        Some(path) if !is_std_stream(Some(path)) => path,
        _ => return Ok(Box::new(tokio::io::stdout())),
    };
    let file = tokio::fs::File::create(path).await?;
    debug!(path = %path.display(), "writing output file");
    Ok(Box::new(file))
}

async fn watch_interrupt(cancel: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => {
                warn!("interrupt received, stopping pipeline");
                cancel.cancel();
            }
            Err(e) => warn!(error = %e, "failed to listen for interrupt signal"),
        },
        _ = cancel.cancelled() => {}
    }
}
