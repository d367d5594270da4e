//! 에러 타입 -- 도메인별 에러 정의

/// ndfilter 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum NdfilterError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// 레코드 디코딩 에러
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// 렌더링 에러
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl NdfilterError {
    /// 레코드 단위로 복구 가능한 에러인지 확인합니다.
    ///
    /// 디코딩/렌더링 실패는 해당 레코드만 제외하고 파이프라인은 계속 진행합니다.
    pub fn is_per_record(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Render(_))
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 입력 스트림 읽기 실패
    #[error("input failed: {0}")]
    Input(String),

    /// 출력 스트림 쓰기 실패
    #[error("output failed: {0}")]
    Output(String),

    /// 워커 태스크 비정상 종료
    #[error("worker failed: {0}")]
    Worker(String),
}

/// 레코드 디코딩 에러
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// JSON 문법 오류
    #[error("malformed input at column {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    /// 최상위 값이 객체가 아님
    #[error("expected JSON object at top level, found {found}")]
    NotAnObject { found: String },

    /// 문자열이 아닌 필드 값
    #[error("field '{field}' is {found}, expected string")]
    TypeMismatch { field: String, found: String },

    /// 입력 데이터 초과
    #[error("input too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
}

/// 렌더링 에러
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// 출력 형식 변환 실패
    #[error("{format} render failed: {reason}")]
    Failed { format: String, reason: String },
}
