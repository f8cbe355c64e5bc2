use thiserror::Error;

/// 文字检测（外部 OCR）错误，单帧失败不会中断流水线
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("OCR engine error: {0}")]
    Engine(String),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No stable frames found, nothing to process")]
    NoStableFrames,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("Frame buffer size mismatch: expected {expected} bytes, got {actual}")]
    FrameSize { expected: usize, actual: usize },
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}
