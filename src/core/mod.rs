//! 提醒录屏提取核心
//!
//! 1. 稳定帧检测 - 找出停止滚动的时间段，每段一帧代表帧
//! 2. 布局解析 - OCR 文字框 → 日期标题 / 时间 / 正文 / 重复标记
//! 3. 跨帧去重 - 合并多帧中同一条提醒的重复观测

pub mod config;
pub mod error;
pub mod ocr;
pub mod output;
pub mod pipeline;
pub mod reminders;
pub mod video;

pub use config::ExtractorConfig;
pub use error::{ExtractError, OcrError};
pub use pipeline::{ExtractionOutput, ExtractionStats, ReminderExtractor};
