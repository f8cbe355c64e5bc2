use serde::{Deserialize, Serialize};

use crate::core::error::ExtractError;
use crate::core::output::resolve_date;
use crate::core::reminders::Reminder;

/// 提取出的一条提醒（Dart 侧使用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderRecord {
    /// 原始日期标签，如 "Thursday 13 Feb"
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub text: String,
    pub repeats: bool,
    pub confidence: f32,
    /// 解析出的 ISO 日期，日期标签无法识别时为空
    pub iso_date: Option<String>,
}

impl ReminderRecord {
    pub fn from_reminder(reminder: Reminder, year: i32) -> Self {
        let iso_date = resolve_date(&reminder.date, year).map(|d| d.format("%Y-%m-%d").to_string());
        Self {
            date: reminder.date,
            time: reminder.time,
            text: reminder.text,
            repeats: reminder.repeats,
            confidence: reminder.confidence,
            iso_date,
        }
    }
}

/// 提醒提取 API 错误类型，FRB 友好的设计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderApiError {
    pub error_type: String,
    pub message: String,
}

impl From<ExtractError> for ReminderApiError {
    fn from(e: ExtractError) -> Self {
        let error_type = match &e {
            ExtractError::NoStableFrames => "NoStableFrames",
            ExtractError::Io(_) => "Io",
            ExtractError::Image(_) => "Image",
            ExtractError::Json(_) => "Json",
            ExtractError::Config(_) => "Config",
            ExtractError::InvalidPattern(_) => "InvalidPattern",
            ExtractError::FrameSize { .. } => "FrameSize",
            ExtractError::WorkerPool(_) => "WorkerPool",
        };
        Self {
            error_type: error_type.to_string(),
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ReminderApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.error_type, self.message)
    }
}

impl std::error::Error for ReminderApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_resolves_iso_date() {
        let r = Reminder::new("Thursday 13 Feb", "09:00", "Dentist", true, 0.9);
        let record = ReminderRecord::from_reminder(r, 2026);
        assert_eq!(record.iso_date.as_deref(), Some("2026-02-13"));
        assert!(record.repeats);

        let r = Reminder::new("Someday", "09:00", "Dentist", false, 0.9);
        assert!(ReminderRecord::from_reminder(r, 2026).iso_date.is_none());
    }

    #[test]
    fn test_error_mapping() {
        let err = ReminderApiError::from(ExtractError::NoStableFrames);
        assert_eq!(err.error_type, "NoStableFrames");
        assert_eq!(err.to_string(), "[NoStableFrames] No stable frames found, nothing to process");
    }
}
