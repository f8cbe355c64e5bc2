//! 提醒解析与去重
//!
//! 1. 布局解析 - 单帧文字框 → 行 → 提醒
//! 2. 跨帧去重 - 多帧的重复观测合并为一条

pub mod dedup;
pub mod layout;
pub mod patterns;
pub mod recurrence;
pub mod reminder;
pub mod rows;
pub mod similarity;

pub use dedup::{deduplicate, MergeOutcome, ReminderDeduplicator};
pub use layout::LayoutParser;
pub use patterns::{normalize_time, LayoutPatterns};
pub use reminder::Reminder;
pub use rows::{group_into_rows, Row};
