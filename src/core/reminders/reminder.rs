use std::fmt;

use serde::{Deserialize, Serialize};

/// 一条提醒
///
/// `time` 总是补零后的 `HH:MM`；`text` 可能包含换行（多行续接）；
/// `confidence` 为组成该行的文字框平均置信度，去重时用来挑选更好的识别结果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub date: String,
    pub time: String,
    pub text: String,
    pub repeats: bool,
    pub confidence: f32,
}

impl Reminder {
    pub fn new(
        date: impl Into<String>,
        time: impl Into<String>,
        text: impl Into<String>,
        repeats: bool,
        confidence: f32,
    ) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            text: text.into(),
            repeats,
            confidence,
        }
    }

    /// 续接一行文本；占位提醒（还没有正文）直接填入
    pub fn append_line(&mut self, line: &str) {
        if self.text.is_empty() {
            self.text = line.to_string();
        } else {
            self.text.push('\n');
            self.text.push_str(line);
        }
    }
}

impl fmt::Display for Reminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} | {}", self.date, self.time, self.text)?;
        if self.repeats {
            write!(f, " [repeats]")?;
        }
        Ok(())
    }
}
