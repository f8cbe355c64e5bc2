//! 日期标题 / 时间前缀识别

use regex::{Regex, RegexBuilder};

use crate::core::config::LayoutConfig;
use crate::core::error::ExtractError;

/// 由配置编译好的正则集合，构造解析器时编译一次
#[derive(Debug, Clone)]
pub struct LayoutPatterns {
    /// 整个文字框就是时间
    time_only: Regex,
    /// 时间开头，后面跟正文
    time_prefix: Regex,
    dates: Vec<Regex>,
    tomorrow: Regex,
}

impl LayoutPatterns {
    pub fn compile(config: &LayoutConfig) -> Result<Self, ExtractError> {
        let time_only = Regex::new(&format!(r"^(?:{})$", config.time_pattern))?;
        let time_prefix = Regex::new(&format!(
            r"^(?P<time>{})\s+(?P<rest>.*)$",
            config.time_pattern
        ))?;
        let dates = config
            .date_patterns
            .iter()
            .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;
        let tomorrow = RegexBuilder::new(r"^Tomorrow\s+")
            .case_insensitive(true)
            .build()?;

        Ok(Self {
            time_only,
            time_prefix,
            dates,
            tomorrow,
        })
    }

    pub fn is_date_header(&self, text: &str) -> bool {
        let text = text.trim();
        self.dates.iter().any(|re| re.is_match(text))
    }

    /// 日期标题作为日期标签，去掉 "Tomorrow " 前缀
    pub fn date_label(&self, header: &str) -> String {
        self.tomorrow.replace(header.trim(), "").into_owned()
    }

    /// 从文字框文本中取出开头的时间，返回 (规范化时间, 剩余正文)
    ///
    /// 时间无法规范化时视为没有时间。
    pub fn extract_time_prefix(&self, text: &str) -> Option<(String, String)> {
        let text = text.trim();
        if let Some(caps) = self.time_prefix.captures(text) {
            let time = normalize_time(&caps["time"])?;
            return Some((time, caps["rest"].trim().to_string()));
        }
        if self.time_only.is_match(text) {
            return normalize_time(text).map(|t| (t, String::new()));
        }
        None
    }
}

/// "9:05" → "09:05"，"13.19" → "13:19"；不是 `H(H):MM` 形式则返回 None
pub fn normalize_time(raw: &str) -> Option<String> {
    let t = raw.trim().replace('.', ":");
    let (hours, minutes) = t.split_once(':')?;
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(hours) || hours.len() > 2 || !all_digits(minutes) || minutes.len() != 2 {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    Some(format!("{:02}:{}", hours, minutes))
}
