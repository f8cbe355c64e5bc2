//! 结果输出 - 日期标签解析为日历日期，写出 CSV / JSON

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::error::ExtractError;
use crate::core::reminders::Reminder;

static DAY_MONTH_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s+(\w+)").expect("static day-month pattern"));

const CSV_HEADER: &str = "title~datetime~recurrence";

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

/// "Thursday 13 Feb" → 2026-02-13；没有可识别的日/月返回 None
pub fn resolve_date(label: &str, year: i32) -> Option<NaiveDate> {
    let caps = DAY_MONTH_NAME.captures(label)?;
    let day: u32 = caps[1].parse().ok()?;
    let Some(month) = month_number(&caps[2]) else {
        warn!("unknown month in date '{}'", label);
        return None;
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// 生成 `~` 分隔的 CSV，日期无法解析的提醒被丢弃
pub fn format_csv(reminders: &[Reminder], year: i32) -> String {
    let mut lines = vec![CSV_HEADER.to_string()];
    for r in reminders {
        let Some(date) = resolve_date(&r.date, year) else {
            warn!("⚠️ skipping reminder with unparseable date: {}", r);
            continue;
        };
        let text = r.text.replace('\n', "\\n");
        let recurrence = if r.repeats { "Y" } else { "" };
        lines.push(format!(
            "{}~{} {}~{}",
            text,
            date.format("%Y-%m-%d"),
            r.time,
            recurrence
        ));
    }
    let mut csv = lines.join("\n");
    csv.push('\n');
    csv
}

pub fn write_csv(reminders: &[Reminder], dir: &Path, year: i32) -> Result<PathBuf, ExtractError> {
    fs::create_dir_all(dir)?;
    let path = dir.join("reminders.csv");
    let csv = format_csv(reminders, year);
    fs::write(&path, &csv)?;
    info!(
        "📝 wrote {} reminders to {:?}",
        csv.lines().count().saturating_sub(1),
        path
    );
    Ok(path)
}

pub fn write_json(reminders: &[Reminder], dir: &Path) -> Result<PathBuf, ExtractError> {
    fs::create_dir_all(dir)?;
    let path = dir.join("reminders.json");
    fs::write(&path, serde_json::to_string_pretty(reminders)?)?;
    Ok(path)
}
