//! 跨帧去重 - 同一条提醒在多帧中被重复识别，合并成一条
//!
//! 按帧的时间顺序、帧内的产出顺序依次合并；只有一个写入方，不能并发合并。

use std::collections::HashMap;

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

use super::reminder::Reminder;
use super::similarity::{sequence_similarity, text_similarity, word_set};
use crate::core::config::DedupConfig;

/// "Thursday 13 Feb" / "Thu 13 Feb" → ("13", "feb")
static DAY_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s+(\w{3})").expect("static day-month pattern"));

/// 合并决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// 新提醒，追加到列表末尾
    Added,
    /// 同一条提醒，保留已有识别结果
    Kept(usize),
    /// 同一条提醒，用新的识别结果替换文本
    Replaced(usize),
    /// 空文本，直接丢弃
    Skipped,
}

pub struct ReminderDeduplicator {
    config: DedupConfig,
    merged: Vec<Reminder>,
    seen: usize,
}

impl ReminderDeduplicator {
    pub fn new() -> Self {
        Self::with_config(DedupConfig::default())
    }

    pub fn with_config(config: DedupConfig) -> Self {
        Self {
            config,
            merged: Vec::new(),
            seen: 0,
        }
    }

    pub fn push(&mut self, incoming: Reminder) -> MergeOutcome {
        self.seen += 1;
        if incoming.text.trim().is_empty() {
            return MergeOutcome::Skipped;
        }

        for (idx, existing) in self.merged.iter_mut().enumerate() {
            if is_same_reminder(existing, &incoming, &self.config) {
                existing.repeats |= incoming.repeats;
                if incoming.confidence > existing.confidence {
                    debug!("replaced (higher conf): {}", incoming);
                    existing.text = incoming.text;
                    existing.confidence = incoming.confidence;
                    return MergeOutcome::Replaced(idx);
                }
                return MergeOutcome::Kept(idx);
            }

            if is_contained(existing, &incoming, &self.config) {
                existing.repeats |= incoming.repeats;
                // 更短的识别结果通常更干净，只要置信度不明显更低就采用
                let shorter = incoming.text.chars().count() < existing.text.chars().count();
                if shorter
                    && incoming.confidence
                        >= existing.confidence * self.config.containment_confidence_ratio
                {
                    debug!("containment match, shorter text wins: {}", incoming);
                    existing.text = incoming.text;
                    existing.confidence = incoming.confidence;
                    return MergeOutcome::Replaced(idx);
                }
                debug!("containment match merged: {}", incoming);
                return MergeOutcome::Kept(idx);
            }
        }

        debug!("new: {}", incoming);
        self.merged.push(incoming);
        MergeOutcome::Added
    }

    pub fn push_frame(&mut self, reminders: Vec<Reminder>) {
        for reminder in reminders {
            self.push(reminder);
        }
    }

    pub fn len(&self) -> usize {
        self.merged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }

    /// 按日期标签首次出现的顺序、再按时间排序后输出
    pub fn finish(self) -> Vec<Reminder> {
        info!(
            "🧹 dedup: {} observed → {} unique reminders",
            self.seen,
            self.merged.len()
        );

        let mut date_order: HashMap<String, usize> = HashMap::new();
        for r in &self.merged {
            let next = date_order.len();
            date_order.entry(r.date.clone()).or_insert(next);
        }

        let mut merged = self.merged;
        merged.sort_by(|a, b| {
            date_order[&a.date]
                .cmp(&date_order[&b.date])
                .then_with(|| a.time.cmp(&b.time))
        });
        merged
    }
}

impl Default for ReminderDeduplicator {
    fn default() -> Self {
        Self::new()
    }
}

/// 合并所有帧的提醒
pub fn deduplicate(per_frame: Vec<Vec<Reminder>>, config: &DedupConfig) -> Vec<Reminder> {
    let mut dedup = ReminderDeduplicator::with_config(config.clone());
    for frame in per_frame {
        dedup.push_frame(frame);
    }
    dedup.finish()
}

fn day_month_key(date: &str) -> Option<(String, String)> {
    let caps = DAY_MONTH.captures(date)?;
    Some((caps[1].to_string(), caps[2].to_lowercase()))
}

/// 两个日期标签是否指同一天
///
/// 都能解析出 (日, 月) 时只比较 (日, 月)，否则退回字符相似度。
pub fn date_matches(a: &str, b: &str, threshold: f32) -> bool {
    if a == b {
        return true;
    }
    match (day_month_key(a), day_month_key(b)) {
        (Some(ka), Some(kb)) => ka == kb,
        _ => sequence_similarity(a, b) >= threshold,
    }
}

fn is_same_reminder(a: &Reminder, b: &Reminder, config: &DedupConfig) -> bool {
    date_matches(&a.date, &b.date, config.similarity_threshold)
        && a.time == b.time
        && text_similarity(&a.text, &b.text) >= config.similarity_threshold
}

/// 较短文本的词大部分出现在较长文本中（不同帧切分出多余片段的情况）
fn is_contained(a: &Reminder, b: &Reminder, config: &DedupConfig) -> bool {
    if !date_matches(&a.date, &b.date, config.similarity_threshold) || a.time != b.time {
        return false;
    }
    let (short, long) = if a.text.chars().count() <= b.text.chars().count() {
        (&a.text, &b.text)
    } else {
        (&b.text, &a.text)
    };
    let short_words = word_set(short);
    if short_words.is_empty() {
        return false;
    }
    let long_words = word_set(long);
    let overlap = short_words.intersection(&long_words).count() as f32 / short_words.len() as f32;
    overlap >= config.containment_overlap
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reminder(date: &str, time: &str, text: &str, confidence: f32) -> Reminder {
        Reminder::new(date, time, text, false, confidence)
    }

    fn dedup(frames: Vec<Vec<Reminder>>) -> Vec<Reminder> {
        deduplicate(frames, &DedupConfig::default())
    }

    #[test]
    fn test_date_matches() {
        assert!(date_matches("Thursday 13 Feb", "Thu 13 Feb", 0.85));
        assert!(date_matches("Thu 13 Feb", "thu 13 FEB", 0.85));
        assert!(!date_matches("Thu 13 Feb", "Thu 18 Feb", 0.85));
        assert!(!date_matches("Thu 13 Feb", "Thu 13 Mar", 0.85));
        assert!(date_matches("Today", "Todav", 0.75));
    }

    #[test]
    fn test_weekday_abbreviation_merges() {
        let merged = dedup(vec![
            vec![reminder("Thursday 13 Feb", "09:00", "Water the plants", 0.9)],
            vec![reminder("Thu 13 Feb", "09:00", "Water the plant", 0.8)],
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].date, "Thursday 13 Feb");
        assert_eq!(merged[0].text, "Water the plants");
    }

    #[test]
    fn test_partial_capture_resolves_to_best_read() {
        let merged = dedup(vec![
            vec![reminder("Fri 20 Feb", "10:30", "Dentist appoint", 0.6)],
            vec![reminder("Fri 20 Feb", "10:30", "Dentist appointment", 0.9)],
            vec![reminder("Fri 20 Feb", "10:30", "Dentist appointment", 0.85)],
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "Dentist appointment");
        assert!((merged[0].confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_higher_confidence_wins_in_either_order() {
        let a = reminder("Sat 14 Feb", "18:00", "Dinner with Sam", 0.95);
        let b = reminder("Sat 14 Feb", "18:00", "Dinner wlth Sam", 0.7);

        let ab = dedup(vec![vec![a.clone()], vec![b.clone()]]);
        let ba = dedup(vec![vec![b], vec![a]]);
        assert_eq!(ab.len(), 1);
        assert_eq!(ba.len(), 1);
        assert_eq!(ab[0].text, "Dinner with Sam");
        assert_eq!(ba[0].text, "Dinner with Sam");
    }

    #[test]
    fn test_repeats_flag_is_absorbed() {
        let mut first = reminder("Sat 14 Feb", "07:00", "Gym session", 0.95);
        first.repeats = false;
        let mut second = reminder("Sat 14 Feb", "07:00", "Gym session", 0.5);
        second.repeats = true;

        let merged = dedup(vec![vec![first], vec![second]]);
        assert_eq!(merged.len(), 1);
        assert!(merged[0].repeats);
        assert!((merged[0].confidence - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_containment_prefers_shorter_clean_text() {
        let long = reminder(
            "Mon 16 Feb",
            "08:00",
            "Take bins out tonight before collection starts Ok",
            0.9,
        );
        let short = reminder("Mon 16 Feb", "08:00", "Take bins out tonight", 0.75);

        let mut d = ReminderDeduplicator::new();
        assert_eq!(d.push(long), MergeOutcome::Added);
        assert_eq!(d.push(short), MergeOutcome::Replaced(0));
        let merged = d.finish();
        assert_eq!(merged[0].text, "Take bins out tonight");
        assert!((merged[0].confidence - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_containment_keeps_stored_when_much_less_confident() {
        let long = reminder(
            "Mon 16 Feb",
            "08:00",
            "Take bins out tonight before collection starts Ok",
            0.9,
        );
        let short = reminder("Mon 16 Feb", "08:00", "Take bins out tonight", 0.7);

        let mut d = ReminderDeduplicator::new();
        d.push(long.clone());
        assert_eq!(d.push(short), MergeOutcome::Kept(0));
        assert_eq!(d.finish()[0].text, long.text);
    }

    #[test]
    fn test_empty_text_dropped() {
        let mut d = ReminderDeduplicator::new();
        assert_eq!(
            d.push(reminder("Mon 16 Feb", "08:00", "", 0.9)),
            MergeOutcome::Skipped
        );
        assert!(d.is_empty());
    }

    #[test]
    fn test_different_times_stay_separate() {
        let merged = dedup(vec![vec![
            reminder("Mon 16 Feb", "08:00", "Stretch", 0.9),
            reminder("Mon 16 Feb", "20:00", "Stretch", 0.9),
        ]]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_sorted_by_first_date_then_time() {
        let merged = dedup(vec![
            vec![
                reminder("Fri 20 Feb", "13:00", "Lunch", 0.9),
                reminder("Fri 20 Feb", "09:00", "Standup", 0.9),
            ],
            vec![
                reminder("Sat 21 Feb", "08:00", "Run", 0.9),
                reminder("Fri 20 Feb", "17:00", "Pub", 0.9),
            ],
        ]);
        let order: Vec<(&str, &str)> = merged
            .iter()
            .map(|r| (r.date.as_str(), r.time.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Fri 20 Feb", "09:00"),
                ("Fri 20 Feb", "13:00"),
                ("Fri 20 Feb", "17:00"),
                ("Sat 21 Feb", "08:00"),
            ]
        );
    }
}
