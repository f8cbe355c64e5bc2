//! 单帧布局解析 - 文字框 → 提醒列表
//!
//! 步骤：内容区过滤 → 重复图标分离 → 两级行聚类 → 逐行分类（日期标题 / 带时间的提醒 / 续接行）

use log::debug;

use super::patterns::LayoutPatterns;
use super::recurrence::{detect_icon_rows, is_icon_box, near_any};
use super::reminder::Reminder;
use super::rows::{group_into_rows, Row};
use crate::core::config::{clamp_fraction, LayoutConfig};
use crate::core::error::ExtractError;
use crate::core::ocr::TextBox;
use crate::core::video::Frame;

pub struct LayoutParser {
    config: LayoutConfig,
    patterns: LayoutPatterns,
}

/// 逐行处理时携带的游标：当前日期上下文 + 已产出的提醒（最后一个即“上一条提醒”）
#[derive(Default)]
struct RowCursor {
    date: Option<String>,
    reminders: Vec<Reminder>,
}

/// 本帧的重复图标位置
struct IconPositions {
    pixel: Vec<f32>,
    ocr: Vec<f32>,
}

impl IconPositions {
    fn matches(&self, row_y: f32, tolerance: f32) -> bool {
        near_any(row_y, &self.pixel, tolerance) || near_any(row_y, &self.ocr, tolerance)
    }
}

impl LayoutParser {
    pub fn new(config: LayoutConfig) -> Result<Self, ExtractError> {
        let patterns = LayoutPatterns::compile(&config)?;
        Ok(Self { config, patterns })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn parse_frame(&self, boxes: &[TextBox], frame: &Frame) -> Vec<Reminder> {
        let content = self.filter_content(boxes, frame.height);
        if content.is_empty() {
            return Vec::new();
        }

        let (icon_boxes, real_boxes): (Vec<TextBox>, Vec<TextBox>) = content
            .into_iter()
            .partition(|b| is_icon_box(b, frame.width, &self.config));
        for b in &icon_boxes {
            debug!(
                "repeat icon OCR: '{}' conf={:.2} at y={:.0}",
                b.text,
                b.confidence,
                b.y_center()
            );
        }
        let icons = IconPositions {
            pixel: detect_icon_rows(frame, &self.config),
            ocr: icon_boxes.iter().map(TextBox::y_center).collect(),
        };

        let rows = group_into_rows(
            real_boxes,
            self.config.row_y_tolerance,
            self.config.sub_line_y_tolerance,
        );

        rows.into_iter()
            .fold(RowCursor::default(), |cursor, row| {
                self.classify_row(cursor, row, &icons)
            })
            .reminders
    }

    /// 丢弃状态栏 / 标题栏 / 导航栏中的文字框
    fn filter_content(&self, boxes: &[TextBox], frame_height: u32) -> Vec<TextBox> {
        let h = frame_height as f32;
        let top = h * clamp_fraction(self.config.content_top);
        let bottom = h * clamp_fraction(self.config.content_bottom);
        boxes
            .iter()
            .filter(|b| b.y_min as f32 >= top && b.y_max as f32 <= bottom)
            .cloned()
            .collect()
    }

    fn classify_row(&self, mut cursor: RowCursor, row: Row, icons: &IconPositions) -> RowCursor {
        let full_text = row.text();

        if self.patterns.is_date_header(&full_text) {
            let label = self.patterns.date_label(&full_text);
            debug!("date header: {}", label);
            cursor.date = Some(label);
            return cursor;
        }

        let mut time = None;
        let mut body: Vec<String> = Vec::new();
        for b in &row.boxes {
            if time.is_none() {
                if let Some((t, rest)) = self.patterns.extract_time_prefix(&b.text) {
                    time = Some(t);
                    if !rest.is_empty() {
                        body.push(rest);
                    }
                    continue;
                }
            }
            body.push(b.text.clone());
        }

        let Some(time) = time else {
            // 没有时间：上一条提醒的续接行
            match cursor.reminders.last_mut() {
                Some(prev) => {
                    debug!("continuation: {}", full_text);
                    prev.append_line(&full_text);
                }
                None => debug!("orphan row dropped: {}", full_text),
            }
            return cursor;
        };

        let row_y = row.y_center();
        let reminder = Reminder {
            date: cursor
                .date
                .clone()
                .unwrap_or_else(|| self.config.default_date.clone()),
            time,
            text: super::rows::collapse_whitespace(&body.join(" ")),
            repeats: icons.matches(row_y, self.config.icon_y_tolerance),
            confidence: row.mean_confidence(),
        };
        debug!("reminder: {}", reminder);
        cursor.reminders.push(reminder);
        cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DedupConfig;
    use crate::core::reminders::deduplicate;

    const W: u32 = 1000;
    const H: u32 = 2000;

    fn parser() -> LayoutParser {
        LayoutParser::new(LayoutConfig::default()).expect("parser")
    }

    fn blank_frame() -> Frame {
        Frame::new(W, H, vec![0u8; (W * H) as usize], 0, 0)
    }

    fn text_box(text: &str, x: i32, y: i32, confidence: f32) -> TextBox {
        TextBox::new(text, confidence, x, y, x + 150, y + 40)
    }

    #[test]
    fn test_header_and_timed_rows() {
        let boxes = vec![
            text_box("Friday 20 Feb", 40, 400, 0.98),
            text_box("09:00", 40, 500, 0.95),
            text_box("Call the plumber", 220, 500, 0.85),
            text_box("13.19 Valentines", 40, 650, 0.9),
        ];
        let reminders = parser().parse_frame(&boxes, &blank_frame());

        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].date, "Friday 20 Feb");
        assert_eq!(reminders[0].time, "09:00");
        assert_eq!(reminders[0].text, "Call the plumber");
        assert!((reminders[0].confidence - 0.9).abs() < 1e-6);
        assert_eq!(reminders[1].time, "13:19");
        assert_eq!(reminders[1].text, "Valentines");
        assert!(!reminders[1].repeats);
    }

    #[test]
    fn test_default_date_before_first_header() {
        let boxes = vec![
            text_box("8:15 Vitamins", 40, 300, 0.9),
            text_box("Tomorrow Sat 14 Feb", 40, 450, 0.9),
            text_box("10:00 Brunch", 40, 550, 0.9),
        ];
        let reminders = parser().parse_frame(&boxes, &blank_frame());

        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].date, "Thursday 13 Feb");
        assert_eq!(reminders[0].time, "08:15");
        assert_eq!(reminders[1].date, "Sat 14 Feb");
    }

    #[test]
    fn test_chrome_boxes_filtered() {
        let boxes = vec![
            text_box("12:45", 40, 20, 0.99),
            text_box("Reminders", 40, 120, 0.99),
            text_box("09:00 Gym", 40, 600, 0.9),
            text_box("Today", 40, 1900, 0.99),
        ];
        let reminders = parser().parse_frame(&boxes, &blank_frame());
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].text, "Gym");
    }

    #[test]
    fn test_continuation_rows_and_placeholder() {
        let boxes = vec![
            text_box("Mon 16 Feb", 40, 300, 0.9),
            text_box("07:30", 40, 400, 0.9),
            text_box("Bins out", 40, 480, 0.9),
            text_box("recycling week", 40, 560, 0.9),
        ];
        let reminders = parser().parse_frame(&boxes, &blank_frame());

        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].time, "07:30");
        assert_eq!(reminders[0].text, "Bins out\nrecycling week");
    }

    #[test]
    fn test_unfilled_placeholder_is_dropped_by_dedup() {
        let boxes = vec![
            text_box("Mon 16 Feb", 40, 300, 0.9),
            text_box("07:30", 40, 400, 0.9),
            text_box("08:00 Coffee", 40, 520, 0.9),
            text_box("09:15", 40, 640, 0.9),
        ];
        let reminders = parser().parse_frame(&boxes, &blank_frame());

        let summary: Vec<(&str, &str)> = reminders
            .iter()
            .map(|r| (r.time.as_str(), r.text.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![("07:30", ""), ("08:00", "Coffee"), ("09:15", "")]
        );

        let merged = deduplicate(vec![reminders], &DedupConfig::default());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "Coffee");
    }

    #[test]
    fn test_orphan_continuation_dropped() {
        let boxes = vec![
            text_box("leftover text", 40, 300, 0.9),
            text_box("11:00 Haircut", 40, 450, 0.9),
        ];
        let reminders = parser().parse_frame(&boxes, &blank_frame());
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].text, "Haircut");
    }

    #[test]
    fn test_repeat_icon_from_ocr_box() {
        let boxes = vec![
            text_box("18:00 Pilates", 40, 500, 0.9),
            TextBox::new("C", 0.42, 920, 505, 960, 535),
            text_box("19:30 Dinner", 40, 700, 0.9),
        ];
        let reminders = parser().parse_frame(&boxes, &blank_frame());

        assert_eq!(reminders.len(), 2);
        assert!(reminders[0].repeats);
        assert_eq!(reminders[0].text, "Pilates");
        assert!(!reminders[1].repeats);
    }

    #[test]
    fn test_repeat_icon_from_pixels() {
        let mut frame = blank_frame();
        for y in 690..730u32 {
            for x in 930..970u32 {
                frame.data[(y * W + x) as usize] = 240;
            }
        }
        let boxes = vec![
            text_box("18:00 Pilates", 40, 500, 0.9),
            text_box("19:30 Dinner", 40, 700, 0.9),
        ];
        let reminders = parser().parse_frame(&boxes, &frame);

        assert!(!reminders[0].repeats);
        assert!(reminders[1].repeats);
    }

    #[test]
    fn test_empty_input() {
        assert!(parser().parse_frame(&[], &blank_frame()).is_empty());
    }
}
