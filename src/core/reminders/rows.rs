//! 行聚类 - 两级 y 聚类，还原多行折叠文本的阅读顺序

use std::cmp::Ordering;

use crate::core::ocr::TextBox;

/// 一行提醒（可能由多个文字框、多条子行组成），只在单帧解析期间存在
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub boxes: Vec<TextBox>,
}

impl Row {
    /// 文本用单个空格拼接并合并连续空白
    pub fn text(&self) -> String {
        collapse_whitespace(
            &self
                .boxes
                .iter()
                .map(|b| b.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    pub fn y_center(&self) -> f32 {
        mean_y(&self.boxes)
    }

    pub fn mean_confidence(&self) -> f32 {
        if self.boxes.is_empty() {
            return 0.0;
        }
        self.boxes.iter().map(|b| b.confidence).sum::<f32>() / self.boxes.len() as f32
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn mean_y(boxes: &[TextBox]) -> f32 {
    if boxes.is_empty() {
        return 0.0;
    }
    boxes.iter().map(TextBox::y_center).sum::<f32>() / boxes.len() as f32
}

/// 全序比较，保证输入顺序不同也得到相同结果
fn compare_by_y(a: &TextBox, b: &TextBox) -> Ordering {
    a.y_center()
        .total_cmp(&b.y_center())
        .then(a.x_min.cmp(&b.x_min))
        .then_with(|| tie_break(a, b))
}

fn compare_by_x(a: &TextBox, b: &TextBox) -> Ordering {
    a.x_min
        .cmp(&b.x_min)
        .then(a.y_center().total_cmp(&b.y_center()))
        .then_with(|| tie_break(a, b))
}

fn tie_break(a: &TextBox, b: &TextBox) -> Ordering {
    a.y_min
        .cmp(&b.y_min)
        .then(a.x_max.cmp(&b.x_max))
        .then(a.y_max.cmp(&b.y_max))
        .then_with(|| a.text.cmp(&b.text))
        .then(a.confidence.total_cmp(&b.confidence))
}

/// 已按 y 排序的文字框做贪心聚类：与当前簇的 y 中心均值相差不超过容差则并入
fn cluster_by_y(sorted: Vec<TextBox>, tolerance: f32) -> Vec<Vec<TextBox>> {
    let mut clusters: Vec<Vec<TextBox>> = Vec::new();
    let mut current: Vec<TextBox> = Vec::new();

    for b in sorted {
        if !current.is_empty() && (b.y_center() - mean_y(&current)).abs() > tolerance {
            clusters.push(std::mem::take(&mut current));
        }
        current.push(b);
    }
    if !current.is_empty() {
        clusters.push(current);
    }
    clusters
}

/// 行内排序：按更紧的容差分成子行，子行内按 x 排序，再从上到下拼接
fn order_row_boxes(boxes: Vec<TextBox>, sub_line_tolerance: f32) -> Vec<TextBox> {
    if boxes.len() <= 1 {
        return boxes;
    }
    cluster_by_y(boxes, sub_line_tolerance)
        .into_iter()
        .flat_map(|mut line| {
            line.sort_by(compare_by_x);
            line
        })
        .collect()
}

pub fn group_into_rows(
    mut boxes: Vec<TextBox>,
    row_tolerance: f32,
    sub_line_tolerance: f32,
) -> Vec<Row> {
    boxes.sort_by(compare_by_y);
    cluster_by_y(boxes, row_tolerance)
        .into_iter()
        .map(|cluster| Row {
            boxes: order_row_boxes(cluster, sub_line_tolerance),
        })
        .collect()
}
