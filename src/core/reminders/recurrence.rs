//! 重复图标检测
//!
//! 两条路径同时使用：
//! 1. OCR 把图标误识别成右边缘的短文本、低置信度文字框
//! 2. 像素扫描右侧条带，连续的高亮行簇就是图标位置

use log::debug;

use crate::core::config::{clamp_fraction, LayoutConfig};
use crate::core::ocr::TextBox;
use crate::core::video::Frame;

/// 是否是被 OCR 误识别的重复图标
pub fn is_icon_box(text_box: &TextBox, frame_width: u32, config: &LayoutConfig) -> bool {
    let right_threshold = frame_width as f32 * clamp_fraction(config.icon_x_threshold);
    text_box.x_min as f32 > right_threshold
        && text_box.confidence <= config.icon_max_confidence
        && text_box.text.trim().chars().count() <= config.icon_max_text_len
}

/// 扫描右侧条带，返回图标的 y 中心（帧坐标）
pub fn detect_icon_rows(frame: &Frame, config: &LayoutConfig) -> Vec<f32> {
    let w = frame.width as usize;
    let h = frame.height as usize;
    let margin_start = (w as f32 * (1.0 - clamp_fraction(config.icon_right_margin))) as usize;
    let top = ((h as f32 * clamp_fraction(config.content_top)) as usize).min(h);
    let bottom = ((h as f32 * clamp_fraction(config.content_bottom)) as usize).clamp(top, h);
    let min_pixels = config.icon_min_bright_pixels.max(1);

    let mut centers = Vec::new();
    let mut cluster_start: Option<usize> = None;

    for y in top..bottom {
        let bright = frame
            .row(y as u32)
            .get(margin_start.min(w)..)
            .unwrap_or(&[])
            .iter()
            .filter(|&&px| px > config.icon_brightness_threshold)
            .count();

        match (bright >= min_pixels, cluster_start) {
            (true, None) => cluster_start = Some(y),
            (false, Some(start)) => {
                centers.push(((start + y) / 2) as f32);
                cluster_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = cluster_start {
        centers.push(((start + bottom) / 2) as f32);
    }

    debug!("pixel repeat icons at y={:?}", centers);
    centers
}

pub fn near_any(row_y: f32, positions: &[f32], tolerance: f32) -> bool {
    positions.iter().any(|&y| (row_y - y).abs() < tolerance)
}
