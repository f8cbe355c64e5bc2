//! 提取参数 - 所有阈值都是软参数，只影响召回率/准确率，不会导致崩溃

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ExtractError;

/// 稳定帧检测参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// 相邻帧平均像素差上限（0-255 灰度）
    pub threshold: f32,
    /// 稳定期最少帧数
    pub min_run: usize,
    /// 稳定期两端丢弃的帧数（滚动回弹残影）
    pub edge_skip: usize,
    /// 对比区域排除的顶部比例（状态栏时钟）
    pub compare_crop_top: f32,
    /// 对比区域排除的底部比例（导航栏动画）
    pub compare_crop_bottom: f32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            threshold: 2.0,
            min_run: 10,
            edge_skip: 3,
            compare_crop_top: 0.10,
            compare_crop_bottom: 0.05,
        }
    }
}

impl StabilityConfig {
    pub fn for_fast_scroll() -> Self {
        Self {
            threshold: 2.5,
            min_run: 6,
            edge_skip: 2,
            ..Default::default()
        }
    }

    pub fn for_slow_scroll() -> Self {
        Self {
            threshold: 1.5,
            min_run: 15,
            edge_skip: 4,
            ..Default::default()
        }
    }
}

/// 布局解析参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// 内容区上边界（帧高比例），排除状态栏和标题栏
    pub content_top: f32,
    /// 内容区下边界（帧高比例），排除底部导航栏
    pub content_bottom: f32,
    /// 行聚类的 y 容差（像素）
    pub row_y_tolerance: f32,
    /// 行内子行聚类的 y 容差，必须比行容差更紧
    pub sub_line_y_tolerance: f32,
    /// 时间正则，OCR 经常把 ":" 识别成 "."
    pub time_pattern: String,
    /// 日期标题正则（忽略大小写）
    pub date_patterns: Vec<String>,
    /// 首个日期标题之前的提醒使用的默认日期
    pub default_date: String,
    /// 重复图标 OCR 误识别：x_min 超过帧宽的该比例
    pub icon_x_threshold: f32,
    /// 重复图标 OCR 误识别：置信度上限
    pub icon_max_confidence: f32,
    /// 重复图标 OCR 误识别：文本长度上限
    pub icon_max_text_len: usize,
    /// 像素扫描的右侧条带宽度（帧宽比例）
    pub icon_right_margin: f32,
    /// 亮像素阈值
    pub icon_brightness_threshold: u8,
    /// 一行内亮像素最少个数
    pub icon_min_bright_pixels: usize,
    /// 图标位置与行中心的最大 y 距离
    pub icon_y_tolerance: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            content_top: 0.12,
            content_bottom: 0.88,
            row_y_tolerance: 60.0,
            sub_line_y_tolerance: 25.0,
            time_pattern: r"\d{1,2}[:.]\d{2}".to_string(),
            date_patterns: vec![
                // "Tomorrow Sat 14 Feb" / "Tomorrow Saturday 14 Feb"
                r"^Tomorrow\s+(?:Mon|Tue|Wed|Thu|Fri|Sat|Sun)\w*\s+\d{1,2}\s+\w+".to_string(),
                // "Friday 20 Feb"
                r"^(?:Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday)\s+\d{1,2}\s+\w{3,}"
                    .to_string(),
                // "Fri 20 Feb"
                r"^(?:Mon|Tue|Wed|Thu|Fri|Sat|Sun)\s+\d{1,2}\s+\w{3,}".to_string(),
            ],
            default_date: "Thursday 13 Feb".to_string(),
            icon_x_threshold: 0.88,
            icon_max_confidence: 0.80,
            icon_max_text_len: 3,
            icon_right_margin: 0.12,
            icon_brightness_threshold: 100,
            icon_min_bright_pixels: 15,
            icon_y_tolerance: 50.0,
        }
    }
}

/// 跨帧去重参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// 日期 / 文本相似度阈值
    pub similarity_threshold: f32,
    /// 包含匹配：短文本词集合被长文本覆盖的最低比例
    pub containment_overlap: f32,
    /// 包含匹配：较短文本替换已有文本所需的置信度比例
    // TODO: recalibrate against a labelled set of recordings, 0.8 was hand-tuned
    pub containment_confidence_ratio: f32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            containment_overlap: 0.8,
            containment_confidence_ratio: 0.8,
        }
    }
}

/// OCR 适配层参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// 低于该置信度的检测结果直接丢弃
    pub min_confidence: f32,
    /// 并行 OCR 的线程数，0 表示使用 CPU 核数
    pub workers: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.3,
            workers: 0,
        }
    }
}

impl OcrConfig {
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub stability: StabilityConfig,
    pub layout: LayoutConfig,
    pub dedup: DedupConfig,
    pub ocr: OcrConfig,
}

impl ExtractorConfig {
    pub fn for_fast_scroll() -> Self {
        Self {
            stability: StabilityConfig::for_fast_scroll(),
            ..Default::default()
        }
    }

    pub fn for_slow_scroll() -> Self {
        Self {
            stability: StabilityConfig::for_slow_scroll(),
            ..Default::default()
        }
    }

    /// 从 JSON5 文件加载，缺省字段使用默认值
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json5(&raw)
    }

    pub fn from_json5(raw: &str) -> Result<Self, ExtractError> {
        let config: Self =
            json5::from_str(raw).map_err(|e| ExtractError::Config(e.to_string()))?;
        Ok(config)
    }
}

/// 把比例参数夹到 [0, 1]，NaN 视为 0
pub(crate) fn clamp_fraction(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tuned_values() {
        let config = ExtractorConfig::default();
        assert_eq!(config.stability.min_run, 10);
        assert_eq!(config.stability.edge_skip, 3);
        assert_eq!(config.layout.date_patterns.len(), 3);
        assert_eq!(config.layout.default_date, "Thursday 13 Feb");
        assert!((config.dedup.similarity_threshold - 0.85).abs() < f32::EPSILON);
    }

    #[test]
    fn test_json5_partial_override() {
        let raw = r#"{
            // 慢速滚动的录屏
            stability: { min_run: 20 },
            layout: { default_date: "Friday 14 Feb" },
        }"#;
        let config = ExtractorConfig::from_json5(raw).expect("config should parse");
        assert_eq!(config.stability.min_run, 20);
        assert_eq!(config.stability.edge_skip, 3);
        assert_eq!(config.layout.default_date, "Friday 14 Feb");
        assert_eq!(config.layout.row_y_tolerance, 60.0);
    }

    #[test]
    fn test_json5_invalid() {
        let result = ExtractorConfig::from_json5("{ stability: ");
        assert!(matches!(result, Err(ExtractError::Config(_))));
    }

    #[test]
    fn test_clamp_fraction() {
        assert_eq!(clamp_fraction(-0.5), 0.0);
        assert_eq!(clamp_fraction(1.5), 1.0);
        assert_eq!(clamp_fraction(f32::NAN), 0.0);
        assert_eq!(clamp_fraction(0.25), 0.25);
    }

    #[test]
    fn test_worker_count() {
        let config = OcrConfig {
            workers: 3,
            ..Default::default()
        };
        assert_eq!(config.worker_count(), 3);
        assert!(OcrConfig::default().worker_count() >= 1);
    }
}
