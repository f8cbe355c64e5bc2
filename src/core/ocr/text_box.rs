use serde::{Deserialize, Serialize};

/// 一个文字检测结果（轴对齐包围盒），创建后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub text: String,
    pub confidence: f32,
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl TextBox {
    pub fn new(
        text: impl Into<String>,
        confidence: f32,
        x_min: i32,
        y_min: i32,
        x_max: i32,
        y_max: i32,
    ) -> Self {
        Self {
            text: text.into(),
            confidence,
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// 四边形 → 包围盒（取各顶点 x/y 的最小最大值）
    pub fn from_quad(text: impl Into<String>, confidence: f32, quad: &[[f32; 2]]) -> Option<Self> {
        if quad.is_empty() {
            return None;
        }
        let (mut x_min, mut y_min) = (f32::MAX, f32::MAX);
        let (mut x_max, mut y_max) = (f32::MIN, f32::MIN);
        for &[x, y] in quad {
            x_min = x_min.min(x);
            y_min = y_min.min(y);
            x_max = x_max.max(x);
            y_max = y_max.max(y);
        }
        Some(Self::new(
            text,
            confidence,
            x_min as i32,
            y_min as i32,
            x_max as i32,
            y_max as i32,
        ))
    }

    pub fn x_center(&self) -> f32 {
        (self.x_min + self.x_max) as f32 / 2.0
    }

    pub fn y_center(&self) -> f32 {
        (self.y_min + self.y_max) as f32 / 2.0
    }
}

/// 外部 OCR 的原始输出，两种形态都接受
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDetection {
    /// `{text, confidence, bbox: [[x, y]; 4]}`
    Quad {
        text: String,
        confidence: f32,
        bbox: Vec<[f32; 2]>,
    },
    /// 已经是包围盒
    Box(TextBox),
}

impl RawDetection {
    pub fn confidence(&self) -> f32 {
        match self {
            RawDetection::Quad { confidence, .. } => *confidence,
            RawDetection::Box(b) => b.confidence,
        }
    }

    pub fn into_text_box(self) -> Option<TextBox> {
        match self {
            RawDetection::Quad {
                text,
                confidence,
                bbox,
            } => TextBox::from_quad(text, confidence, &bbox),
            RawDetection::Box(b) => Some(b),
        }
    }
}

/// OCR 输入适配：低置信度丢弃、文本去首尾空白、空文本丢弃
pub fn adapt_detections(detections: Vec<RawDetection>, min_confidence: f32) -> Vec<TextBox> {
    detections
        .into_iter()
        .filter(|d| d.confidence() >= min_confidence)
        .filter_map(RawDetection::into_text_box)
        .filter_map(|mut b| {
            let trimmed = b.text.trim();
            if trimmed.is_empty() {
                return None;
            }
            if trimmed.len() != b.text.len() {
                b.text = trimmed.to_string();
            }
            Some(b)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_reduction() {
        let quad = [[10.6, 20.2], [110.9, 18.0], [111.0, 45.5], [9.8, 47.1]];
        let b = TextBox::from_quad("13:19 valentines", 0.9, &quad).expect("box");
        assert_eq!((b.x_min, b.y_min, b.x_max, b.y_max), (9, 18, 111, 47));
        assert_eq!(b.y_center(), 32.5);
        assert_eq!(b.x_center(), 60.0);
        assert!(TextBox::from_quad("x", 0.9, &[]).is_none());
    }

    #[test]
    fn test_raw_detection_json_shapes() {
        let json = r#"[
            {"text": " Dentist ", "confidence": 0.95, "bbox": [[0,0],[50,0],[50,20],[0,20]]},
            {"text": "09:00", "confidence": 0.99, "x_min": 0, "y_min": 30, "x_max": 40, "y_max": 50},
            {"text": "noise", "confidence": 0.1, "bbox": [[0,0],[1,1]]},
            {"text": "   ", "confidence": 0.9, "bbox": [[0,0],[1,1]]}
        ]"#;
        let raw: Vec<RawDetection> = serde_json::from_str(json).expect("parse");
        let boxes = adapt_detections(raw, 0.3);

        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].text, "Dentist");
        assert_eq!(boxes[1].text, "09:00");
        assert_eq!(boxes[1].y_max, 50);
    }
}
