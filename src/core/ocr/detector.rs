use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::text_box::RawDetection;
use crate::core::error::OcrError;
use crate::core::video::Frame;

/// 文字检测能力：输入一帧，输出文本 + 置信度 + 四边形
///
/// 任何实现都可以替换，核心逻辑不依赖具体 OCR 引擎。
pub trait TextDetector: Send + Sync {
    fn detect(&self, frame: &Frame) -> Result<Vec<RawDetection>, OcrError>;
}

type DetectionFn = dyn Fn(u64) -> Result<Vec<RawDetection>, OcrError> + Send + Sync;

/// 测试用检测器，按帧编号返回预设结果
pub struct MockTextDetector {
    pattern: Option<Box<DetectionFn>>,
}

impl MockTextDetector {
    pub fn new() -> Self {
        Self { pattern: None }
    }

    pub fn with_pattern<F>(pattern: F) -> Self
    where
        F: Fn(u64) -> Result<Vec<RawDetection>, OcrError> + Send + Sync + 'static,
    {
        Self {
            pattern: Some(Box::new(pattern)),
        }
    }

    /// 未列出的帧返回空结果
    pub fn with_fixed_frames(frames: HashMap<u64, Vec<RawDetection>>) -> Self {
        Self::with_pattern(move |frame_number| {
            Ok(frames.get(&frame_number).cloned().unwrap_or_default())
        })
    }
}

impl Default for MockTextDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TextDetector for MockTextDetector {
    fn detect(&self, frame: &Frame) -> Result<Vec<RawDetection>, OcrError> {
        match &self.pattern {
            Some(p) => p(frame.frame_number),
            None => Ok(Vec::new()),
        }
    }
}

/// 读取预先跑好的 OCR 结果：`<dir>/frame_<number>.ocr.json`
pub struct SidecarTextDetector {
    dir: PathBuf,
}

impl SidecarTextDetector {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, frame_number: u64) -> PathBuf {
        sidecar_path(&self.dir, frame_number)
    }
}

pub fn sidecar_path(dir: &Path, frame_number: u64) -> PathBuf {
    dir.join(format!("frame_{:06}.ocr.json", frame_number))
}

impl TextDetector for SidecarTextDetector {
    fn detect(&self, frame: &Frame) -> Result<Vec<RawDetection>, OcrError> {
        let path = self.path_for(frame.frame_number);
        debug!("OCR sidecar: {:?}", path);
        let raw = fs::read_to_string(&path)?;
        let detections: Vec<RawDetection> = serde_json::from_str(&raw)?;
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ocr::TextBox;

    fn create_test_frame(frame_number: u64) -> Frame {
        Frame::new(10, 10, vec![0u8; 100], 0, frame_number)
    }

    #[test]
    fn test_mock_detector_with_fixed_frames() {
        let mut frames = HashMap::new();
        frames.insert(
            5,
            vec![RawDetection::Box(TextBox::new("09:00 Gym", 0.9, 0, 0, 10, 10))],
        );
        let detector = MockTextDetector::with_fixed_frames(frames);

        assert_eq!(detector.detect(&create_test_frame(5)).expect("ok").len(), 1);
        assert!(detector.detect(&create_test_frame(6)).expect("ok").is_empty());
    }

    #[test]
    fn test_mock_detector_failure() {
        let detector = MockTextDetector::with_pattern(|n| {
            if n == 2 {
                Err(OcrError::Engine("timeout".to_string()))
            } else {
                Ok(Vec::new())
            }
        });
        assert!(detector.detect(&create_test_frame(2)).is_err());
        assert!(detector.detect(&create_test_frame(3)).is_ok());
    }

    #[test]
    fn test_sidecar_detector() {
        let dir = tempfile::tempdir().expect("tempdir");
        let detector = SidecarTextDetector::new(dir.path());
        fs::write(
            detector.path_for(7),
            r#"[{"text": "Friday 20 Feb", "confidence": 0.97, "bbox": [[10,200],[300,200],[300,240],[10,240]]}]"#,
        )
        .expect("write");

        let detections = detector.detect(&create_test_frame(7)).expect("sidecar");
        assert_eq!(detections.len(), 1);
        assert!(dir.path().join("frame_000007.ocr.json").exists());

        assert!(matches!(
            detector.detect(&create_test_frame(8)),
            Err(OcrError::Io(_))
        ));
    }
}
