use std::path::Path;
use std::time::Duration;

use image::{DynamicImage, GrayImage};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::core::error::ExtractError;

/// 帧数据结构（8 位灰度，行优先）
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub timestamp: Duration,
    pub frame_number: u64,
}

impl Frame {
    /// 缓冲区长度与宽高不一致时补零/截断，保证后续按坐标取像素不会越界
    pub fn new(
        width: u32,
        height: u32,
        mut data: Vec<u8>,
        timestamp_ms: u64,
        frame_number: u64,
    ) -> Self {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            warn!(
                "⚠️ frame {}: buffer has {} bytes, expected {}",
                frame_number,
                data.len(),
                expected
            );
            data.resize(expected, 0);
        }
        Self {
            width,
            height,
            data,
            timestamp: Duration::from_millis(timestamp_ms),
            frame_number,
        }
    }

    /// RGBA → 灰度 (BT.601 整数近似)
    pub fn from_rgba(
        width: u32,
        height: u32,
        rgba: &[u8],
        timestamp_ms: u64,
        frame_number: u64,
    ) -> Self {
        let gray = rgba
            .chunks_exact(4)
            .map(|px| ((px[0] as u32 * 299 + px[1] as u32 * 587 + px[2] as u32 * 114) / 1000) as u8)
            .collect();
        Self::new(width, height, gray, timestamp_ms, frame_number)
    }

    pub fn from_image(img: &DynamicImage, timestamp_ms: u64, frame_number: u64) -> Self {
        let gray = img.to_luma8();
        let (width, height) = gray.dimensions();
        Self::new(width, height, gray.into_raw(), timestamp_ms, frame_number)
    }

    pub fn open(
        path: impl AsRef<Path>,
        timestamp_ms: u64,
        frame_number: u64,
    ) -> Result<Self, ExtractError> {
        let img = image::open(path.as_ref())?;
        Ok(Self::from_image(&img, timestamp_ms, frame_number))
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// 第 y 行的像素；越界返回空切片
    pub fn row(&self, y: u32) -> &[u8] {
        if y >= self.height {
            return &[];
        }
        let w = self.width as usize;
        let start = y as usize * w;
        self.data.get(start..start + w).unwrap_or(&[])
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp.as_millis() as u64
    }

    /// 保存为图片，格式由扩展名决定
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ExtractError> {
        let img = GrayImage::from_raw(self.width, self.height, self.data.clone()).ok_or(
            ExtractError::FrameSize {
                expected: self.pixel_count(),
                actual: self.data.len(),
            },
        )?;
        img.save(path.as_ref())?;
        Ok(())
    }
}

/// 帧元数据（轻量级，用于传递信息）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
    pub timestamp_ms: u64,
    pub frame_number: u64,
}

impl FrameInfo {
    pub fn from_frame(frame: &Frame) -> Self {
        Self {
            width: frame.width,
            height: frame.height,
            timestamp_ms: frame.timestamp_ms(),
            frame_number: frame.frame_number,
        }
    }
}

/// 原生解码器传来的 Y 平面帧数据
#[derive(Debug, Clone)]
pub struct YFrameData {
    pub width: u32,
    pub height: u32,
    pub y_plane: Vec<u8>,
    pub timestamp_ms: u64,
    pub frame_number: u64,
}

impl YFrameData {
    /// Y 平面本身就是灰度图，长度不对直接报错
    pub fn into_frame(self) -> Result<Frame, ExtractError> {
        let expected = self.width as usize * self.height as usize;
        if self.y_plane.len() < expected {
            return Err(ExtractError::FrameSize {
                expected,
                actual: self.y_plane.len(),
            });
        }
        let mut y_plane = self.y_plane;
        y_plane.truncate(expected);
        Ok(Frame::new(
            self.width,
            self.height,
            y_plane,
            self.timestamp_ms,
            self.frame_number,
        ))
    }
}
