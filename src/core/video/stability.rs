//! 稳定帧检测 - 找出录屏中停止滚动的时间段，每段输出一帧代表帧

use log::{debug, info};

use super::frame::Frame;
use crate::core::config::{clamp_fraction, StabilityConfig};

/// 扫描统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StabilityStats {
    pub scanned_frames: u64,
    pub stable_periods: u64,
    /// 长度不足 min_run 被丢弃的连续段
    pub short_runs: u64,
}

/// 流式稳定帧检测器
///
/// 每帧只和前一帧比较（限定在对比区域内），与前一帧差值低于阈值的帧才计入稳定期；
/// 差值超过阈值的帧只负责打断稳定期，本身不属于任何稳定期。
/// 稳定期被打断或输入结束时结算，计入的帧数满足 `min_run` 才输出代表帧。
pub struct StabilityDetector {
    config: StabilityConfig,
    /// 上一帧的对比区域
    last_region: Option<Vec<u8>>,
    /// 当前稳定期内与前一帧差值低于阈值的帧
    run: Vec<Frame>,
    stats: StabilityStats,
}

impl StabilityDetector {
    pub fn new() -> Self {
        Self::with_config(StabilityConfig::default())
    }

    pub fn with_config(config: StabilityConfig) -> Self {
        Self {
            config,
            last_region: None,
            run: Vec::new(),
            stats: StabilityStats::default(),
        }
    }

    /// 送入下一帧；若这一帧打断了一个合格的稳定期，返回该稳定期的代表帧
    pub fn push(&mut self, frame: Frame) -> Option<Frame> {
        self.stats.scanned_frames += 1;
        let region = self.compare_region(&frame);

        let is_stable = match &self.last_region {
            Some(last) => {
                let diff = mean_abs_diff(last, &region);
                debug!("frame {}: diff {:.3}", frame.frame_number, diff);
                diff < self.config.threshold
            }
            None => false,
        };

        self.last_region = Some(region);

        if is_stable {
            self.run.push(frame);
            None
        } else {
            let closed = std::mem::take(&mut self.run);
            self.settle(closed)
        }
    }

    /// 输入结束，结算仍未关闭的稳定期
    pub fn finish(&mut self) -> Option<Frame> {
        self.last_region = None;
        let closed = std::mem::take(&mut self.run);
        self.settle(closed)
    }

    pub fn stats(&self) -> StabilityStats {
        self.stats
    }

    pub fn reset(&mut self) {
        self.last_region = None;
        self.run.clear();
        self.stats = StabilityStats::default();
    }

    fn settle(&mut self, run: Vec<Frame>) -> Option<Frame> {
        if run.is_empty() {
            return None;
        }
        if run.len() < self.config.min_run.max(1) {
            self.stats.short_runs += 1;
            return None;
        }

        let first = run[0].frame_number;
        let last = run[run.len() - 1].frame_number;
        let len = run.len();
        let pick = representative_index(len, self.config.edge_skip);
        let frame = run.into_iter().nth(pick)?;

        self.stats.stable_periods += 1;
        info!(
            "📸 stable period #{} (frames {}-{}, {} frames) → frame {}",
            self.stats.stable_periods, first, last, len, frame.frame_number
        );
        Some(frame)
    }

    /// 去掉顶部状态栏（时钟）和底部导航栏后的像素行
    fn compare_region(&self, frame: &Frame) -> Vec<u8> {
        let (top, bottom) = compare_rows(
            frame.height,
            self.config.compare_crop_top,
            self.config.compare_crop_bottom,
        );
        let w = frame.width as usize;
        frame
            .data
            .get(top * w..bottom * w)
            .map(|rows| rows.to_vec())
            .unwrap_or_default()
    }
}

impl Default for StabilityDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// 对比区域的 [top, bottom) 行范围
fn compare_rows(height: u32, crop_top: f32, crop_bottom: f32) -> (usize, usize) {
    let h = height as usize;
    let top = (h as f32 * clamp_fraction(crop_top)) as usize;
    let bottom = (h as f32 * (1.0 - clamp_fraction(crop_bottom))) as usize;
    let top = top.min(h);
    (top, bottom.clamp(top, h))
}

/// 平均绝对像素差；尺寸不同视为完全不同
fn mean_abs_diff(a: &[u8], b: &[u8]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    if a.is_empty() {
        return 0.0;
    }
    let total: u64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| (x as i16 - y as i16).unsigned_abs() as u64)
        .sum();
    total as f32 / a.len() as f32
}

/// 稳定期内代表帧的下标：两端各去掉 edge_skip 帧后取中点，
/// 剩余不足一帧时退回整段中点
pub fn representative_index(len: usize, edge_skip: usize) -> usize {
    if len <= edge_skip.saturating_mul(2) {
        len / 2
    } else {
        let usable = len - 2 * edge_skip;
        edge_skip + usable / 2
    }
}

/// 一次性扫描整个帧序列，按时间顺序返回每个稳定期的代表帧
pub fn detect_stable_frames<I>(frames: I, config: &StabilityConfig) -> Vec<Frame>
where
    I: IntoIterator<Item = Frame>,
{
    let mut detector = StabilityDetector::with_config(config.clone());
    let mut selected: Vec<Frame> = frames
        .into_iter()
        .filter_map(|frame| detector.push(frame))
        .collect();
    selected.extend(detector.finish());

    let stats = detector.stats();
    info!(
        "🎬 stability scan: {} frames, {} stable periods, {} short runs",
        stats.scanned_frames, stats.stable_periods, stats.short_runs
    );
    selected
}
