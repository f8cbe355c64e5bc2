pub mod frame;
pub mod stability;

pub use frame::{Frame, FrameInfo, YFrameData};
pub use stability::{detect_stable_frames, StabilityDetector, StabilityStats};
