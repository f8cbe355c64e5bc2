pub mod detector;
pub mod text_box;

pub use detector::{sidecar_path, MockTextDetector, SidecarTextDetector, TextDetector};
pub use text_box::{adapt_detections, RawDetection, TextBox};
