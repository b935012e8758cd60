//! Convenient re-exports for common types and traits

pub use crate::CanvasElement3dPlugin;
pub use crate::components::CanvasElement3d;
pub use crate::components::FitRect;
pub use crate::events::Rescale;
pub use crate::events::Rescaled;
pub use crate::fit::FitMode;
pub use crate::scaler::CanvasFit;
pub use crate::scaler::CanvasFitConfig;
pub use crate::support::collect_renderers;
