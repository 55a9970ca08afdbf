pub mod links;
pub mod overlay;
pub mod random;
pub mod surface;
#[cfg(feature = "desktop")]
pub mod window;

pub use links::{LinkMode, LinkRenderer, LinkStyle};
#[cfg(feature = "desktop")]
pub use minifb::Key;
pub use overlay::OverlayRenderer;
pub use random::{worst_case_links, RandomTable};
pub use surface::{CommandRecorder, DrawCommand, DrawSurface, Rgba};
#[cfg(feature = "desktop")]
pub use window::MinifbRenderer;
