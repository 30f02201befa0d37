pub mod canvas;
#[cfg(feature = "desktop")]
pub mod window;

pub use canvas::Canvas;
#[cfg(feature = "desktop")]
pub use minifb::Key;
#[cfg(feature = "desktop")]
pub use window::MinifbRenderer;
