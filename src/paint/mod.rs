pub mod controller;
pub mod line;

// Re-export commonly used items
pub use controller::{PaintController, PaintState, PointerEvent};
