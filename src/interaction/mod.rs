pub mod drag;
pub mod gesture;
pub mod input;
pub mod throttle;

pub use drag::{DragController, DragEdge, DragSession, DragState};
pub use gesture::{LongPress, PressOutcome};
pub use input::{PointerEvent, PointerKind};
pub use throttle::Throttle;
