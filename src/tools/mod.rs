//! Headless interactive map tools. The host view feeds mouse and key events
//! in; the tools report outcomes and expose their overlay state for drawing.
pub mod extent_picker;

pub use extent_picker::{
    ExtentPicker, Hud, Key, MouseButton, PickOutcome, PickerMode, RubberBand, ScreenPoint,
    ToolInput, ViewTransform,
};
