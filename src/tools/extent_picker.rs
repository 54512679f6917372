use tracing::debug;

use crate::types::{Extent, MapPoint};

/// Position on the map view in screen pixels (y grows downwards)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Screen-to-map mapping of a north-up map view
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewTransform {
    /// Map coordinates of the top-left screen pixel
    pub origin: MapPoint,
    pub map_units_per_pixel: f64,
}

impl ViewTransform {
    pub fn new(origin: MapPoint, map_units_per_pixel: f64) -> Self {
        Self {
            origin,
            map_units_per_pixel,
        }
    }

    pub fn to_map(&self, p: ScreenPoint) -> MapPoint {
        MapPoint::new(
            self.origin.x + p.x as f64 * self.map_units_per_pixel,
            self.origin.y - p.y as f64 * self.map_units_per_pixel,
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// Input events delivered by the host view, one at a time
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToolInput {
    Press { button: MouseButton, pos: ScreenPoint },
    Move { pos: ScreenPoint },
    Release { button: MouseButton, pos: ScreenPoint },
    KeyPress(Key),
}

/// Whether a pick also reports the dragged size in screen pixels
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PickerMode {
    #[default]
    Extent,
    WithPixelSize,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PickOutcome {
    Picked {
        extent: Extent,
        /// `(width, height)` of the drag in pixels, for `PickerMode::WithPixelSize`
        pixel_size: Option<(u32, u32)>,
    },
    Cancelled,
}

/// Rectangle overlay drawn while dragging
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RubberBand {
    visible: bool,
    ring: Vec<MapPoint>,
}

impl RubberBand {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Closed outline (TL, TR, BR, BL, TL); empty once reset
    pub fn ring(&self) -> &[MapPoint] {
        &self.ring
    }

    fn set_rect(&mut self, rect: &Extent) {
        self.ring = rect.ring();
        self.visible = true;
    }

    fn reset(&mut self) {
        self.ring.clear();
        self.visible = false;
    }
}

/// Heads-up text shown next to the cursor during a drag
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hud {
    visible: bool,
    text: String,
}

impl Hud {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn show(&mut self, text: String) {
        self.text = text;
        self.visible = true;
    }

    fn reset(&mut self) {
        self.text.clear();
        self.visible = false;
    }
}

#[derive(Copy, Clone, Debug)]
struct DragStart {
    screen: ScreenPoint,
    map: MapPoint,
}

/// Click-drag rectangle tool.
///
/// Left press starts a drag, moves update the rubber band (and HUD), and the
/// left release emits the normalised extent. Escape or a right press cancels.
/// Either way the overlays are reset and the tool deactivates itself.
#[derive(Clone, Debug)]
pub struct ExtentPicker {
    view: ViewTransform,
    mode: PickerMode,
    active: bool,
    start: Option<DragStart>,
    rubber_band: RubberBand,
    hud: Hud,
}

impl ExtentPicker {
    /// New tool, already active on the view
    pub fn new(view: ViewTransform, mode: PickerMode) -> Self {
        Self {
            view,
            mode,
            active: true,
            start: None,
            rubber_band: RubberBand::default(),
            hud: Hud::default(),
        }
    }

    /// Re-arm the tool after a pick or cancellation
    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_dragging(&self) -> bool {
        self.start.is_some()
    }

    pub fn rubber_band(&self) -> &RubberBand {
        &self.rubber_band
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    /// Feed one input event; returns an outcome when the interaction ends
    pub fn handle(&mut self, input: ToolInput) -> Option<PickOutcome> {
        if !self.active {
            return None;
        }
        match input {
            ToolInput::KeyPress(Key::Escape) => Some(self.cancel()),
            ToolInput::KeyPress(Key::Other) => None,
            ToolInput::Press {
                button: MouseButton::Right,
                ..
            } => Some(self.cancel()),
            ToolInput::Press {
                button: MouseButton::Left,
                pos,
            } => {
                let map = self.view.to_map(pos);
                self.start = Some(DragStart { screen: pos, map });
                self.update_overlays(pos);
                None
            }
            ToolInput::Press { .. } => None,
            ToolInput::Move { pos } => {
                if self.start.is_some() {
                    self.update_overlays(pos);
                }
                None
            }
            ToolInput::Release {
                button: MouseButton::Left,
                pos,
            } => {
                let start = self.start?;
                let extent = Extent::from_corners(start.map, self.view.to_map(pos));
                let pixel_size = match self.mode {
                    PickerMode::Extent => None,
                    PickerMode::WithPixelSize => Some(pixel_size(start.screen, pos)),
                };
                self.cleanup();
                debug!("Picked extent {} (pixels: {:?})", extent, pixel_size);
                Some(PickOutcome::Picked { extent, pixel_size })
            }
            ToolInput::Release { .. } => None,
        }
    }

    fn update_overlays(&mut self, pos: ScreenPoint) {
        let Some(start) = self.start else {
            return;
        };
        let rect = Extent::from_corners(start.map, self.view.to_map(pos));
        self.rubber_band.set_rect(&rect);
        if self.mode == PickerMode::WithPixelSize {
            let (w, h) = pixel_size(start.screen, pos);
            self.hud.show(format!("{} × {} px", w, h));
        }
    }

    fn cancel(&mut self) -> PickOutcome {
        self.cleanup();
        debug!("Extent pick cancelled");
        PickOutcome::Cancelled
    }

    fn cleanup(&mut self) {
        self.rubber_band.reset();
        self.hud.reset();
        self.start = None;
        self.active = false;
    }
}

fn pixel_size(a: ScreenPoint, b: ScreenPoint) -> (u32, u32) {
    (a.x.abs_diff(b.x), a.y.abs_diff(b.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewTransform {
        ViewTransform::new(MapPoint::new(1000.0, 5000.0), 2.0)
    }

    fn left_press(x: i32, y: i32) -> ToolInput {
        ToolInput::Press {
            button: MouseButton::Left,
            pos: ScreenPoint::new(x, y),
        }
    }

    fn left_release(x: i32, y: i32) -> ToolInput {
        ToolInput::Release {
            button: MouseButton::Left,
            pos: ScreenPoint::new(x, y),
        }
    }

    #[test]
    fn drag_emits_normalised_extent() {
        let mut tool = ExtentPicker::new(view(), PickerMode::Extent);
        assert_eq!(tool.handle(left_press(50, 10)), None);
        assert_eq!(
            tool.handle(ToolInput::Move {
                pos: ScreenPoint::new(20, 40)
            }),
            None
        );
        assert!(tool.rubber_band().is_visible());
        assert_eq!(tool.rubber_band().ring().len(), 5);

        let out = tool.handle(left_release(10, 60));
        assert_eq!(
            out,
            Some(PickOutcome::Picked {
                extent: Extent::new(1020.0, 4880.0, 1100.0, 4980.0),
                pixel_size: None
            })
        );
        assert!(!tool.rubber_band().is_visible());
        assert!(!tool.is_active());
    }

    #[test]
    fn pixel_size_variant_reports_drag_size_and_hud() {
        let mut tool = ExtentPicker::new(view(), PickerMode::WithPixelSize);
        tool.handle(left_press(100, 100));
        tool.handle(ToolInput::Move {
            pos: ScreenPoint::new(40, 130),
        });
        assert!(tool.hud().is_visible());
        assert_eq!(tool.hud().text(), "60 × 30 px");

        match tool.handle(left_release(40, 130)) {
            Some(PickOutcome::Picked { pixel_size, .. }) => assert_eq!(pixel_size, Some((60, 30))),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!tool.hud().is_visible());
    }

    #[test]
    fn escape_cancels_and_hides_overlays() {
        let mut tool = ExtentPicker::new(view(), PickerMode::WithPixelSize);
        tool.handle(left_press(5, 5));
        tool.handle(ToolInput::Move {
            pos: ScreenPoint::new(25, 25),
        });
        assert!(tool.rubber_band().is_visible());

        assert_eq!(
            tool.handle(ToolInput::KeyPress(Key::Escape)),
            Some(PickOutcome::Cancelled)
        );
        assert!(!tool.rubber_band().is_visible());
        assert!(tool.rubber_band().ring().is_empty());
        assert!(!tool.hud().is_visible());
        assert!(!tool.is_dragging());
        assert!(!tool.is_active());

        // Deactivated: later events are ignored
        assert_eq!(tool.handle(left_release(30, 30)), None);
    }

    #[test]
    fn right_click_cancels() {
        let mut tool = ExtentPicker::new(view(), PickerMode::Extent);
        tool.handle(left_press(5, 5));
        let out = tool.handle(ToolInput::Press {
            button: MouseButton::Right,
            pos: ScreenPoint::new(8, 8),
        });
        assert_eq!(out, Some(PickOutcome::Cancelled));
        assert!(!tool.rubber_band().is_visible());
    }

    #[test]
    fn stray_events_are_ignored() {
        let mut tool = ExtentPicker::new(view(), PickerMode::Extent);
        assert_eq!(tool.handle(left_release(3, 3)), None);
        assert_eq!(
            tool.handle(ToolInput::Move {
                pos: ScreenPoint::new(1, 1)
            }),
            None
        );
        assert_eq!(
            tool.handle(ToolInput::Press {
                button: MouseButton::Middle,
                pos: ScreenPoint::new(1, 1)
            }),
            None
        );
        assert_eq!(tool.handle(ToolInput::KeyPress(Key::Other)), None);
        assert!(!tool.rubber_band().is_visible());
        assert!(tool.is_active());

        tool.handle(left_press(0, 0));
        assert_eq!(
            tool.handle(ToolInput::Release {
                button: MouseButton::Right,
                pos: ScreenPoint::new(4, 4)
            }),
            None
        );
        assert!(tool.is_dragging());
    }

    #[test]
    fn reactivated_tool_picks_again() {
        let mut tool = ExtentPicker::new(view(), PickerMode::Extent);
        tool.handle(ToolInput::KeyPress(Key::Escape));
        assert!(!tool.is_active());
        tool.activate();
        tool.handle(left_press(0, 0));
        assert!(matches!(
            tool.handle(left_release(10, 10)),
            Some(PickOutcome::Picked { .. })
        ));
    }
}
