//! Input events delivered by the host.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Logical keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// A printable character, lowercase for letters.
    Char(char),
    Delete,
    Backspace,
    Escape,
    Enter,
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

/// An input event in screen coordinates.
///
/// Hosts deliver `Click` after a primary press/release pair and `DoubleClick`
/// after the second click of a pair, the way browsers do. [`ClickTracker`]
/// derives both from raw button events for hosts that only see those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown { position: Point, button: PointerButton },
    PointerMove { position: Point },
    PointerUp { position: Point, button: PointerButton },
    Click { position: Point },
    DoubleClick { position: Point },
    /// Vertical wheel motion; negative `delta_y` scrolls up (zoom in).
    Wheel { position: Point, delta_y: f64 },
    Key(KeyPress),
    /// The pointer left the drawing surface.
    PointerLeave,
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME: Duration = Duration::from_millis(500);
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;
/// Maximum pointer travel between press and release for a click.
const CLICK_SLOP: f64 = 4.0;

/// Derives `Click` and `DoubleClick` events from primary button presses.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    press_position: Option<Point>,
    /// Last click time and position for double-click detection.
    last_click: Option<(Instant, Point)>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a raw event; returns the synthesized click events in the order
    /// they should be delivered after `event` itself.
    pub fn track(&mut self, event: &InputEvent, now: Instant) -> Vec<InputEvent> {
        match *event {
            InputEvent::PointerDown {
                position,
                button: PointerButton::Primary,
            } => {
                self.press_position = Some(position);
                Vec::new()
            }
            InputEvent::PointerUp {
                position,
                button: PointerButton::Primary,
            } => {
                let Some(pressed) = self.press_position.take() else {
                    return Vec::new();
                };
                if pressed.distance(position) > CLICK_SLOP {
                    return Vec::new();
                }
                let mut events = vec![InputEvent::Click { position }];
                match self.last_click {
                    Some((last_time, last_pos))
                        if now.duration_since(last_time) < DOUBLE_CLICK_TIME
                            && last_pos.distance(position) < DOUBLE_CLICK_DISTANCE =>
                    {
                        events.push(InputEvent::DoubleClick { position });
                        // Reset to prevent triple-click being detected as another double-click
                        self.last_click = None;
                    }
                    _ => self.last_click = Some((now, position)),
                }
                events
            }
            InputEvent::PointerLeave => {
                self.press_position = None;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}
