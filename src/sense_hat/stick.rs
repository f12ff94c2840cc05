//! Sense HAT five-way joystick events.
//!
//! The joystick is an evdev keyboard with five keys. Only `EV_KEY` events
//! are meaningful; synchronisation and scan-code events are skipped.

/// evdev event type for key changes.
pub const EV_KEY: u16 = 0x01;

/// Key code of the up direction.
pub const KEY_UP: u16 = 103;
/// Key code of the left direction.
pub const KEY_LEFT: u16 = 105;
/// Key code of the right direction.
pub const KEY_RIGHT: u16 = 106;
/// Key code of the down direction.
pub const KEY_DOWN: u16 = 108;
/// Key code of the centre push.
pub const KEY_ENTER: u16 = 28;

/// Direction of a joystick event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StickDirection {
    /// Pushed up.
    Up,
    /// Pushed down.
    Down,
    /// Pushed left.
    Left,
    /// Pushed right.
    Right,
    /// Pressed in.
    Middle,
}

impl StickDirection {
    /// Lower-case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StickDirection::Up => "up",
            StickDirection::Down => "down",
            StickDirection::Left => "left",
            StickDirection::Right => "right",
            StickDirection::Middle => "middle",
        }
    }

    /// Maps an evdev key code.
    pub const fn from_key(code: u16) -> Option<Self> {
        match code {
            KEY_UP => Some(StickDirection::Up),
            KEY_DOWN => Some(StickDirection::Down),
            KEY_LEFT => Some(StickDirection::Left),
            KEY_RIGHT => Some(StickDirection::Right),
            KEY_ENTER => Some(StickDirection::Middle),
            _ => None,
        }
    }
}

/// What happened to the key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StickAction {
    /// Key went down.
    Pressed,
    /// Key came back up.
    Released,
    /// Key is held (auto-repeat).
    Held,
}

impl StickAction {
    /// Lower-case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StickAction::Pressed => "pressed",
            StickAction::Released => "released",
            StickAction::Held => "held",
        }
    }

    /// Maps an evdev key value (0 up, 1 down, 2 repeat).
    pub const fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(StickAction::Released),
            1 => Some(StickAction::Pressed),
            2 => Some(StickAction::Held),
            _ => None,
        }
    }
}

/// One joystick event.
///
/// # Example
///
/// ```rust
/// use pihat_kit::sense_hat::{StickAction, StickDirection, StickEvent};
///
/// let event = StickEvent::from_input(1, 103, 1).unwrap();
/// assert_eq!(event, StickEvent::new(StickDirection::Up, StickAction::Pressed));
///
/// // EV_SYN and unknown keys are not joystick events.
/// assert_eq!(StickEvent::from_input(0, 0, 0), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StickEvent {
    /// Direction.
    pub direction: StickDirection,
    /// Action.
    pub action: StickAction,
}

impl StickEvent {
    /// Creates an event.
    pub const fn new(direction: StickDirection, action: StickAction) -> Self {
        Self { direction, action }
    }

    /// Decodes a key code and value.
    pub const fn from_key(code: u16, value: i32) -> Option<Self> {
        match (StickDirection::from_key(code), StickAction::from_value(value)) {
            (Some(direction), Some(action)) => Some(Self { direction, action }),
            _ => None,
        }
    }

    /// Decodes a raw `input_event` type/code/value triple.
    pub const fn from_input(kind: u16, code: u16, value: i32) -> Option<Self> {
        if kind != EV_KEY {
            return None;
        }
        Self::from_key(code, value)
    }
}

impl core::fmt::Display for StickEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.direction.as_str(), self.action.as_str())
    }
}
