//! Input event payloads.
//!
//! An input event is a chain of integral tags: event kind, then a kind
//! specific sub-tag, then the value. Tags are resolved to names through
//! static tables; codes outside a table keep their numeric value and get an
//! explicit unknown label.

use crate::error::DecodeError;
use crate::source::ByteSource;
use serde::Serialize;
use std::fmt;
use std::io::Read;

const INPUT_EVENT_KIND_KEY: u32 = 0;
const INPUT_EVENT_KIND_BTN: u32 = 1;
const INPUT_EVENT_KIND_REL: u32 = 2;
const INPUT_EVENT_KIND_ABS: u32 = 3;
const INPUT_EVENT_KIND_MTT: u32 = 4;

const KEY_VALUE_KIND_NUMBER: u32 = 0;
const KEY_VALUE_KIND_QCODE: u32 = 1;

static BUTTON_NAMES: [&str; 10] = [
    "INPUT_BUTTON_LEFT",
    "INPUT_BUTTON_MIDDLE",
    "INPUT_BUTTON_RIGHT",
    "INPUT_BUTTON_WHEEL_UP",
    "INPUT_BUTTON_WHEEL_DOWN",
    "INPUT_BUTTON_SIDE",
    "INPUT_BUTTON_EXTRA",
    "INPUT_BUTTON_WHEEL_LEFT",
    "INPUT_BUTTON_WHEEL_RIGHT",
    "INPUT_BUTTON_TOUCH",
];

static AXIS_NAMES: [&str; 2] = ["INPUT_AXIS_X", "INPUT_AXIS_Y"];

static MULTI_TOUCH_NAMES: [&str; 5] = [
    "INPUT_MULTI_TOUCH_TYPE_BEGIN",
    "INPUT_MULTI_TOUCH_TYPE_UPDATE",
    "INPUT_MULTI_TOUCH_TYPE_END",
    "INPUT_MULTI_TOUCH_TYPE_CANCEL",
    "INPUT_MULTI_TOUCH_TYPE_DATA",
];

/// QKeyCode names, indexed by code.
static KEY_NAMES: [&str; 162] = [
    "UNMAPPED", "SHIFT", "SHIFT_R", "ALT", "ALT_R", "CTRL", "CTRL_R", "MENU", "ESC", "1", "2",
    "3", "4", "5", "6", "7", "8", "9", "0", "MINUS", "EQUAL", "BACKSPACE", "TAB", "Q", "W", "E",
    "R", "T", "Y", "U", "I", "O", "P", "BRACKET_LEFT", "BRACKET_RIGHT", "RET", "A", "S", "D",
    "F", "G", "H", "J", "K", "L", "SEMICOLON", "APOSTROPHE", "GRAVE_ACCENT", "BACKSLASH", "Z",
    "X", "C", "V", "B", "N", "M", "COMMA", "DOT", "SLASH", "ASTERISK", "SPC", "CAPS_LOCK", "F1",
    "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "NUM_LOCK", "SCROLL_LOCK",
    "KP_DIVIDE", "KP_MULTIPLY", "KP_SUBTRACT", "KP_ADD", "KP_ENTER", "KP_DECIMAL", "SYSRQ",
    "KP_0", "KP_1", "KP_2", "KP_3", "KP_4", "KP_5", "KP_6", "KP_7", "KP_8", "KP_9", "LESS",
    "F11", "F12", "PRINT", "HOME", "PGUP", "PGDN", "END", "LEFT", "UP", "DOWN", "RIGHT",
    "INSERT", "DELETE", "STOP", "AGAIN", "PROPS", "UNDO", "FRONT", "COPY", "OPEN", "PASTE",
    "FIND", "CUT", "LF", "HELP", "META_L", "META_R", "COMPOSE", "PAUSE", "RO", "HIRAGANA",
    "HENKAN", "YEN", "MUHENKAN", "KATAKANAHIRAGANA", "KP_COMMA", "KP_EQUALS", "POWER", "SLEEP",
    "WAKE", "AUDIONEXT", "AUDIOPREV", "AUDIOSTOP", "AUDIOPLAY", "AUDIOMUTE", "VOLUMEUP",
    "VOLUMEDOWN", "MEDIASELECT", "MAIL", "CALCULATOR", "COMPUTER", "AC_HOME", "AC_BACK",
    "AC_FORWARD", "AC_REFRESH", "AC_BOOKMARKS", "LANG1", "LANG2", "F13", "F14", "F15", "F16",
    "F17", "F18", "F19", "F20", "F21", "F22", "F23", "F24",
];

fn lookup(table: &[&'static str], code: u32, unknown: &'static str) -> &'static str {
    usize::try_from(code)
        .ok()
        .and_then(|i| table.get(i).copied())
        .unwrap_or(unknown)
}

pub fn button_name(code: u32) -> &'static str {
    lookup(&BUTTON_NAMES, code, "UnknownButton")
}

pub fn axis_name(code: u32) -> &'static str {
    lookup(&AXIS_NAMES, code, "UnknownAxis")
}

pub fn multi_touch_name(code: u32) -> &'static str {
    lookup(&MULTI_TOUCH_NAMES, code, "UnknownType")
}

pub fn key_name(code: u32) -> &'static str {
    lookup(&KEY_NAMES, code, "UnknownKey")
}

/// A decoded input event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum InputEvent {
    /// Key given as a raw scancode number.
    KeyNumber { number: u64, down: bool },
    /// Key given as a QKeyCode.
    KeyQcode { qcode: u32, down: bool },
    Button { button: u32, down: bool },
    Relative { axis: u32, value: u64 },
    Absolute { axis: u32, value: u64 },
    MultiTouch {
        touch_type: u32,
        slot: u64,
        tracking_id: u64,
        axis: u32,
        value: u64,
    },
}

impl InputEvent {
    /// Decode one input payload, reading its fields in order.
    pub fn decode<R: Read>(source: &mut ByteSource<R>) -> Result<Self, DecodeError> {
        let kind = source.read_u32()?;
        let event = match kind {
            INPUT_EVENT_KIND_KEY => match source.read_u32()? {
                KEY_VALUE_KIND_NUMBER => Self::KeyNumber {
                    number: source.read_u64()?,
                    down: source.read_u8()? != 0,
                },
                KEY_VALUE_KIND_QCODE => Self::KeyQcode {
                    qcode: source.read_u32()?,
                    down: source.read_u8()? != 0,
                },
                other => {
                    return Err(DecodeError::MalformedPayload {
                        field: "key value kind",
                        value: other,
                    })
                }
            },
            INPUT_EVENT_KIND_BTN => Self::Button {
                button: source.read_u32()?,
                down: source.read_u8()? != 0,
            },
            INPUT_EVENT_KIND_REL => Self::Relative {
                axis: source.read_u32()?,
                value: source.read_u64()?,
            },
            INPUT_EVENT_KIND_ABS => Self::Absolute {
                axis: source.read_u32()?,
                value: source.read_u64()?,
            },
            INPUT_EVENT_KIND_MTT => Self::MultiTouch {
                touch_type: source.read_u32()?,
                slot: source.read_u64()?,
                tracking_id: source.read_u64()?,
                axis: source.read_u32()?,
                value: source.read_u64()?,
            },
            other => {
                return Err(DecodeError::MalformedPayload {
                    field: "input event kind",
                    value: other,
                })
            }
        };
        Ok(event)
    }
}

fn up_down(down: bool) -> &'static str {
    if down {
        "down"
    } else {
        "up"
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::KeyNumber { number, down } => write!(
                f,
                "INPUT_EVENT_KIND_KEY::KEY_VALUE_KIND_NUMBER number {number:#x} {}",
                up_down(down)
            ),
            Self::KeyQcode { qcode, down } => write!(
                f,
                "INPUT_EVENT_KIND_KEY::KEY_VALUE_KIND_QCODE qcode {qcode:#x} ({}) {}",
                key_name(qcode),
                up_down(down)
            ),
            Self::Button { button, down } => write!(
                f,
                "INPUT_EVENT_KIND_BTN button {button:#x} ({}) {}",
                button_name(button),
                up_down(down)
            ),
            Self::Relative { axis, value } => write!(
                f,
                "INPUT_EVENT_KIND_REL axis {axis:#x} ({}) value {value:#x}",
                axis_name(axis)
            ),
            Self::Absolute { axis, value } => write!(
                f,
                "INPUT_EVENT_KIND_ABS axis {axis:#x} ({}) value {value:#x}",
                axis_name(axis)
            ),
            Self::MultiTouch {
                touch_type,
                slot,
                tracking_id,
                axis,
                value,
            } => write!(
                f,
                "INPUT_EVENT_KIND_MTT type {touch_type:#x} ({}) slot {slot:#x} \
                 tracking_id {tracking_id:#x} axis {axis:#x} ({}) value {value:#x}",
                multi_touch_name(touch_type),
                axis_name(axis)
            ),
        }
    }
}
