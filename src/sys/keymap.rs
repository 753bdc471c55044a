use bitflags::bitflags;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Keyboard modifiers and pointer buttons held while an event happened.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ModifierType: u32 {
        const SHIFT = 1 << 0;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1 = 1 << 3;
        const MOD2 = 1 << 4;
        const MOD3 = 1 << 5;
        const MOD4 = 1 << 6;
        const MOD5 = 1 << 7;
        const BUTTON1 = 1 << 8;
        const BUTTON2 = 1 << 9;
        const BUTTON3 = 1 << 10;
        const BUTTON4 = 1 << 11;
        const BUTTON5 = 1 << 12;
    }
}

impl ModifierType {
    /// Mask contributed by holding pointer button `button` (1-based).
    pub fn for_button(button: u32) -> ModifierType {
        match button {
            1..=5 => ModifierType::from_bits_truncate(1 << (8 + button - 1)),
            _ => ModifierType::empty(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
    Neutral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, Serialize, Deserialize)]
#[repr(u32)]
#[serde(rename_all = "snake_case")]
pub enum KeymapFormat {
    NoKeymap = 0,
    XkbV1 = 1,
}

pub mod keysym {
    pub const VOID_SYMBOL: u32 = 0xffffff;
    pub const SPACE: u32 = 0x0020;
    pub const BACKSPACE: u32 = 0xff08;
    pub const TAB: u32 = 0xff09;
    pub const RETURN: u32 = 0xff0d;
    pub const ESCAPE: u32 = 0xff1b;
    pub const LEFT: u32 = 0xff51;
    pub const UP: u32 = 0xff52;
    pub const RIGHT: u32 = 0xff53;
    pub const DOWN: u32 = 0xff54;
    pub const KP_ENTER: u32 = 0xff8d;
    pub const KP_MULTIPLY: u32 = 0xffaa;
    pub const SHIFT_L: u32 = 0xffe1;
    pub const SHIFT_R: u32 = 0xffe2;
    pub const CONTROL_L: u32 = 0xffe3;
    pub const CONTROL_R: u32 = 0xffe4;
    pub const CAPS_LOCK: u32 = 0xffe5;
    pub const ALT_L: u32 = 0xffe9;
    pub const DELETE: u32 = 0xffff;
}

/// Unicode character for a keysym, if it has one.
pub fn keyval_to_unicode(keyval: u32) -> Option<char> {
    match keyval {
        0x20..=0x7e | 0xa0..=0xff => char::from_u32(keyval),
        _ if keyval & 0xff00_0000 == 0x0100_0000 => char::from_u32(keyval & 0x00ff_ffff),
        keysym::BACKSPACE | keysym::TAB | keysym::RETURN | keysym::ESCAPE => {
            char::from_u32(keyval & 0xff)
        }
        keysym::KP_ENTER => Some('\r'),
        keysym::KP_MULTIPLY => Some('*'),
        keysym::DELETE => Some('\u{7f}'),
        _ => None,
    }
}

/// Keycode translation and modifier state for one keyboard. Keycodes are in
/// the xkb numbering (evdev code + 8).
pub trait Keymap {
    fn reload(&mut self, format: KeymapFormat);
    fn key_get_one_sym(&self, keycode: u32) -> u32;
    fn modifier_state(&self) -> ModifierType;
    fn key_is_modifier(&self, keycode: u32) -> bool;
    fn key_repeats(&self, keycode: u32) -> bool;
    fn update_mask(&mut self, depressed: u32, latched: u32, locked: u32, group: u32);
    fn direction(&self) -> TextDirection;
}

pub const EVDEV_OFFSET: u32 = 8;

/// (evdev code, unshifted keysym, shifted keysym)
const US_LAYOUT: &[(u32, u32, u32)] = &[
    (1, keysym::ESCAPE, keysym::ESCAPE),
    (2, b'1' as u32, b'!' as u32),
    (3, b'2' as u32, b'@' as u32),
    (4, b'3' as u32, b'#' as u32),
    (5, b'4' as u32, b'$' as u32),
    (6, b'5' as u32, b'%' as u32),
    (7, b'6' as u32, b'^' as u32),
    (8, b'7' as u32, b'&' as u32),
    (9, b'8' as u32, b'*' as u32),
    (10, b'9' as u32, b'(' as u32),
    (11, b'0' as u32, b')' as u32),
    (12, b'-' as u32, b'_' as u32),
    (13, b'=' as u32, b'+' as u32),
    (14, keysym::BACKSPACE, keysym::BACKSPACE),
    (15, keysym::TAB, keysym::TAB),
    (16, b'q' as u32, b'Q' as u32),
    (17, b'w' as u32, b'W' as u32),
    (18, b'e' as u32, b'E' as u32),
    (19, b'r' as u32, b'R' as u32),
    (20, b't' as u32, b'T' as u32),
    (21, b'y' as u32, b'Y' as u32),
    (22, b'u' as u32, b'U' as u32),
    (23, b'i' as u32, b'I' as u32),
    (24, b'o' as u32, b'O' as u32),
    (25, b'p' as u32, b'P' as u32),
    (26, b'[' as u32, b'{' as u32),
    (27, b']' as u32, b'}' as u32),
    (28, keysym::RETURN, keysym::RETURN),
    (29, keysym::CONTROL_L, keysym::CONTROL_L),
    (30, b'a' as u32, b'A' as u32),
    (31, b's' as u32, b'S' as u32),
    (32, b'd' as u32, b'D' as u32),
    (33, b'f' as u32, b'F' as u32),
    (34, b'g' as u32, b'G' as u32),
    (35, b'h' as u32, b'H' as u32),
    (36, b'j' as u32, b'J' as u32),
    (37, b'k' as u32, b'K' as u32),
    (38, b'l' as u32, b'L' as u32),
    (39, b';' as u32, b':' as u32),
    (40, b'\'' as u32, b'"' as u32),
    (41, b'`' as u32, b'~' as u32),
    (42, keysym::SHIFT_L, keysym::SHIFT_L),
    (43, b'\\' as u32, b'|' as u32),
    (44, b'z' as u32, b'Z' as u32),
    (45, b'x' as u32, b'X' as u32),
    (46, b'c' as u32, b'C' as u32),
    (47, b'v' as u32, b'V' as u32),
    (48, b'b' as u32, b'B' as u32),
    (49, b'n' as u32, b'N' as u32),
    (50, b'm' as u32, b'M' as u32),
    (51, b',' as u32, b'<' as u32),
    (52, b'.' as u32, b'>' as u32),
    (53, b'/' as u32, b'?' as u32),
    (54, keysym::SHIFT_R, keysym::SHIFT_R),
    (55, keysym::KP_MULTIPLY, keysym::KP_MULTIPLY),
    (56, keysym::ALT_L, keysym::ALT_L),
    (57, keysym::SPACE, keysym::SPACE),
    (58, keysym::CAPS_LOCK, keysym::CAPS_LOCK),
    (96, keysym::KP_ENTER, keysym::KP_ENTER),
    (97, keysym::CONTROL_R, keysym::CONTROL_R),
    (103, keysym::UP, keysym::UP),
    (105, keysym::LEFT, keysym::LEFT),
    (106, keysym::RIGHT, keysym::RIGHT),
    (108, keysym::DOWN, keysym::DOWN),
    (111, keysym::DELETE, keysym::DELETE),
];

fn is_modifier_sym(sym: u32) -> bool { (keysym::SHIFT_L..=0xffee).contains(&sym) }

/// A fixed US layout with xkb-style depressed/latched/locked modifier
/// tracking. Each layout group may declare its own text direction.
#[derive(Clone, Debug)]
pub struct StaticKeymap {
    format: KeymapFormat,
    depressed: u32,
    latched: u32,
    locked: u32,
    group: u32,
    group_directions: Vec<TextDirection>,
}

impl Default for StaticKeymap {
    fn default() -> Self { Self::us() }
}

impl StaticKeymap {
    pub fn us() -> Self {
        StaticKeymap {
            format: KeymapFormat::XkbV1,
            depressed: 0,
            latched: 0,
            locked: 0,
            group: 0,
            group_directions: vec![TextDirection::Ltr],
        }
    }

    pub fn with_group_direction(mut self, group: usize, direction: TextDirection) -> Self {
        if self.group_directions.len() <= group {
            self.group_directions.resize(group + 1, TextDirection::Ltr);
        }
        self.group_directions[group] = direction;
        self
    }

    fn lookup(&self, keycode: u32) -> Option<(u32, u32)> {
        if self.format == KeymapFormat::NoKeymap {
            return None;
        }
        let code = keycode.checked_sub(EVDEV_OFFSET)?;
        US_LAYOUT.iter().find(|(c, ..)| *c == code).map(|&(_, plain, shifted)| (plain, shifted))
    }

    fn effective(&self) -> u32 { self.depressed | self.latched | self.locked }
}

impl Keymap for StaticKeymap {
    fn reload(&mut self, format: KeymapFormat) {
        *self = StaticKeymap {
            format,
            group_directions: std::mem::take(&mut self.group_directions),
            ..StaticKeymap::us()
        };
    }

    fn key_get_one_sym(&self, keycode: u32) -> u32 {
        let Some((plain, shifted)) = self.lookup(keycode) else {
            return keysym::VOID_SYMBOL;
        };
        let mods = ModifierType::from_bits_truncate(self.effective());
        let is_letter = (b'a' as u32..=b'z' as u32).contains(&plain);
        let shift = mods.contains(ModifierType::SHIFT);
        let lock = is_letter && mods.contains(ModifierType::LOCK);
        if shift != lock { shifted } else { plain }
    }

    fn modifier_state(&self) -> ModifierType { ModifierType::from_bits_truncate(self.effective() & 0xff) }

    fn key_is_modifier(&self, keycode: u32) -> bool {
        self.lookup(keycode).is_some_and(|(plain, _)| is_modifier_sym(plain))
    }

    fn key_repeats(&self, keycode: u32) -> bool {
        self.lookup(keycode).is_some_and(|(plain, _)| !is_modifier_sym(plain))
    }

    fn update_mask(&mut self, depressed: u32, latched: u32, locked: u32, group: u32) {
        self.depressed = depressed;
        self.latched = latched;
        self.locked = locked;
        self.group = group;
    }

    fn direction(&self) -> TextDirection {
        self.group_directions.get(self.group as usize).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    const KEY_A: u32 = 30 + EVDEV_OFFSET;
    const KEY_1: u32 = 2 + EVDEV_OFFSET;
    const KEY_LEFTSHIFT: u32 = 42 + EVDEV_OFFSET;

    #[test]
    fn it_applies_shift_and_caps_lock() {
        let mut keymap = StaticKeymap::us();
        assert_eq!(keymap.key_get_one_sym(KEY_A), 'a' as u32);

        keymap.update_mask(ModifierType::SHIFT.bits(), 0, 0, 0);
        assert_eq!(keymap.key_get_one_sym(KEY_A), 'A' as u32);
        assert_eq!(keymap.key_get_one_sym(KEY_1), '!' as u32);

        keymap.update_mask(0, 0, ModifierType::LOCK.bits(), 0);
        assert_eq!(keymap.key_get_one_sym(KEY_A), 'A' as u32);
        assert_eq!(keymap.key_get_one_sym(KEY_1), '1' as u32);
        assert_eq!(keymap.modifier_state(), ModifierType::LOCK);
    }

    #[test]
    fn it_does_not_repeat_modifier_keys() {
        let keymap = StaticKeymap::us();
        assert!(keymap.key_is_modifier(KEY_LEFTSHIFT));
        assert!(!keymap.key_repeats(KEY_LEFTSHIFT));
        assert!(keymap.key_repeats(KEY_A));
        assert_eq!(keymap.key_get_one_sym(250), keysym::VOID_SYMBOL);
    }

    #[test]
    fn it_reports_direction_per_group() {
        let mut keymap = StaticKeymap::us().with_group_direction(1, TextDirection::Rtl);
        assert_eq!(keymap.direction(), TextDirection::Ltr);
        keymap.update_mask(0, 0, 0, 1);
        assert_eq!(keymap.direction(), TextDirection::Rtl);
        keymap.reload(KeymapFormat::NoKeymap);
        assert_eq!(keymap.direction(), TextDirection::Ltr);
        assert_eq!(keymap.key_get_one_sym(KEY_A), keysym::VOID_SYMBOL);
    }

    #[test]
    fn it_maps_keysyms_to_characters() {
        assert_eq!(keyval_to_unicode('x' as u32), Some('x'));
        assert_eq!(keyval_to_unicode(0xe9), Some('é'));
        assert_eq!(keyval_to_unicode(0x0100_20ac), Some('€'));
        assert_eq!(keyval_to_unicode(keysym::RETURN), Some('\r'));
        assert_eq!(keyval_to_unicode(keysym::SHIFT_L), None);
        assert_eq!(ModifierType::for_button(3), ModifierType::BUTTON3);
        assert_eq!(ModifierType::for_button(9), ModifierType::empty());
    }
}
