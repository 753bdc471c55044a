use tracing::{debug, trace};

use super::event::{FocusChange, Key, KeyKind, KeymapChange};
use super::{Event, KeyState, Seat, SeatTimer};
use crate::common::config::{FALLBACK_REPEAT_DELAY, FALLBACK_REPEAT_INTERVAL};
use crate::sys::keymap::{EVDEV_OFFSET, Keymap, KeymapFormat, ModifierType, keysym, keyval_to_unicode};
use crate::sys::timer::TimerId;
use crate::sys::window::{SurfaceId, WindowId, WindowSystem};

#[derive(Debug, Default)]
pub struct KeyboardState {
    pub focus: Option<WindowId>,
    pub grab: Option<WindowId>,
    pub key_modifiers: ModifierType,
    /// Rate and delay advertised by the compositor, once it has sent any.
    pub server_repeat: Option<ServerRepeat>,
    repeat_timer: Option<TimerId>,
    repeat_count: u32,
    repeat_key: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServerRepeat {
    pub rate: i32,
    pub delay: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepeatPolicy {
    pub delay: u32,
    pub interval: u32,
}

/// The text a key press produces, with Xlib-style control folding.
pub fn key_string(keyval: u32, state: ModifierType) -> String {
    let Some(c) = keyval_to_unicode(keyval) else {
        return match keyval {
            keysym::ESCAPE => "\x1b".to_string(),
            keysym::RETURN | keysym::KP_ENTER => "\r".to_string(),
            _ => String::new(),
        };
    };
    if !state.contains(ModifierType::CONTROL) {
        return c.to_string();
    }
    let code = c as u32;
    let folded = match c {
        '@'..='~' | ' ' => code & 0x1f,
        '2' => 0,
        '3'..='7' => code - (u32::from(b'3') - 0x1b),
        '8' => 0x7f,
        '/' => u32::from(b'_') & 0x1f,
        _ => code,
    };
    char::from_u32(folded).map(String::from).unwrap_or_default()
}

impl<S: WindowSystem, K: Keymap> Seat<S, K> {
    /// Compositor repeat info wins over desktop settings, which win over the
    /// built-in timings. `None` means keys do not repeat.
    pub fn key_repeat_policy(&self) -> Option<RepeatPolicy> {
        if let Some(server) = self.keyboard.server_repeat {
            if server.rate <= 0 {
                return None;
            }
            return Some(RepeatPolicy {
                delay: server.delay.max(0) as u32,
                interval: (1000 / server.rate) as u32,
            });
        }
        match self.settings.keyboard {
            Some(settings) if !settings.repeat => None,
            Some(settings) => Some(RepeatPolicy {
                delay: settings.delay,
                interval: settings.repeat_interval,
            }),
            None => Some(RepeatPolicy {
                delay: FALLBACK_REPEAT_DELAY,
                interval: FALLBACK_REPEAT_INTERVAL,
            }),
        }
    }

    pub fn keyboard_focus(&self) -> Option<WindowId> { self.keyboard.focus }

    pub fn key_modifiers(&self) -> ModifierType { self.keyboard.key_modifiers }

    pub fn is_key_repeating(&self) -> bool {
        self.keyboard.repeat_timer.is_some_and(|t| self.timers.is_scheduled(t))
    }

    pub(super) fn keyboard_keymap(&mut self, format: KeymapFormat) {
        if self.keyboard_device.is_none() {
            return;
        }
        self.keymap.reload(format);
        self.emit(Event::KeymapChanged(KeymapChange::Keys));
        self.emit(Event::KeymapChanged(KeymapChange::State));
        self.emit(Event::KeymapChanged(KeymapChange::Direction));
    }

    pub(super) fn keyboard_enter(&mut self, serial: u32, surface: SurfaceId) {
        let Some(source) = self.keyboard_device else { return };
        let Some(window) = self.system.window_for_surface(surface) else { return };
        self.update_serial(serial);
        self.keyboard.focus = Some(window);
        self.emit(Event::FocusChange(FocusChange {
            window,
            device: self.master_keyboard,
            source_device: source,
            focus_in: true,
        }));
    }

    pub(super) fn keyboard_leave(&mut self, serial: u32, _surface: SurfaceId) {
        let Some(source) = self.keyboard_device else { return };
        let Some(window) = self.keyboard.focus else { return };
        self.stop_key_repeat();
        self.update_serial(serial);
        self.keyboard.focus = None;
        self.emit(Event::FocusChange(FocusChange {
            window,
            device: self.master_keyboard,
            source_device: source,
            focus_in: false,
        }));
    }

    pub(super) fn keyboard_key(&mut self, serial: u32, time: u32, key: u32, state: KeyState) {
        if self.keyboard_device.is_none() || self.keyboard.focus.is_none() {
            return;
        }
        self.keyboard.repeat_count = 0;
        self.update_serial(serial);
        self.deliver_key_event(time, key + EVDEV_OFFSET, state == KeyState::Pressed);
    }

    pub(super) fn keyboard_modifiers(&mut self, depressed: u32, latched: u32, locked: u32, group: u32) {
        if self.keyboard_device.is_none() {
            return;
        }
        let direction = self.keymap.direction();
        self.keyboard.key_modifiers = ModifierType::from_bits_truncate(depressed | latched | locked);
        self.keymap.update_mask(depressed, latched, locked, group);

        self.emit(Event::KeymapChanged(KeymapChange::State));
        if direction != self.keymap.direction() {
            self.emit(Event::KeymapChanged(KeymapChange::Direction));
        }
    }

    pub(super) fn keyboard_repeat_info(&mut self, rate: i32, delay: i32) {
        if self.keyboard_device.is_none() {
            return;
        }
        debug!(rate, delay, "Compositor repeat info");
        self.keyboard.server_repeat = Some(ServerRepeat { rate, delay });
    }

    /// Fired by the repeat timer: replays the held key as another press.
    pub(super) fn keyboard_repeat(&mut self) {
        let time = self.pointer_data(self.master_pointer).map_or(0, |p| p.time);
        let key = self.keyboard.repeat_key;
        self.deliver_key_event(time, key, true);
    }

    pub(super) fn stop_key_repeat(&mut self) {
        if let Some(timer) = self.keyboard.repeat_timer.take() {
            self.timers.cancel(timer);
        }
    }

    fn deliver_key_event(&mut self, time: u32, keycode: u32, pressed: bool) {
        let (Some(source), Some(window)) = (self.keyboard_device, self.keyboard.focus) else {
            self.stop_key_repeat();
            return;
        };
        let keyval = self.keymap.key_get_one_sym(keycode);
        let master_pointer = self.master_pointer;
        if let Some(pointer) = self.devices.pointer_mut(master_pointer) {
            pointer.time = time;
        }
        self.keyboard.key_modifiers = self.keymap.modifier_state();

        let state = self.device_modifiers(master_pointer);
        let event = Key {
            kind: if pressed { KeyKind::Press } else { KeyKind::Release },
            window,
            device: self.master_keyboard,
            source_device: source,
            time,
            state,
            hardware_keycode: keycode,
            keyval,
            is_modifier: self.keymap.key_is_modifier(keycode),
            string: key_string(keyval, state),
        };
        trace!(keycode, keyval, string = ?event.string, ?state, "Key event");
        self.emit(Event::Key(event));

        // Any release ends repeat, whether or not this key could repeat.
        if !pressed {
            self.stop_key_repeat();
            return;
        }
        if !self.keymap.key_repeats(keycode) {
            return;
        }
        let Some(policy) = self.key_repeat_policy() else { return };

        self.keyboard.repeat_count += 1;
        self.keyboard.repeat_key = keycode;

        match self.keyboard.repeat_count {
            1 => {
                self.stop_key_repeat();
                self.keyboard.repeat_timer = Some(self.timers.schedule(policy.delay, SeatTimer::KeyRepeat));
            }
            // The delay timer has just fired and is gone; repeats from here
            // on run at the interval.
            2 => {
                self.keyboard.repeat_timer =
                    Some(self.timers.schedule_repeating(policy.interval, SeatTimer::KeyRepeat));
            }
            _ => {}
        }
    }
}
