use piston::input::{Button, ButtonState, Input, Key};
use std::collections::HashMap;
use std::mem;

use crate::{Clock, Span};

/// message type Handler sends to User App
#[derive(Clone, Debug, Default)]
pub struct InputMessage {
    pub buttons: Vec<ButtonMessage>,
    pub focused: bool,
    /// clock of the previous message; presses at or after it are fresh
    pub since: Clock,
}

impl InputMessage {
    /// The button is down right now.
    pub fn is_held(&self, b: Button) -> bool {
        self.buttons.iter().any(|m| match m.handle {
            ButtonHandle::Press(_) => m.button == b,
            ButtonHandle::Release(_) => false,
        })
    }
    /// The button went down since the previous message, even if it was
    /// already released again.
    pub fn just_pressed(&self, b: Button) -> bool {
        self.buttons.iter().any(|m| {
            m.button == b && match m.handle {
                ButtonHandle::Press(c) => c >= self.since,
                ButtonHandle::Release(s) => s.start >= self.since,
            }
        })
    }
    fn any_held(&self, keys: &[Key]) -> bool {
        keys.iter().any(|&k| self.is_held(Button::Keyboard(k)))
    }
}

#[derive(Clone, Debug)]
pub struct ButtonMessage {
    pub button: Button,
    pub handle: ButtonHandle,
}

impl ButtonMessage {
    fn press(b: Button, c: Clock) -> ButtonMessage {
        ButtonMessage {
            button: b,
            handle: ButtonHandle::Press(c),
        }
    }
    fn release(b: Button, s: Span) -> ButtonMessage {
        ButtonMessage {
            button: b,
            handle: ButtonHandle::Release(s),
        }
    }
}

/// state of button
/// ButtonState is used in Piston, so we have to use an alternative name
#[derive(Clone, Copy, Debug)]
pub enum ButtonHandle {
    Press(Clock),
    Release(Span),
}

#[derive(Debug, Default)]
pub struct InputHandler {
    /// window is active or not
    focused: bool,
    /// list of presed buttons with first press time
    pressed_buttons: HashMap<Button, Clock>,
    /// buttons released since the last message
    released_buttons: Vec<(Button, Span)>,
    last_message: Clock,
}

impl InputHandler {
    fn press_button(&mut self, b: Button, clock: Clock) {
        self.pressed_buttons.entry(b).or_insert(clock);
    }
    fn release_button(&mut self, b: Button, current: Clock) {
        let span = if let Some(pressed) = self.pressed_buttons.remove(&b) {
            Span::new(pressed, current)
        } else {
            warn!("not pressed button released! {:?}", b);
            Span::new(current.saturating_sub(3), current)
        };
        self.released_buttons.push((b, span));
    }
    pub fn get_message(&mut self, clock: Clock) -> InputMessage {
        let mut v = vec![];
        mem::swap(&mut self.released_buttons, &mut v);
        let buttons = self
            .pressed_buttons
            .iter()
            .map(|(&b, &c)| ButtonMessage::press(b, c))
            .chain(v.into_iter().map(|(b, s)| ButtonMessage::release(b, s)));
        let since = mem::replace(&mut self.last_message, clock);
        InputMessage {
            buttons: buttons.collect(),
            focused: self.focused,
            since,
        }
    }
    pub fn handle(&mut self, input: &Input, clock: Clock) {
        match input {
            Input::Button(args) => match args.state {
                ButtonState::Press => self.press_button(args.button, clock),
                ButtonState::Release => self.release_button(args.button, clock),
            },
            Input::Focus(focused) => {
                self.focused = *focused;
                if !*focused {
                    // key-up events are lost while unfocused
                    let held: Vec<_> = self.pressed_buttons.keys().cloned().collect();
                    held.into_iter().for_each(|b| self.release_button(b, clock));
                }
            }
            _ => {}
        }
    }
}

/// Game actions derived from one input message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// fresh press only
    pub jump: bool,
    pub quit: bool,
}

impl Controls {
    pub fn from_message(msg: &InputMessage) -> Controls {
        Controls {
            left: msg.any_held(&[Key::Left, Key::A]),
            right: msg.any_held(&[Key::Right, Key::D]),
            up: msg.any_held(&[Key::Up, Key::W]),
            down: msg.any_held(&[Key::Down, Key::S]),
            jump: msg.just_pressed(Button::Keyboard(Key::Space)),
            quit: msg.just_pressed(Button::Keyboard(Key::Escape)),
        }
    }
}
