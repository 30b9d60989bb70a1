use crate::config::LINE_COUNT;
use embedded_hal::digital::v2::InputPin;

/// Manual buttons, in the order they are checked on an input change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Button {
    Button0,
    Button1,
    Button2,
    Button3,
}

impl Button {
    pub const ALL: [Button; LINE_COUNT] = [
        Button::Button0,
        Button::Button1,
        Button::Button2,
        Button::Button3,
    ];

    pub fn index(self) -> usize {
        match self {
            Button::Button0 => 0,
            Button::Button1 => 1,
            Button::Button2 => 2,
            Button::Button3 => 3,
        }
    }

    /// Code reported in `$PRSxx#`: the button's line on the input port (4..=7).
    pub fn code(self) -> u8 {
        4 + self.index() as u8
    }

    /// Output line cleared when this button is pressed.
    pub fn output_line(self) -> usize {
        self.index()
    }
}

/// Reads the four manual inputs (active high) when an input change fires.
pub struct ButtonHandler<I> {
    buttons: [I; LINE_COUNT],
}

impl<I: InputPin> ButtonHandler<I> {
    pub fn new(buttons: [I; LINE_COUNT]) -> Self {
        Self { buttons }
    }

    /// First asserted button in priority order, if any.
    ///
    /// Lower-priority inputs are not read once a match is found. A pin that
    /// cannot be read counts as released.
    pub fn poll(&self) -> Option<Button> {
        Button::ALL
            .iter()
            .copied()
            .find(|button| self.buttons[button.index()].is_high().unwrap_or(false))
    }

    pub fn release(self) -> [I; LINE_COUNT] {
        self.buttons
    }
}
