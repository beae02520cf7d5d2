//! Style roles for terminal output
//!
//! Each logical role maps to an optional `colored::Color`. Colouring only
//! happens when the caller passes `enabled = true`, so no global state is
//! consulted.
//!
//! ```
//! use modlife::core::styles::StyleRole;
//! assert_eq!(StyleRole::Header.paint("Module", false), "Module");
//! assert_eq!(StyleRole::Header.to_prettytable_spec().as_deref(), Some("bFy"));
//! ```

use crate::component::api::State;
use colored::{Color, Colorize};

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }
        }
    }
}

style! {
    Header   => Some(Color::Yellow),
    Code     => Some(Color::Cyan),
    Running  => Some(Color::Green),
    Changing => Some(Color::BrightYellow),
    Stalled  => Some(Color::Red),
    Finished => Some(Color::BrightBlack),
    Value    => None,
}

impl StyleRole {
    /// Role used to render a lifecycle state
    pub fn for_state(state: State) -> Self {
        match state {
            State::Started => StyleRole::Running,
            State::Stopped | State::Destroyed => StyleRole::Finished,
            State::Uninitialized | State::Initialized => StyleRole::Value,
            State::Initializing | State::Starting | State::Stopping | State::Destroying => {
                StyleRole::Changing
            }
        }
    }

    pub fn paint(self, text: &str, enabled: bool) -> String {
        match self.color() {
            Some(color) if enabled => text.color(color).to_string(),
            _ => text.to_string(),
        }
    }

    /// prettytable `style_spec` for a cell in this role
    ///
    /// Headers are bold in addition to their colour.
    pub fn to_prettytable_spec(self) -> Option<String> {
        let spec_char = match self.color()? {
            Color::Black => "k",
            Color::Red => "r",
            Color::Green => "g",
            Color::Yellow => "y",
            Color::Blue => "b",
            Color::Magenta => "m",
            Color::Cyan => "c",
            Color::White => "w",
            Color::BrightBlack => "K",
            Color::BrightRed => "R",
            Color::BrightGreen => "G",
            Color::BrightYellow => "Y",
            Color::BrightBlue => "B",
            Color::BrightMagenta => "M",
            Color::BrightCyan => "C",
            Color::BrightWhite => "W",
            _ => return None,
        };
        let bold = if self == StyleRole::Header { "b" } else { "" };
        Some(format!("{bold}F{spec_char}"))
    }
}
