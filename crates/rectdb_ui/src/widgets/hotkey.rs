use std::fmt::Display;

use crossterm::event::KeyCode;

#[derive(Debug, Clone)]
pub struct Hotkey<'a> {
    pub keycode: KeyCode,
    pub description: &'a str,
}

impl Display for Hotkey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.keycode {
            KeyCode::Char(ch) => write!(f, "{ch}"),
            KeyCode::F(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Keys available while the grid has focus.
pub const GRID_HOTKEYS: [Hotkey; 8] = [
    Hotkey {
        keycode: KeyCode::F(10),
        description: "Menu",
    },
    Hotkey {
        keycode: KeyCode::Enter,
        description: "Edit cell",
    },
    Hotkey {
        keycode: KeyCode::Char('o'),
        description: "Insert row",
    },
    Hotkey {
        keycode: KeyCode::Char('d'),
        description: "Remove row",
    },
    Hotkey {
        keycode: KeyCode::Char('s'),
        description: "Submit",
    },
    Hotkey {
        keycode: KeyCode::Char('u'),
        description: "Revert",
    },
    Hotkey {
        keycode: KeyCode::Char(':'),
        description: "Query",
    },
    Hotkey {
        keycode: KeyCode::Char('q'),
        description: "Quit",
    },
];

/// Keys shown while no model is bound.
pub const IDLE_HOTKEYS: [Hotkey; 3] = [
    Hotkey {
        keycode: KeyCode::F(10),
        description: "Menu",
    },
    Hotkey {
        keycode: KeyCode::Char(':'),
        description: "Query",
    },
    Hotkey {
        keycode: KeyCode::Char('q'),
        description: "Quit",
    },
];
