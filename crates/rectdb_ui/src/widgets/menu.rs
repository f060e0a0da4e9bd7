use crossterm::event::KeyCode;
use ratatui::{
    prelude::{Buffer, Rect},
    style::{Color, Style},
    widgets::StatefulWidget,
};
use tui_menu::{Menu, MenuEvent, MenuItem, MenuState};

/// Commands reachable from the menu bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    CreateConnection,
    CloseConnection,
    CreateTable,
    InsertInto,
    PrintTable,
    DropTable,
    InitTableModel,
    SelectTable,
    InsertRow,
    RemoveRow,
    SubmitChanges,
    RevertChanges,
    DoQuery,
}

impl MenuAction {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::CreateConnection => "Create connection",
            Self::CloseConnection => "Close connection",
            Self::CreateTable => "Create table",
            Self::InsertInto => "Insert into",
            Self::PrintTable => "Print table",
            Self::DropTable => "Drop table",
            Self::InitTableModel => "Init table model",
            Self::SelectTable => "Select table",
            Self::InsertRow => "Insert row",
            Self::RemoveRow => "Remove row",
            Self::SubmitChanges => "Submit changes",
            Self::RevertChanges => "Revert changes",
            Self::DoQuery => "Do query",
        }
    }
}

/// Menu titles and their actions, left to right.
pub const MENU_BAR: [(&str, &[MenuAction]); 3] = [
    (
        "BD",
        &[
            MenuAction::CreateConnection,
            MenuAction::CloseConnection,
            MenuAction::CreateTable,
            MenuAction::InsertInto,
            MenuAction::PrintTable,
            MenuAction::DropTable,
        ],
    ),
    (
        "Model",
        &[
            MenuAction::InitTableModel,
            MenuAction::SelectTable,
            MenuAction::InsertRow,
            MenuAction::RemoveRow,
            MenuAction::SubmitChanges,
            MenuAction::RevertChanges,
        ],
    ),
    ("Query", &[MenuAction::DoQuery]),
];

#[must_use]
pub fn menu_state() -> MenuState<MenuAction> {
    MenuState::new(
        MENU_BAR
            .iter()
            .map(|(title, actions)| {
                MenuItem::group(
                    *title,
                    actions
                        .iter()
                        .map(|action| MenuItem::item(action.title(), *action))
                        .collect(),
                )
            })
            .collect(),
    )
}

/// Menu bar with open/closed tracking on top of the `tui-menu` state.
pub struct MenuBar {
    state: MenuState<MenuAction>,
    open: bool,
}

impl Default for MenuBar {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MenuBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuBar").field("open", &self.open).finish_non_exhaustive()
    }
}

impl MenuBar {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: menu_state(),
            open: false,
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.state.activate();
        self.open = true;
    }

    pub fn close(&mut self) {
        self.state.reset();
        self.open = false;
    }

    /// Navigate the open menu. Returns the chosen action, after which the
    /// menu is closed.
    pub fn handle_key(&mut self, code: KeyCode) -> Option<MenuAction> {
        match code {
            KeyCode::Esc | KeyCode::F(10) => self.close(),
            KeyCode::Left | KeyCode::Char('h') => self.state.left(),
            KeyCode::Right | KeyCode::Char('l') => self.state.right(),
            KeyCode::Up | KeyCode::Char('k') => self.state.up(),
            KeyCode::Down | KeyCode::Char('j') => self.state.down(),
            KeyCode::Enter => self.state.select(),
            _ => {}
        }

        let chosen = self
            .state
            .drain_events()
            .map(|event| match event {
                MenuEvent::Selected(action) => action,
            })
            .last();
        if chosen.is_some() {
            self.close();
        }
        chosen
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let menu = Menu::new()
            .default_style(Style::default().fg(Color::White).bg(Color::DarkGray))
            .highlight(Style::default().fg(Color::Black).bg(Color::Yellow))
            .dropdown_width(20)
            .dropdown_style(Style::default().bg(Color::Black));
        menu.render(area, buf, &mut self.state);
    }
}
