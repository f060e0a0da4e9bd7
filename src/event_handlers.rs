use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rectdb_ui::{
    DialogOutcome, EditorAction, EditorEvent, MenuAction, PickerAction, QueryAction, QueryResultView,
    handle_cell_editor_input, handle_query_input,
};

use crate::{app::App, app_state::Overlay, workbench::EditSession};

impl App {
    /// Reads the crossterm events and updates the state of [`App`].
    pub async fn handle_crossterm_events(&mut self) -> Result<()> {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                self.on_key_event(key);
            }
            Event::Key(_) => {} // Ignore non-press key events
            Event::FocusGained => {}
            Event::FocusLost => {}
            Event::Mouse(_) => {}
            Event::Paste(_) => {}
            Event::Resize(_, _) => {} // Terminal resize is handled automatically by ratatui
        }

        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    pub fn on_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c' | 'C'))
        {
            self.quit();
            return;
        }

        if self.menu.is_open() {
            if let Some(action) = self.menu.handle_key(key.code) {
                self.perform(action);
            }
            return;
        }

        match std::mem::take(&mut self.overlay) {
            Overlay::None => self.on_grid_key(key),
            Overlay::Editor { index, mut editor } => {
                match handle_cell_editor_input(key, &mut editor) {
                    EditorAction::None => self.overlay = Overlay::Editor { index, editor },
                    EditorAction::Cancel => {}
                    EditorAction::Commit => {
                        if let Err(err) = self.workbench.commit_editor(index, &editor) {
                            self.workbench.report("Edit cell", &err);
                        }
                    }
                }
            }
            Overlay::ColorDialog(mut dialog) => match dialog.handle_key(key) {
                DialogOutcome::Pending => self.overlay = Overlay::ColorDialog(dialog),
                DialogOutcome::Cancelled => {}
                DialogOutcome::Accepted(color) => {
                    if let Err(err) = self.workbench.apply_color(dialog.index(), color) {
                        self.workbench.report("Choose color", &err);
                    }
                }
            },
            Overlay::Query(mut modal) => match handle_query_input(key, &mut modal) {
                QueryAction::None => self.overlay = Overlay::Query(modal),
                QueryAction::Close => {}
                QueryAction::Run(sql) => {
                    let view = match self.workbench.run_query(&sql) {
                        Ok(output) => QueryResultView::from(output),
                        Err(err) => {
                            self.workbench.report(MenuAction::DoQuery.title(), &err);
                            QueryResultView::Error(err.to_string())
                        }
                    };
                    modal.set_result(view);
                    self.overlay = Overlay::Query(modal);
                }
            },
            Overlay::TablePicker(mut picker) => match picker.handle_key(key) {
                PickerAction::None => self.overlay = Overlay::TablePicker(picker),
                PickerAction::Cancel => {}
                PickerAction::Picked(table) => {
                    if let Err(err) = self.workbench.select_table(&table) {
                        self.workbench.report(MenuAction::SelectTable.title(), &err);
                    }
                }
            },
        }
    }

    /// Keys while the grid has focus.
    fn on_grid_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::F(10) | KeyCode::Char('m') => self.menu.open(),
            KeyCode::Char('q') => self.quit(),
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.begin_edit(EditorEvent::SecondaryActivate);
            }
            KeyCode::Enter => self.begin_edit(EditorEvent::Activate),
            KeyCode::Char(' ') => self.begin_edit(EditorEvent::Press),
            KeyCode::Char('o') => self.perform(MenuAction::InsertRow),
            KeyCode::Char('d') => self.perform(MenuAction::RemoveRow),
            KeyCode::Char('s') => self.perform(MenuAction::SubmitChanges),
            KeyCode::Char('u') => self.perform(MenuAction::RevertChanges),
            KeyCode::Char(':') => self.perform(MenuAction::DoQuery),
            code => {
                self.workbench.navigate(code);
            }
        }
    }

    fn begin_edit(&mut self, event: EditorEvent) {
        match self.workbench.begin_edit(event) {
            Ok(Some(EditSession::Inline { index, editor })) => {
                self.overlay = Overlay::Editor { index, editor };
            }
            Ok(Some(EditSession::Color(dialog))) => self.overlay = Overlay::ColorDialog(dialog),
            Ok(None) => {}
            Err(err) => self.workbench.report("Edit cell", &err),
        }
    }
}
