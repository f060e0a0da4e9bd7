use rectdb_ui::{CellIndex, ColorDialog, Editor, QueryModal, TablePicker};

/// What currently owns the keyboard on top of the grid.
#[derive(Debug, Clone, Default)]
pub enum Overlay {
    #[default]
    None,
    /// Inline editor in the current cell
    Editor { index: CellIndex, editor: Editor },
    ColorDialog(ColorDialog),
    Query(QueryModal),
    TablePicker(TablePicker),
}

impl Overlay {
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The inline editor, for drawing inside the grid.
    #[must_use]
    pub const fn editor(&self) -> Option<&Editor> {
        match self {
            Self::Editor { editor, .. } => Some(editor),
            Self::None | Self::ColorDialog(_) | Self::Query(_) | Self::TablePicker(_) => None,
        }
    }
}
