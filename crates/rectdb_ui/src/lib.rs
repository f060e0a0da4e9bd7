pub mod color;
pub mod delegate;
pub mod handlers;
pub mod widgets;

pub use color::Rgb;
pub use delegate::{
    CellIndex, Editor, EditorEvent, EventOutcome, ItemDelegate, RectangleDelegate,
    TextDelegate,
};
pub use handlers::{
    EditorAction, GridNavigationHandler, handle_cell_editor_input, handle_query_input,
};
pub use widgets::{
    color_dialog::{ColorDialog, DialogOutcome},
    console::Console,
    grid::{Grid, GridView},
    menu::{MenuAction, MenuBar},
    modal::{PickerAction, QueryAction, QueryModal, QueryResultView, TablePicker},
};
