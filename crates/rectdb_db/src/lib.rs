pub mod connection;
pub mod error;
pub mod model;
pub mod pen;
pub mod query;
pub mod rectangle;
pub mod value;

pub use connection::{ConnectionRegistry, NamedConnection};
pub use error::{DbError, Result};
pub use model::{EditStrategy, SqlTableModel};
pub use pen::{PenStyle, style_label};
pub use query::{QueryOutput, run_query};
pub use rusqlite::types::Value;
