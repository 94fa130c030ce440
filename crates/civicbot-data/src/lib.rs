//! civicbot-data: Read civic open data with generated SQL.
//!
//! Runs a query against the open-data SQLite database and renders the rows
//! as a plain-text table, the form that is both shown to users and fed back
//! to the model for chart selection.

pub mod error;
pub mod reader;
pub mod table;

pub use error::DataError;
pub use reader::TableReader;
pub use table::{render_table, Cell};
