//! civicbot: Answer questions about civic open data.
//!
//! A question goes through four independent steps, each one external call:
//! generate SQL with the chat model, run it against the open-data database,
//! let the model pick a chart for the resulting table, and optionally
//! publish the visualization as a module in the content graph.

pub mod bot;
pub mod chart;
pub mod error;
pub mod transcript;

pub use bot::{Answer, CivicBot, ModuleDraft, PublishOptions};
pub use error::BotError;
