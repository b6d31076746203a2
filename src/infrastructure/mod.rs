//! Infrastructure layer providing external service integrations.
//!
//! Document sources (a JSON file or the HTTP API) and CSV export.

pub mod api;
pub mod export;
pub mod persistence;
pub mod source;

pub use api::*;
pub use export::*;
pub use persistence::*;
pub use source::*;
