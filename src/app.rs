//! Application module: exposes the screen model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the active tab, the
//! cursor, the search filter and the library drill-in state.

mod model;

pub use model::*;
