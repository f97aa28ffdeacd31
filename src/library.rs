//! Song library: the catalog model, the media indexer seam and the loader
//! that turns indexer output into a catalog.
//!
//! The loader never fails to its caller. When the indexer comes back empty
//! or errors, a fixed demo catalog is used instead.

mod browse;
mod catalog;
mod display;
mod indexer;
mod model;
mod scan;

pub use browse::*;
pub use catalog::*;
pub use display::*;
pub use indexer::*;
pub use model::*;
pub use scan::DirectoryIndexer;

#[cfg(test)]
mod tests;
