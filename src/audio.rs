//! Playback: the audio-output seam, its `rodio` adapter, the synthetic
//! progress ticker and the transport state machine that drives them.

mod output;
mod sink;
mod ticker;
mod transport;
mod types;

pub use output::{AudioOutput, NullOutput, OutputHandle};
pub use sink::RodioOutput;
pub use ticker::Ticker;
pub use transport::Transport;
pub use types::*;

#[cfg(test)]
mod tests;
