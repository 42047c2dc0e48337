//! Chained transfer abstractions
//!
//! A transfer ring is a pair of data movers linked in a closed loop:
//!
//! - the *streamer* copies consecutive framebuffer words into the color
//!   channel's input queue, paced by that channel
//! - the *rearmer* fires when the streamer runs out, points the streamer
//!   back at word 0, and restarts it
//!
//! Once started, the pair replays the framebuffer forever with no CPU
//! involvement.

/// Errors from transfer ring operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferError {
    /// The source buffer has no words to stream
    EmptySource,
    /// Rearmer configured before the streamer it chains to
    StreamerNotConfigured,
    /// Started before the rearmer was configured
    RearmerNotConfigured,
    /// The ring is already running; there is no restart or stop
    AlreadyStarted,
}

/// A self-restarting streamer/rearmer pair
///
/// Configuration happens in a fixed order: streamer, rearmer, start.
pub trait TransferRing {
    /// Number of words replayed per pass
    fn words_per_pass(&self) -> usize;

    /// Program the streamer: source = framebuffer, destination = color
    /// channel input queue, chain to rearmer. Does not start it.
    fn configure_streamer(&mut self) -> Result<(), TransferError>;

    /// Program the rearmer: source = fixed restart address, destination =
    /// streamer's source pointer, chain to streamer. Does not start it.
    fn configure_rearmer(&mut self) -> Result<(), TransferError>;

    /// Start the streamer. After this the loop sustains itself.
    fn start(&mut self) -> Result<(), TransferError>;

    /// Check if the ring has been started
    fn is_started(&self) -> bool;
}
