//! Continuous scanout
//!
//! Two units linked in a closed cycle replay the framebuffer into the
//! color timing channel forever:
//!
//! ```text
//!            words[cursor]          ┌───────────────┐
//!   ┌──────────┐ ──────────────────▶│ color channel │ (paced consumer)
//!   │ Streamer │                    └───────────────┘
//!   └──────────┘ ◀──┐
//!        │ exhausted │ cursor = 0, remaining = WORDS_PER_FRAME
//!        ▼           │
//!   ┌──────────┐ ────┘
//!   │ Rearmer  │
//!   └──────────┘
//! ```
//!
//! [`ScanoutEngine`] runs the cycle as a synchronous state machine driven
//! by consumer requests. The [`pipeline`] module runs the same two units as
//! cooperating async tasks over a bounded channel.

pub mod engine;
pub mod pipeline;
pub mod rearmer;
pub mod streamer;

pub use engine::{Activity, ScanoutEngine, ScanoutStats};
pub use pipeline::{color_channel_task, rearmer_task, streamer_task, ScanoutLink};
pub use rearmer::{Rearmer, Reload};
pub use streamer::{Streamer, StreamerState};
