//! Progress side channel
//!
//! Pipeline events are delivered through a [`ProgressEmitter`], independently
//! of the HTTP response. The in-process implementation is [`ProgressHub`].

mod emitter;
mod hub;
#[cfg(test)]
mod recording;

pub use emitter::{ProgressEmitter, ProgressNotifier};
pub use hub::{ProgressHub, ProgressSubscription};
#[cfg(test)]
pub(crate) use recording::RecordingEmitter;
