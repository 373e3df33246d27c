//! Log sinks for embedding the scripting runtime in interactive tools.
//!
//! The library itself only speaks the `log` facade. Hosts that render log output themselves (a
//! shell, an editor panel) install a [`ChannelLogger`] and drain its receiver between frames.

mod channel;

pub use channel::{ChannelLogger, LogMessage};
