//! Text codecs.
//!
//! Player commands in, per-player views and frame records out. No
//! transport lives here.

pub mod command;
pub mod view;
pub mod frame;

pub use command::{parse_command, Command, ProtocolError};
pub use view::{input_for_player, view_init_lines, PlayerView, ViewEntity};
pub use frame::{Describe, FrameRecorder};
