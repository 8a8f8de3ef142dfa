//! Session layer: the control loop and the consoles it talks through

pub mod console;
pub mod control_loop;
pub mod voice;

pub use console::{Console, Emission, Heard, TextConsole};
pub use control_loop::{ControlLoop, LoopState};
pub use voice::VoiceConsole;
