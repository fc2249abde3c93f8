mod keymap;
pub mod preview;
mod state;
mod types;

pub use types::{App, FileDetails, InputMode};
