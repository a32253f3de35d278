/// Config file loading
pub mod file;

/// Message filters and error texts
pub mod options;

pub use file::{MuxConfig, load_config, load_default_config};
pub use options::{ErrorTexts, Options};
