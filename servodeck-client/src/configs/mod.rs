mod settings;

pub use settings::{Device, Logger, Settings, Timing};
