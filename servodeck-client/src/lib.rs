pub mod clamp;
pub mod configs;
pub mod console;
pub mod control;
pub mod debouncer;
pub mod error;
pub mod focus;
pub mod state;
pub mod surface;
pub mod synchronizer;
pub mod transport;

pub use console::run;
pub use control::{ControlPanel, ServoBound};
pub use debouncer::PulseSource;
pub use error::{Error, Result};
pub use focus::{FocusCell, FocusProbe};
pub use surface::{ElementId, Surface};
