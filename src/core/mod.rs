pub mod classifier;
pub mod diagnostics;
pub mod monitor;
pub mod runner;

pub use crate::domain::model::{
    Classification, MonitorEvent, PlaybackPhase, PlaybackState, StatusSnapshot, TitleSample,
};
pub use crate::domain::ports::{AudioController, WindowTitleSource};
pub use crate::utils::error::Result;
