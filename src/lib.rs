pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::Settings;

pub use crate::core::{
    classifier::{ClassificationRules, NoSeparatorPolicy, TitleClassifier},
    monitor::PlaybackMonitor,
    runner::{spawn_monitor, MonitorCommand, MonitorHandle},
};
pub use domain::model::{Classification, MonitorEvent, PlaybackPhase, PlaybackState, TitleSample};
pub use domain::ports::{AudioController, WindowTitleSource};
pub use utils::error::{AdMuteError, AudioError, Result};
