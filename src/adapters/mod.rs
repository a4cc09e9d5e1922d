// Adapters layer: concrete implementations of the title source and audio control ports.

pub mod console;
pub mod dry_run;
pub mod pactl;
pub mod replay;

#[cfg(feature = "cli")]
pub mod process;
#[cfg(feature = "cli")]
pub mod wmctrl;

pub use dry_run::DryRunAudioController;
pub use pactl::PactlAudioController;
pub use replay::ReplayTitleSource;

#[cfg(feature = "cli")]
pub use wmctrl::WmctrlTitleSource;
