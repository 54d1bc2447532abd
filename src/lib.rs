//! Overture startup supervisor.
//!
//! Launches the application executable, polls its local `/ping` endpoint
//! until it answers, and drives a terminal startup indicator whose
//! lifecycle follows the single terminal outcome of the launch.

pub mod config;
pub mod launcher;
pub mod outcome;
pub mod presenter;
pub mod prober;
pub mod supervisor;

// Re-export commonly used types for convenience
pub use config::ProbeConfig;
pub use launcher::LaunchError;
pub use outcome::StartupOutcome;
pub use presenter::SplashPresenter;
pub use prober::ReadinessProber;
