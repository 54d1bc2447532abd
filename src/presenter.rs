//! The startup indicator.
//!
//! An owned controller around an `indicatif` spinner: a static icon, a
//! status caption, and a looping frame animation that advances on its own
//! cadence, independent of probe progress. The indicator is dismissed only
//! through [`SplashPresenter::complete`], which consumes the presenter so a
//! second dismissal cannot compile.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinHandle;

use crate::outcome::StartupOutcome;

/// Frames of the looping startup animation, in display order.
pub const ANIMATION_FRAMES: &[&str] = &[
    "(●     )",
    "( ●    )",
    "(  ●   )",
    "(   ●  )",
    "(    ● )",
    "(     ●)",
    "(    ● )",
    "(   ●  )",
    "(  ●   )",
    "( ●    )",
];

/// Fixed period of the frame animation.
pub const ANIMATION_INTERVAL: Duration = Duration::from_millis(80);

/// Number of opacity steps in the dismissal fade.
pub const FADE_STEPS: u32 = 10;

/// Fixed period between fade steps.
pub const FADE_INTERVAL: Duration = Duration::from_millis(40);

/// Static icon shown next to the caption.
const SPLASH_ICON: &str = "◆";

// Cosmetic pause between readiness and the fade, so the indicator
// disappears roughly when the application window appears.
#[cfg(target_os = "macos")]
const READY_FADE_DELAY: Duration = Duration::from_secs(1);

/// Frame index cycling over a fixed-size ordered frame set, wrapping
/// indefinitely until the indicator is torn down.
#[derive(Debug)]
pub struct AnimationState {
    frame: usize,
    frame_count: usize,
}

impl AnimationState {
    pub fn new(frame_count: usize) -> Self {
        Self {
            frame: 0,
            // An empty frame set degenerates to a single static frame.
            frame_count: frame_count.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.frame
    }

    /// Advances to the next frame, wrapping at the end of the sequence.
    pub fn advance(&mut self) -> usize {
        self.frame = (self.frame + 1) % self.frame_count;
        self.frame
    }
}

/// Opacity values of the dismissal fade, strictly decreasing to zero.
pub fn fade_steps() -> impl Iterator<Item = f32> {
    (0..FADE_STEPS).rev().map(|step| step as f32 / FADE_STEPS as f32)
}

/// Caption rendered at a given opacity. The terminal has no real alpha
/// channel, so opacity maps onto progressively dimmer styling and finally
/// an empty line.
fn faded(caption: &str, opacity: f32) -> String {
    if opacity <= 0.0 {
        String::new()
    } else if opacity < 0.4 {
        style(caption).black().bright().to_string()
    } else if opacity < 0.8 {
        style(caption).dim().to_string()
    } else {
        caption.to_string()
    }
}

/// Owned controller for the startup indicator.
pub struct SplashPresenter {
    bar: ProgressBar,
    caption: String,
    animation: Option<JoinHandle<()>>,
}

impl SplashPresenter {
    /// Shows the indicator and starts the frame animation. The bar is drawn
    /// before this returns, so callers can rely on it being visible before
    /// probing starts.
    pub fn show(caption: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{prefix} {msg}").expect("static indicator template"),
        );
        let caption = format!("{SPLASH_ICON} {caption}");
        bar.set_prefix(ANIMATION_FRAMES[0]);
        bar.set_message(caption.clone());
        bar.tick();

        let animation = tokio::spawn(animate(bar.clone()));
        Self {
            bar,
            caption,
            animation: Some(animation),
        }
    }

    /// Dismisses the indicator for the given terminal outcome: failures get
    /// a styled error line first, then everything fades out and the bar is
    /// torn down. Consuming `self` keeps dismissal single-shot.
    pub async fn complete(mut self, outcome: &StartupOutcome) {
        if let Some(animation) = self.animation.take() {
            animation.abort();
        }

        if outcome.is_ready() {
            #[cfg(target_os = "macos")]
            tokio::time::sleep(READY_FADE_DELAY).await;
        } else {
            self.bar.println(format!(
                "{} {}",
                style("✗").red().bold(),
                style(outcome.describe()).red()
            ));
        }

        for opacity in fade_steps() {
            self.bar.set_message(faded(&self.caption, opacity));
            tokio::time::sleep(FADE_INTERVAL).await;
        }
        self.bar.finish_and_clear();
    }
}

async fn animate(bar: ProgressBar) {
    let mut state = AnimationState::new(ANIMATION_FRAMES.len());
    loop {
        tokio::time::sleep(ANIMATION_INTERVAL).await;
        bar.set_prefix(ANIMATION_FRAMES[state.advance()]);
    }
}
