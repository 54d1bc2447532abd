//! Startup orchestration.
//!
//! Wires launcher, prober, and presenter together: the indicator is on
//! screen before the first probe, the prober runs on a background task, and
//! its single outcome crosses back over a one-shot channel. Ctrl-C is
//! swallowed while the sequence runs so the indicator cannot be dismissed
//! in a way that orphans the freshly spawned application.

use std::env;
use std::ffi::OsString;
use std::process::ExitCode;

use console::style;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::config::ProbeConfig;
use crate::launcher::{self, LaunchError};
use crate::outcome::StartupOutcome;
use crate::presenter::SplashPresenter;
use crate::prober::ReadinessProber;

/// Runs one supervised launch end to end and returns the loader's exit
/// code.
pub async fn run() -> ExitCode {
    let config = ProbeConfig::load_near_executable();
    let args: Vec<OsString> = env::args_os().skip(1).collect();

    let path = match launcher::target_executable() {
        Ok(path) => path,
        Err(err) => return launch_failed(err),
    };

    let mut child = match launcher::launch(&path, &args) {
        Ok(child) => child,
        Err(err) => return launch_failed(err),
    };

    info!(
        "launched {} (pid {:?}), probing port {}",
        path.display(),
        child.id(),
        config.port
    );

    // Indicator first, probing second.
    let presenter = SplashPresenter::show("Starting application");

    let (outcome_tx, outcome_rx) = oneshot::channel();
    let prober = ReadinessProber::new(&config);
    let worker = tokio::spawn(async move {
        let outcome = prober.run(&mut child).await;
        // The receiver only disappears if the loader is already going down.
        let _ = outcome_tx.send(outcome);
    });

    let interrupt_guard = tokio::spawn(swallow_interrupts());

    let outcome = match outcome_rx.await {
        Ok(outcome) => outcome,
        Err(_) => StartupOutcome::ProbeError("readiness worker stopped unexpectedly".to_string()),
    };
    interrupt_guard.abort();
    let _ = worker.await;

    match &outcome {
        StartupOutcome::Ready => info!("application is ready"),
        other => error!("startup failed: {}", other.describe()),
    }

    presenter.complete(&outcome).await;
    ExitCode::from(outcome.exit_code())
}

fn launch_failed(err: LaunchError) -> ExitCode {
    error!("{err}");
    eprintln!("{} {}", style("✗").red().bold(), style(&err).red());
    ExitCode::from(err.exit_code())
}

/// The indicator has no close affordance: interrupts during startup are
/// logged and ignored, and the task is aborted once the outcome arrives.
async fn swallow_interrupts() {
    loop {
        match tokio::signal::ctrl_c().await {
            Ok(()) => warn!("interrupt ignored while the application is starting"),
            Err(err) => {
                warn!("could not listen for interrupts: {err}");
                return;
            }
        }
    }
}
