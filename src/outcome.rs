//! Terminal results of a supervised launch and their exit codes.

/// Loader exited cleanly after the application became ready.
pub const EXIT_READY: u8 = 0;
/// The application executable does not exist.
pub const EXIT_EXEC_NOT_FOUND: u8 = 10;
/// The OS refused to start the application process.
pub const EXIT_SPAWN_FAILED: u8 = 11;
/// The application exited before answering the readiness probe.
pub const EXIT_CHILD_EXITED: u8 = 12;
/// A probe failed in a way that is not "still starting".
pub const EXIT_PROBE_ERROR: u8 = 13;
/// The application never became ready within the startup timeout.
pub const EXIT_TIMED_OUT: u8 = 14;

/// The single terminal result of one supervised launch.
///
/// Exactly one of these is produced per launch; once it exists, the prober
/// has stopped for good and the indicator is dismissed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupOutcome {
    /// The readiness endpoint answered (any status counts).
    Ready,
    /// The child exited before becoming ready. `None` means it was killed
    /// by a signal and carries no exit code.
    ProcessExited(Option<i32>),
    /// No readiness signal within the startup timeout.
    TimedOut,
    /// An unexpected probe failure, distinct from "not listening yet".
    ProbeError(String),
}

impl StartupOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, StartupOutcome::Ready)
    }

    /// Stable process exit code for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            StartupOutcome::Ready => EXIT_READY,
            StartupOutcome::ProcessExited(_) => EXIT_CHILD_EXITED,
            StartupOutcome::TimedOut => EXIT_TIMED_OUT,
            StartupOutcome::ProbeError(_) => EXIT_PROBE_ERROR,
        }
    }

    /// User-facing description of a failed startup.
    pub fn describe(&self) -> String {
        match self {
            StartupOutcome::Ready => "application is ready".to_string(),
            StartupOutcome::ProcessExited(Some(code)) => {
                format!("the application exited before becoming ready (exit code {code})")
            }
            StartupOutcome::ProcessExited(None) => {
                "the application was terminated by a signal before becoming ready".to_string()
            }
            StartupOutcome::TimedOut => {
                "the application did not become ready within the startup timeout".to_string()
            }
            StartupOutcome::ProbeError(message) => {
                format!("could not check application readiness: {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_failure_kind() {
        let outcomes = [
            StartupOutcome::Ready,
            StartupOutcome::ProcessExited(Some(1)),
            StartupOutcome::TimedOut,
            StartupOutcome::ProbeError("boom".into()),
        ];
        let mut codes: Vec<u8> = outcomes.iter().map(StartupOutcome::exit_code).collect();
        codes.push(EXIT_EXEC_NOT_FOUND);
        codes.push(EXIT_SPAWN_FAILED);

        let mut unique = codes.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn only_ready_maps_to_zero() {
        assert_eq!(StartupOutcome::Ready.exit_code(), 0);
        assert_ne!(StartupOutcome::TimedOut.exit_code(), 0);
        assert_ne!(StartupOutcome::ProcessExited(None).exit_code(), 0);
        assert_ne!(StartupOutcome::ProbeError(String::new()).exit_code(), 0);
    }

    #[test]
    fn descriptions_carry_the_exit_code() {
        let outcome = StartupOutcome::ProcessExited(Some(7));
        assert!(outcome.describe().contains('7'));

        let outcome = StartupOutcome::ProbeError("connection broke".into());
        assert!(outcome.describe().contains("connection broke"));
    }
}
