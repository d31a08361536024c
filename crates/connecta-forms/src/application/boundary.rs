//! Top-level recovery from rendering failures.
//!
//! A renderer that panics must not take the whole front end down. The boundary
//! runs it under `catch_unwind` and hands back a recovery screen instead.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use tracing::error;

pub const RECOVERY_TITLE: &str = "Oops! Something went wrong";
pub const RECOVERY_HEADING: &str = "Application Error";
pub const RECOVERY_MESSAGE: &str =
    "We encountered an unexpected error. Our team has been notified and we're working on a fix.";
pub const SUPPORT_HINT: &str = "If the problem persists, please contact support at support@connecta.com";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    /// Render the same screen again.
    TryAgain,
    /// Return to the root screen.
    GoHome,
}

impl RecoveryAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::TryAgain => "Try Again",
            Self::GoHome => "Go Home",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Recovery {
    pub title: String,
    pub heading: String,
    pub message: String,
    /// Panic message; only populated in development mode.
    pub detail: Option<String>,
    pub error_count: usize,
    pub warning: Option<String>,
    pub actions: Vec<RecoveryAction>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Rendered<T> {
    Ok(T),
    Recovered(Recovery),
}

impl<T> Rendered<T> {
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered(_))
    }
}

#[derive(Debug, Default)]
pub struct ErrorBoundary {
    development: bool,
    errors: AtomicUsize,
}

impl ErrorBoundary {
    pub fn new(development: bool) -> Self {
        Self {
            development,
            errors: AtomicUsize::new(0),
        }
    }

    /// Errors caught since the boundary was created.
    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    pub fn render<T>(&self, renderer: impl FnOnce() -> T) -> Rendered<T> {
        match catch_unwind(AssertUnwindSafe(renderer)) {
            Ok(value) => Rendered::Ok(value),
            Err(payload) => {
                let count = self.errors.fetch_add(1, Ordering::SeqCst) + 1;
                let detail = panic_message(payload.as_ref());
                error!(count, error = %detail, "Error boundary caught a rendering failure");
                Rendered::Recovered(self.recovery(detail, count))
            }
        }
    }

    fn recovery(&self, detail: String, count: usize) -> Recovery {
        let warning = match count {
            0..=2 => None,
            3..=5 => Some(format!("Multiple errors detected ({}).", count)),
            _ => Some(format!("Multiple errors detected ({}). Please refresh the page.", count)),
        };
        Recovery {
            title: RECOVERY_TITLE.into(),
            heading: RECOVERY_HEADING.into(),
            message: RECOVERY_MESSAGE.into(),
            detail: self.development.then_some(detail),
            error_count: count,
            warning,
            actions: vec![RecoveryAction::TryAgain, RecoveryAction::GoHome],
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing() {
        panic!("step index out of range")
    }

    #[test]
    fn test_success_passes_through() {
        let boundary = ErrorBoundary::new(false);
        assert_eq!(boundary.render(|| 42), Rendered::Ok(42));
        assert_eq!(boundary.error_count(), 0);
    }

    #[test]
    fn test_panic_becomes_recovery_screen() {
        let boundary = ErrorBoundary::new(false);
        let Rendered::Recovered(recovery) = boundary.render(failing) else {
            panic!("expected a recovery screen");
        };
        assert_eq!(recovery.title, RECOVERY_TITLE);
        assert_eq!(recovery.detail, None);
        assert_eq!(recovery.actions, vec![RecoveryAction::TryAgain, RecoveryAction::GoHome]);

        // Try again re-renders.
        assert_eq!(boundary.render(|| "menu"), Rendered::Ok("menu"));
    }

    #[test]
    fn test_detail_only_in_development() {
        let boundary = ErrorBoundary::new(true);
        let Rendered::Recovered(recovery) = boundary.render(|| -> u8 { panic!("bad state {}", 7) }) else {
            panic!("expected a recovery screen");
        };
        assert_eq!(recovery.detail.as_deref(), Some("bad state 7"));
    }

    #[test]
    fn test_repeated_errors_warn() {
        let boundary = ErrorBoundary::new(false);
        let mut last = None;
        for _ in 0..6 {
            if let Rendered::Recovered(r) = boundary.render(failing) {
                if r.error_count == 3 {
                    assert_eq!(r.warning.as_deref(), Some("Multiple errors detected (3)."));
                }
                last = Some(r);
            }
        }
        let last = last.unwrap();
        assert_eq!(last.error_count, 6);
        assert_eq!(
            last.warning.as_deref(),
            Some("Multiple errors detected (6). Please refresh the page.")
        );
    }
}
