//! User-facing action boundary.
//!
//! [`ActionState::run`] wraps one print or export action: it marks the action as in progress,
//! always clears the mark afterwards, and turns failures into a short [`Notice`] instead of a raw
//! error.

use crate::{PrintError, PrintResult};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrintAction {
    Print,
    ExportPdf,
    ExportCsv,
}

impl PrintAction {
    pub fn failure_message(&self) -> &'static str {
        match self {
            PrintAction::Print => "Failed to print document",
            PrintAction::ExportPdf => "Failed to export PDF",
            PrintAction::ExportCsv => "Failed to export CSV file",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A short message for the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// The message shown when `action` fails with `error`.
    pub fn for_failure(action: PrintAction, error: &PrintError) -> Self {
        match error {
            PrintError::EmptyExport => Notice::info("No data to export"),
            PrintError::PopupBlocked => Notice::error("Please allow popups to print"),
            _ => Notice::error(action.failure_message()),
        }
    }
}

/// In-progress flag for one print/export control.
#[derive(Debug, Default)]
pub struct ActionState {
    in_progress: AtomicBool,
}

struct InProgress<'a>(&'a AtomicBool);

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ActionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    fn begin(&self, action: PrintAction) -> Result<InProgress<'_>, Notice> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!(?action, "action already in progress");
            return Err(Notice::info("Another print or export is already in progress"));
        }
        Ok(InProgress(&self.in_progress))
    }

    fn finish<T>(action: PrintAction, result: PrintResult<T>) -> Result<T, Notice> {
        result.map_err(|e| {
            if e.is_precondition() {
                tracing::warn!(?action, "action not completed: {}", e);
            } else {
                tracing::error!(?action, "action failed: {}", e);
            }
            Notice::for_failure(action, &e)
        })
    }

    /// Runs a synchronous action.
    pub fn run<T>(
        &self,
        action: PrintAction,
        f: impl FnOnce() -> PrintResult<T>,
    ) -> Result<T, Notice> {
        let _mark = self.begin(action)?;
        Self::finish(action, f())
    }

    /// Runs an asynchronous action, such as one that first fetches the print context.
    pub async fn run_async<T, F>(&self, action: PrintAction, f: F) -> Result<T, Notice>
    where
        F: Future<Output = PrintResult<T>>,
    {
        let _mark = self.begin(action)?;
        Self::finish(action, f.await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_map_to_short_messages() {
        let state = ActionState::new();

        let notice = state
            .run(PrintAction::ExportCsv, || -> PrintResult<()> {
                Err(PrintError::EmptyExport)
            })
            .unwrap_err();
        assert_eq!(notice, Notice::info("No data to export"));

        let notice = state
            .run(PrintAction::Print, || -> PrintResult<()> {
                Err(PrintError::PopupBlocked)
            })
            .unwrap_err();
        assert_eq!(notice.message, "Please allow popups to print");

        let notice = state
            .run(PrintAction::ExportPdf, || -> PrintResult<()> {
                Err(PrintError::Pdf("font".into()))
            })
            .unwrap_err();
        assert_eq!(notice, Notice::error("Failed to export PDF"));

        let notice = state
            .run(PrintAction::ExportCsv, || -> PrintResult<()> {
                Err(PrintError::CsvBuffer("closed".into()))
            })
            .unwrap_err();
        assert_eq!(notice.message, "Failed to export CSV file");
    }

    #[test]
    fn flag_is_set_during_and_cleared_after() {
        let state = ActionState::new();
        let value = state
            .run(PrintAction::Print, || {
                assert!(state.is_in_progress());
                Ok(7)
            })
            .unwrap();
        assert_eq!(value, 7);
        assert!(!state.is_in_progress());

        let _ = state.run(PrintAction::Print, || -> PrintResult<()> {
            Err(PrintError::TargetNotFound("x".into()))
        });
        assert!(!state.is_in_progress());
    }

    #[test]
    fn nested_run_is_rejected() {
        let state = ActionState::new();
        let inner = state
            .run(PrintAction::ExportPdf, || {
                Ok(state.run(PrintAction::ExportCsv, || Ok(())))
            })
            .unwrap();
        assert!(inner.is_err());
    }

    #[tokio::test]
    async fn async_actions_reset_the_flag() {
        let state = ActionState::new();
        let result: Result<(), Notice> = state
            .run_async(PrintAction::Print, async {
                Err(PrintError::OrganizationUnavailable)
            })
            .await;
        assert_eq!(result, Err(Notice::error("Failed to print document")));
        assert!(!state.is_in_progress());
    }
}
