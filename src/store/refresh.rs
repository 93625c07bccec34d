use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

/// Which slice of persisted state a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Workouts,
    Completion,
}

/// Best-effort signal fired after every successful store mutation, meant for surfaces that
/// mirror store state, like a home screen widget. The store logs and ignores any error coming
/// out of [notify](RefreshSignal::notify); a broken signal must never affect store state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshSignal: Sync + Send {
    async fn notify(&self, change: StoreChange) -> Result<()>;
}

/// Signal used by the cli frontend. A terminal has no widget to refresh, so this only leaves a
/// trace behind.
pub struct LogRefresh;

#[async_trait]
impl RefreshSignal for LogRefresh {
    async fn notify(&self, change: StoreChange) -> Result<()> {
        debug!("Refresh signal after {change:?} change");
        Ok(())
    }
}
