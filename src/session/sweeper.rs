use chrono::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use super::config::check_idle_timeout;
use super::repository::SessionRepository;
use crate::AuthError;

/// Spawns a background task that prunes idle sessions every `every`.
///
/// The task runs on the current tokio runtime until the handle is aborted.
/// Pruning errors are logged and the task keeps going.
///
/// # Errors
///
/// Returns `AuthError::ConfigurationError` without spawning anything if
/// `idle_timeout` is not positive or `every` is zero.
///
/// # Example
///
/// ```rust,ignore
/// let sessions = InMemorySessionRepository::<User>::new();
/// let sweeper = spawn_idle_sweeper(
///     sessions.clone(),
///     chrono::Duration::hours(8),
///     std::time::Duration::from_secs(300),
/// )?;
/// ```
pub fn spawn_idle_sweeper<U, S>(
    sessions: S,
    idle_timeout: Duration,
    every: std::time::Duration,
) -> Result<JoinHandle<()>, AuthError>
where
    U: Send + Sync + 'static,
    S: SessionRepository<U> + 'static,
{
    check_idle_timeout(idle_timeout)?;
    if every.is_zero() {
        return Err(AuthError::ConfigurationError(
            "sweep interval must be non-zero".to_owned(),
        ));
    }

    Ok(tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match sessions.prune_idle(idle_timeout).await {
                Ok(0) => {}
                Ok(pruned) => {
                    log::info!(target: "sessid::session", "msg=\"idle sessions pruned\" count={pruned}");
                }
                Err(e) => {
                    log::warn!(target: "sessid::session", "msg=\"idle session sweep failed\" error=\"{e}\"");
                }
            }
        }
    }))
}
