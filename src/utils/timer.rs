//! Timer utilities
//!
//! Provides a scoped timer with blocking and suspending entry points over a
//! single measurement core.

use futures::future::BoxFuture;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Default number of decimal digits in timer messages
pub const DEFAULT_PRECISION: usize = 4;

/// Timer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("Timer ended before it was started")]
    NotStarted,

    #[error("Clock went backwards while timing '{0}'")]
    ClockWentBackwards(String),

    #[error("Suspending callback for '{0}' invoked from a blocking scope")]
    SuspendingCallbackInBlockingScope(String),
}

/// Completion callback, invoked with the elapsed time and formatted message
pub enum TimerCallback {
    /// Runs to completion on the caller's thread
    Blocking(Box<dyn Fn(Duration, &str) + Send + Sync>),
    /// Must be awaited; only valid from the suspending scope
    Suspending(Box<dyn Fn(Duration, String) -> BoxFuture<'static, ()> + Send + Sync>),
}

impl TimerCallback {
    /// Wrap a blocking closure
    pub fn blocking<F>(f: F) -> Self
    where
        F: Fn(Duration, &str) + Send + Sync + 'static,
    {
        Self::Blocking(Box::new(f))
    }

    /// Wrap a closure returning a future
    pub fn suspending<F, Fut>(f: F) -> Self
    where
        F: Fn(Duration, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::Suspending(Box::new(move |elapsed, message| Box::pin(f(elapsed, message))))
    }
}

impl std::fmt::Debug for TimerCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerCallback::Blocking(_) => f.write_str("TimerCallback::Blocking"),
            TimerCallback::Suspending(_) => f.write_str("TimerCallback::Suspending"),
        }
    }
}

/// Scoped timer measuring wall-clock time around a unit of work
#[derive(Debug)]
pub struct Timer {
    label: String,
    precision: usize,
    callback: Option<TimerCallback>,
    start: Option<Instant>,
    elapsed: Option<Duration>,
}

impl Timer {
    /// Create a timer that has not been started yet
    pub fn new(label: impl Into<String>, precision: usize) -> Self {
        Self {
            label: label.into(),
            precision,
            callback: None,
            start: None,
            elapsed: None,
        }
    }

    /// Set the completion callback
    pub fn with_callback(mut self, callback: TimerCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Record the start timestamp
    pub fn begin(&mut self) {
        self.start = Some(Instant::now());
        self.elapsed = None;
    }

    /// Elapsed time of the last completed measurement
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Close the measurement window from a blocking scope
    pub fn end(&mut self) -> Result<Duration, TimerError> {
        let (elapsed, message) = self.finish()?;
        match &self.callback {
            Some(TimerCallback::Blocking(callback)) => callback(elapsed, &message),
            Some(TimerCallback::Suspending(_)) => {
                return Err(TimerError::SuspendingCallbackInBlockingScope(
                    self.label.clone(),
                ))
            }
            None => tracing::info!("{}", message),
        }
        Ok(elapsed)
    }

    /// Close the measurement window from a suspending scope
    pub async fn end_async(&mut self) -> Result<Duration, TimerError> {
        let (elapsed, message) = self.finish()?;
        match &self.callback {
            Some(TimerCallback::Blocking(callback)) => callback(elapsed, &message),
            Some(TimerCallback::Suspending(callback)) => callback(elapsed, message).await,
            None => tracing::info!("{}", message),
        }
        Ok(elapsed)
    }

    /// Time a blocking closure; the window closes whatever the closure returns
    pub fn time<T>(&mut self, f: impl FnOnce() -> T) -> Result<T, TimerError> {
        self.begin();
        let output = f();
        self.end()?;
        Ok(output)
    }

    /// Time a future; the window closes whatever the future resolves to
    pub async fn time_async<F: Future>(&mut self, fut: F) -> Result<F::Output, TimerError> {
        self.begin();
        let output = fut.await;
        self.end_async().await?;
        Ok(output)
    }

    /// Shared core: compute elapsed and format the completion message
    fn finish(&mut self) -> Result<(Duration, String), TimerError> {
        let start = self.start.ok_or(TimerError::NotStarted)?;
        let elapsed = Instant::now()
            .checked_duration_since(start)
            .ok_or_else(|| TimerError::ClockWentBackwards(self.label.clone()))?;

        self.elapsed = Some(elapsed);

        let message = format_elapsed(&self.label, elapsed, self.precision);
        Ok((elapsed, message))
    }
}

/// Format a completion message
pub fn format_elapsed(label: &str, elapsed: Duration, precision: usize) -> String {
    format!(
        "{} took {:.*} seconds",
        label,
        precision,
        elapsed.as_secs_f64()
    )
}

/// Time a blocking closure with a one-shot timer
pub fn time_it<T>(
    label: impl Into<String>,
    precision: usize,
    callback: Option<TimerCallback>,
    f: impl FnOnce() -> T,
) -> Result<(T, Duration), TimerError> {
    let mut timer = Timer::new(label, precision);
    timer.callback = callback;
    let output = timer.time(f)?;
    Ok((output, timer.elapsed.unwrap_or_default()))
}

/// Time a future with a one-shot timer
pub async fn atime_it<F: Future>(
    label: impl Into<String>,
    precision: usize,
    callback: Option<TimerCallback>,
    fut: F,
) -> Result<(F::Output, Duration), TimerError> {
    let mut timer = Timer::new(label, precision);
    timer.callback = callback;
    let output = timer.time_async(fut).await?;
    Ok((output, timer.elapsed.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread::sleep;

    #[test]
    fn test_timer_blocking_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut timer = Timer::new("list_pools", 3).with_callback(TimerCallback::blocking(
            move |elapsed, message| {
                sink.lock().unwrap().push((elapsed, message.to_string()));
            },
        ));

        timer.begin();
        sleep(Duration::from_millis(10));
        let elapsed = timer.end().unwrap();

        assert!(elapsed >= Duration::from_millis(10));
        assert_eq!(timer.elapsed(), Some(elapsed));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, elapsed);
        assert!(seen[0].1.starts_with("list_pools took "));
        assert!(seen[0].1.ends_with(" seconds"));
    }

    #[test]
    fn test_end_without_begin() {
        let mut timer = Timer::new("orphan", 4);
        assert_eq!(timer.end(), Err(TimerError::NotStarted));
        assert!(timer.elapsed().is_none());
    }

    #[test]
    fn test_suspending_callback_rejected_in_blocking_scope() {
        let mut timer = Timer::new("quote", 4)
            .with_callback(TimerCallback::suspending(|_, _| async {}));
        timer.begin();

        let err = timer.end().unwrap_err();
        assert!(matches!(err, TimerError::SuspendingCallbackInBlockingScope(_)));
        // Measurement still recorded
        assert!(timer.elapsed().is_some());
    }

    #[test]
    fn test_suspending_callback_awaited() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();

        let mut timer = Timer::new("pools", 2).with_callback(TimerCallback::suspending(
            move |elapsed, message| {
                let sink = sink.clone();
                async move {
                    tokio::task::yield_now().await;
                    *sink.lock().unwrap() = Some((elapsed, message));
                }
            },
        ));

        let value = tokio_test::block_on(timer.time_async(async { 42 })).unwrap();
        assert_eq!(value, 42);

        let seen = seen.lock().unwrap();
        let (elapsed, message) = seen.as_ref().unwrap();
        assert_eq!(Some(*elapsed), timer.elapsed());
        assert!(message.starts_with("pools took "));
    }

    #[test]
    fn test_time_closes_window_on_error() {
        let (result, elapsed) = time_it("failing", 4, None, || -> Result<(), String> {
            sleep(Duration::from_millis(5));
            Err("boom".to_string())
        })
        .unwrap();

        assert!(result.is_err());
        assert!(elapsed >= Duration::from_millis(5));
    }

    #[test]
    fn test_atime_it() {
        let (value, elapsed) = tokio_test::block_on(atime_it("async", 4, None, async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            "done"
        }))
        .unwrap();

        assert_eq!(value, "done");
        assert!(elapsed >= Duration::from_millis(5));
    }

    #[test]
    fn test_format_precision() {
        let message = format_elapsed("op", Duration::from_millis(1500), 2);
        assert_eq!(message, "op took 1.50 seconds");

        let message = format_elapsed("op", Duration::from_millis(1500), 0);
        assert_eq!(message, "op took 2 seconds");
    }
}
