//! Background execution of the archiving tools on a tokio runtime

use crate::{
    error::{PackError, Result},
    exec::ProcessOutput,
};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::Instrument;

/// A tool run in progress on the tokio runtime.
///
/// Awaiting it yields the result of the run. Dropping it does not stop the
/// subprocess; use [`BackgroundRun::detach`] to make that explicit. Failures
/// are logged by the run itself, so a detached run never fails silently.
#[derive(Debug)]
#[must_use = "await the run, attach a callback with `on_complete`, or call `detach`"]
pub struct BackgroundRun {
    runtime: Handle,
    handle: JoinHandle<Result<ProcessOutput>>,
}

impl BackgroundRun {
    /// Spawn `task` on the current tokio runtime, inside the current span
    pub(crate) fn spawn<F>(task: F) -> Result<Self>
    where
        F: Future<Output = Result<ProcessOutput>> + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| PackError::NoRuntime)?;
        let handle = runtime.spawn(task.in_current_span());
        Ok(Self { runtime, handle })
    }

    /// Let the run continue without observing its result
    pub fn detach(self) {
        drop(self.handle);
    }

    /// Invoke `callback` with the result once the run completes
    pub fn on_complete<C>(self, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(Result<ProcessOutput>) + Send + 'static,
    {
        let runtime = self.runtime.clone();
        runtime.spawn(async move { callback(self.await) })
    }
}

impl Future for BackgroundRun {
    type Output = Result<ProcessOutput>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|joined| joined.unwrap_or_else(|err| Err(PackError::Join(err.to_string()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::mpsc;

    #[test]
    fn test_spawn_requires_runtime() {
        assert_matches!(
            BackgroundRun::spawn(async { Ok::<_, PackError>(ProcessOutput::default()) }),
            Err(PackError::NoRuntime)
        );
    }

    #[tokio::test]
    async fn test_await_result() {
        let run = BackgroundRun::spawn(async {
            Ok::<_, PackError>(ProcessOutput {
                stdout: "done".to_string(),
                stderr: String::new(),
            })
        })
        .unwrap();
        assert_eq!(run.await.unwrap().stdout, "done");
    }

    #[tokio::test]
    async fn test_on_complete_invokes_callback() {
        let (sender, receiver) = mpsc::channel();
        let run =
            BackgroundRun::spawn(async { Err::<ProcessOutput, _>(PackError::NoRuntime) }).unwrap();
        run.on_complete(move |result| {
            sender.send(result.is_err()).unwrap();
        })
        .await
        .unwrap();
        assert!(receiver.recv().unwrap());
    }

    #[tokio::test]
    async fn test_panicking_task_is_reported() {
        let run = BackgroundRun::spawn(async {
            if true {
                panic!("tool exploded");
            }
            Ok::<_, PackError>(ProcessOutput::default())
        })
        .unwrap();
        assert_matches!(run.await, Err(PackError::Join(_)));
    }
}
