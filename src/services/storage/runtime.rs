//! Tokio runtime for OpenDAL calls.
//!
//! The Fs, S3 and GCS services need a Tokio reactor. Gateway futures are
//! spawned onto the caller's Tokio runtime when there is one, otherwise onto
//! a small process-wide runtime, and the join handle is awaited from
//! whichever executor the caller uses.

use std::future::Future;
use std::sync::OnceLock;

use anyhow::{Result, anyhow};
use tokio::runtime::{Builder, Handle, Runtime};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

fn handle() -> Result<Handle> {
    if let Ok(handle) = Handle::try_current() {
        return Ok(handle);
    }
    if let Some(rt) = RUNTIME.get() {
        return Ok(rt.handle().clone());
    }

    let rt = Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("asset-storage")
        .enable_all()
        .build()
        .map_err(|e| anyhow!("Failed to start storage runtime: {}", e))?;
    Ok(RUNTIME.get_or_init(|| rt).handle().clone())
}

/// Run a storage future on Tokio and wait for its result.
pub(super) async fn run<F, T>(fut: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    handle()?
        .spawn(fut)
        .await
        .map_err(|e| anyhow!("Storage task failed: {}", e))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_tokio_io_outside_tokio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");

        let read = smol::block_on(run(async move {
            tokio::fs::write(&path, b"ok").await?;
            Ok(tokio::fs::read(&path).await?)
        }))
        .unwrap();
        assert_eq!(read, b"ok");
    }

    #[test]
    fn test_uses_callers_runtime() {
        let rt = Builder::new_current_thread().enable_all().build().unwrap();
        let value = rt.block_on(async { run(async { Ok(7) }).await }).unwrap();
        assert_eq!(value, 7);
    }
}
