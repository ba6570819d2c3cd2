use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

use dfdl_client::{ClientResult, MemoryStore, TableSession};

/// Default table id used by the scenarios.
pub const TABLE_ID: &str = "dfdl-schemas";

/// A cloneable in-memory writer.
///
/// Hand one clone to a session (or a log subscriber) and read the text back
/// through another.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything written so far.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Returns the written lines.
    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Routes log events on the current thread into a buffer.
///
/// Events are kept while the returned guard is alive. Works with the
/// current-thread runtime `#[tokio::test]` uses.
pub fn capture_logs() -> (DefaultGuard, SharedBuffer) {
    let logs = SharedBuffer::new();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("dfdl_client=debug"))
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .finish();
    (tracing::subscriber::set_default(subscriber), logs)
}

/// Opens a session on `store` with captured output.
pub fn memory_session(store: &Arc<MemoryStore>) -> ClientResult<(TableSession, SharedBuffer)> {
    memory_session_for(store, TABLE_ID)
}

/// Opens a session on `table_id` in `store` with captured output.
pub fn memory_session_for(
    store: &Arc<MemoryStore>,
    table_id: &str,
) -> ClientResult<(TableSession, SharedBuffer)> {
    let output = SharedBuffer::new();
    let session = TableSession::in_memory(store, table_id)?.with_output(output.clone());
    Ok((session, output))
}
