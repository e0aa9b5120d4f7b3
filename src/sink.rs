use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// Destination for encoded records.
///
/// Encoding handlers format a whole record into a buffer and pass it to
/// `write_record` in one call. Implementations shared between threads must
/// make that call atomic so records never interleave.
pub trait LogSink: Send + Sync {
    /// Write one encoded record, trailing newline included.
    ///
    /// **Returns**
    /// - `Ok(())` if every byte was accepted.
    /// - `Err(..)` if the destination failed; the error reaches the caller
    ///   of `handle` without retries.
    fn write_record(&self, bytes: &[u8]) -> io::Result<()>;

    /// Flush any buffered output. Default implementation is a no-op.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Poisoned only if another thread panicked mid-write; keep logging.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// [`LogSink`] over any [`Write`], serialized by a mutex.
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        WriterSink { writer: Mutex::new(writer) }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        WriterSink::new(io::stdout())
    }
}

impl WriterSink<io::Stderr> {
    pub fn stderr() -> Self {
        WriterSink::new(io::stderr())
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn write_record(&self, bytes: &[u8]) -> io::Result<()> {
        lock(&self.writer).write_all(bytes)
    }

    fn flush(&self) -> io::Result<()> {
        lock(&self.writer).flush()
    }
}

/// Sink that keeps everything in memory, for tests and inspection.
#[derive(Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&lock(&self.buf)).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        lock(&self.buf).clear();
    }
}

impl LogSink for MemorySink {
    fn write_record(&self, bytes: &[u8]) -> io::Result<()> {
        lock(&self.buf).extend_from_slice(bytes);
        Ok(())
    }
}
