use crate::sink::LogSink;
use std::io;

/// A sink that simply drops all records.
///
/// Useful for measuring the overhead of the handler chain itself without
/// any I/O, and for tests that don't care about output.
#[derive(Clone, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn write_record(&self, _bytes: &[u8]) -> io::Result<()> {
        Ok(())
    }
}
