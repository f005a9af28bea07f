//! Shared output sinks for the two physical streams.
//!
//! A [`SinkRegistry`] is created once at startup and passed to every logger
//! constructor. It creates exactly one [`SharedSink`] per stream, lazily, on the
//! first logger construction; concurrent first callers block until it is done.
//! Each sink serializes writes so that records from different threads never
//! interleave.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::debug;

/// A physical output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Synchronized writer handle. Clones share the same underlying writer.
#[derive(Clone)]
pub struct SharedSink {
    stream: Stream,
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl SharedSink {
    pub fn new(stream: Stream, writer: Box<dyn Write + Send>) -> Self {
        Self {
            stream,
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn stream(&self) -> Stream {
        self.stream
    }

    /// Writes one complete record under the sink lock.
    pub fn write_record(&self, record: &[u8]) -> io::Result<()> {
        let mut writer = self.writer.lock();
        writer.write_all(record)?;
        writer.flush()
    }

    /// Whether both handles refer to the same underlying writer.
    pub fn same_as(&self, other: &SharedSink) -> bool {
        Arc::ptr_eq(&self.writer, &other.writer)
    }
}

impl fmt::Debug for SharedSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSink")
            .field("stream", &self.stream)
            .finish_non_exhaustive()
    }
}

/// The pair of sinks owned by a registry.
#[derive(Debug, Clone)]
pub struct StdSinks {
    pub out: SharedSink,
    pub err: SharedSink,
}

type WriterFactory = Box<dyn Fn(Stream) -> Box<dyn Write + Send> + Send + Sync>;

/// Owner of the process-wide stdout/stderr sinks.
pub struct SinkRegistry {
    factory: WriterFactory,
    sinks: OnceCell<StdSinks>,
}

impl SinkRegistry {
    /// Sinks over the process standard output and standard error.
    pub fn stdio() -> Self {
        Self::from_factory(|stream| -> Box<dyn Write + Send> {
            match stream {
                Stream::Stdout => Box::new(io::stdout()),
                Stream::Stderr => Box::new(io::stderr()),
            }
        })
    }

    /// Sinks built by `factory`, which is called once per stream on first use.
    pub fn from_factory<F>(factory: F) -> Self
    where
        F: Fn(Stream) -> Box<dyn Write + Send> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            sinks: OnceCell::new(),
        }
    }

    /// Sinks over caller-supplied writers, e.g. in-memory buffers.
    pub fn with_writers<O, E>(out: O, err: E) -> Self
    where
        O: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        let out: Mutex<Option<Box<dyn Write + Send>>> = Mutex::new(Some(Box::new(out)));
        let err: Mutex<Option<Box<dyn Write + Send>>> = Mutex::new(Some(Box::new(err)));
        Self::from_factory(move |stream| {
            let slot = match stream {
                Stream::Stdout => &out,
                Stream::Stderr => &err,
            };
            slot.lock()
                .take()
                .unwrap_or_else(|| -> Box<dyn Write + Send> { Box::new(io::sink()) })
        })
    }

    /// The shared sinks, created on the first call.
    pub fn sinks(&self) -> &StdSinks {
        self.sinks.get_or_init(|| {
            debug!("creating shared stdout/stderr sinks");
            StdSinks {
                out: SharedSink::new(Stream::Stdout, (self.factory)(Stream::Stdout)),
                err: SharedSink::new(Stream::Stderr, (self.factory)(Stream::Stderr)),
            }
        })
    }

    /// Whether the sinks have been created yet.
    pub fn is_initialized(&self) -> bool {
        self.sinks.get().is_some()
    }
}

impl fmt::Debug for SinkRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkRegistry")
            .field("sinks", &self.sinks.get())
            .finish_non_exhaustive()
    }
}

/// Growable in-memory writer whose clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl BufferWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
