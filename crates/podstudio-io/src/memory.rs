//! In-memory audio backend.
//!
//! [`MemoryBackend`] serves named sample buffers as sources and records
//! whatever is written to its devices. It also counts live stream handles and
//! can inject failures, which makes it the backend of choice for exercising
//! the playback engine without sound hardware.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::backend::{AudioBackend, AudioDevice, DEFAULT_DEVICE, InputStream, OutputStream};
use crate::{Error, Result, SignalSpec};

/// Most samples a capture keeps; later writes are only counted.
const CAPTURE_LIMIT: usize = 1 << 22;

#[derive(Clone)]
struct Source {
    spec: SignalSpec,
    samples: Arc<[f32]>,
    endless: bool,
    fail_after: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
enum WriteFailure {
    Open,
    After(usize),
}

/// What a device received during its most recent session.
#[derive(Debug, Clone, Default)]
pub struct Capture {
    /// Spec the device was opened with.
    pub spec: SignalSpec,
    /// Received samples, up to an internal cap.
    pub samples: Vec<f32>,
    /// Total samples received, including any past the cap.
    pub written: usize,
    /// Whether `finish` was called.
    pub finished: bool,
}

#[derive(Default)]
struct Shared {
    sources: Mutex<HashMap<String, Source>>,
    devices: Mutex<Vec<String>>,
    captures: Mutex<HashMap<String, Arc<Mutex<Capture>>>>,
    write_failures: Mutex<HashMap<String, WriteFailure>>,
    write_delay: Mutex<Option<Duration>>,
    open_inputs: AtomicUsize,
    open_outputs: AtomicUsize,
}

/// In-memory audio backend.
///
/// Cloning yields another handle to the same sources, devices and counters.
///
/// # Example
///
/// ```rust
/// use podstudio_io::{AudioBackend, MemoryBackend, SignalSpec};
///
/// let backend = MemoryBackend::new();
/// backend.add_source("tone", SignalSpec::new(8000, 1), vec![0.5; 16]);
///
/// let mut input = backend.open_read("tone").unwrap();
/// let mut output = backend.open_write("default", input.spec()).unwrap();
/// let mut buf = [0.0; 8];
/// while let Ok(n @ 1..) = input.read(&mut buf) {
///     output.write(&buf[..n]).unwrap();
/// }
/// output.finish().unwrap();
/// assert_eq!(backend.captured("default").unwrap().written, 16);
/// ```
#[derive(Clone)]
pub struct MemoryBackend {
    shared: Arc<Shared>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("open_inputs", &self.open_inputs())
            .field("open_outputs", &self.open_outputs())
            .finish_non_exhaustive()
    }
}

impl MemoryBackend {
    /// Create a backend with one device, `"default"`.
    pub fn new() -> Self {
        let shared = Shared::default();
        shared.devices.lock().push(DEFAULT_DEVICE.to_string());
        Self {
            shared: Arc::new(shared),
        }
    }

    /// Register a finite source.
    pub fn add_source(&self, name: &str, spec: SignalSpec, samples: Vec<f32>) {
        self.insert_source(name, spec, samples, false);
    }

    /// Register a source that repeats `pattern` forever (silence if empty).
    pub fn add_endless_source(&self, name: &str, spec: SignalSpec, pattern: Vec<f32>) {
        self.insert_source(name, spec, pattern, true);
    }

    fn insert_source(&self, name: &str, spec: SignalSpec, samples: Vec<f32>, endless: bool) {
        self.shared.sources.lock().insert(
            name.to_string(),
            Source {
                spec,
                samples: samples.into(),
                endless,
                fail_after: None,
            },
        );
    }

    /// Make reads from `source` fail once `samples` samples have been read.
    pub fn fail_reads_after(&self, source: &str, samples: usize) {
        if let Some(entry) = self.shared.sources.lock().get_mut(source) {
            entry.fail_after = Some(samples);
        }
    }

    /// Add another output device.
    pub fn add_device(&self, name: &str) {
        let mut devices = self.shared.devices.lock();
        if !devices.iter().any(|d| d == name) {
            devices.push(name.to_string());
        }
    }

    /// Make `open_write` on `device` fail.
    pub fn fail_open_write(&self, device: &str) {
        self.shared
            .write_failures
            .lock()
            .insert(device.to_string(), WriteFailure::Open);
    }

    /// Make writes to `device` fail once `samples` samples have been accepted.
    pub fn fail_writes_after(&self, device: &str, samples: usize) {
        self.shared
            .write_failures
            .lock()
            .insert(device.to_string(), WriteFailure::After(samples));
    }

    /// Sleep this long in every `write`, approximating a real-time device.
    pub fn set_write_delay(&self, delay: Duration) {
        *self.shared.write_delay.lock() = Some(delay);
    }

    /// Snapshot of the latest session on `device`.
    pub fn captured(&self, device: &str) -> Option<Capture> {
        self.shared
            .captures
            .lock()
            .get(device)
            .map(|c| c.lock().clone())
    }

    /// Live input handles.
    pub fn open_inputs(&self) -> usize {
        self.shared.open_inputs.load(Ordering::Acquire)
    }

    /// Live output handles.
    pub fn open_outputs(&self) -> usize {
        self.shared.open_outputs.load(Ordering::Acquire)
    }
}

impl AudioBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn open_read(&self, source: &str) -> Result<Box<dyn InputStream>> {
        let entry = self
            .shared
            .sources
            .lock()
            .get(source)
            .cloned()
            .ok_or_else(|| Error::SourceNotFound(source.to_string()))?;
        self.shared.open_inputs.fetch_add(1, Ordering::AcqRel);
        Ok(Box::new(MemoryInput {
            name: source.to_string(),
            source: entry,
            pos: 0,
            shared: Arc::clone(&self.shared),
        }))
    }

    fn open_write(&self, device: &str, spec: SignalSpec) -> Result<Box<dyn OutputStream>> {
        if !self.shared.devices.lock().iter().any(|d| d == device) {
            return Err(Error::DeviceNotFound(device.to_string()));
        }
        let failure = self.shared.write_failures.lock().get(device).copied();
        let fail_after = match failure {
            Some(WriteFailure::Open) => {
                return Err(Error::Stream(format!("{device}: injected open failure")));
            }
            Some(WriteFailure::After(n)) => Some(n),
            None => None,
        };
        let capture = Arc::new(Mutex::new(Capture {
            spec,
            ..Capture::default()
        }));
        self.shared
            .captures
            .lock()
            .insert(device.to_string(), Arc::clone(&capture));
        self.shared.open_outputs.fetch_add(1, Ordering::AcqRel);
        Ok(Box::new(MemoryOutput {
            device: device.to_string(),
            capture,
            fail_after,
            delay: *self.shared.write_delay.lock(),
            shared: Arc::clone(&self.shared),
        }))
    }

    fn output_devices(&self) -> Result<Vec<AudioDevice>> {
        Ok(self
            .shared
            .devices
            .lock()
            .iter()
            .map(|name| AudioDevice {
                name: name.clone(),
                is_default: name == DEFAULT_DEVICE,
                default_sample_rate: None,
            })
            .collect())
    }
}

struct MemoryInput {
    name: String,
    source: Source,
    pos: usize,
    shared: Arc<Shared>,
}

impl InputStream for MemoryInput {
    fn spec(&self) -> SignalSpec {
        self.source.spec
    }

    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        if self.source.fail_after.is_some_and(|n| self.pos >= n) {
            return Err(Error::Stream(format!("{}: injected read failure", self.name)));
        }
        let data = &self.source.samples;
        let n = if self.source.endless {
            if data.is_empty() {
                buf.fill(0.0);
            } else {
                for (i, slot) in buf.iter_mut().enumerate() {
                    *slot = data[(self.pos + i) % data.len()];
                }
            }
            buf.len()
        } else {
            let n = data.len().saturating_sub(self.pos).min(buf.len());
            buf[..n].copy_from_slice(&data[self.pos..self.pos + n]);
            n
        };
        self.pos += n;
        Ok(n)
    }

    fn description(&self) -> String {
        format!("memory:{}", self.name)
    }
}

impl Drop for MemoryInput {
    fn drop(&mut self) {
        self.shared.open_inputs.fetch_sub(1, Ordering::AcqRel);
    }
}

struct MemoryOutput {
    device: String,
    capture: Arc<Mutex<Capture>>,
    fail_after: Option<usize>,
    delay: Option<Duration>,
    shared: Arc<Shared>,
}

impl OutputStream for MemoryOutput {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let mut capture = self.capture.lock();
        if self
            .fail_after
            .is_some_and(|n| capture.written + samples.len() > n)
        {
            return Err(Error::Stream(format!(
                "{}: injected write failure",
                self.device
            )));
        }
        let room = CAPTURE_LIMIT.saturating_sub(capture.samples.len());
        capture
            .samples
            .extend_from_slice(&samples[..samples.len().min(room)]);
        capture.written += samples.len();
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.capture.lock().finished = true;
        Ok(())
    }

    fn description(&self) -> String {
        format!("memory:{}", self.device)
    }
}

impl Drop for MemoryOutput {
    fn drop(&mut self) {
        self.shared.open_outputs.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONO: SignalSpec = SignalSpec::new(8000, 1);

    #[test]
    fn test_finite_source_then_eof() {
        let backend = MemoryBackend::new();
        backend.add_source("s", MONO, vec![1.0, 2.0, 3.0]);
        let mut input = backend.open_read("s").unwrap();
        let mut buf = [0.0; 2];
        assert_eq!(input.read(&mut buf).unwrap(), 2);
        assert_eq!(input.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 3.0);
        assert_eq!(input.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_endless_source_cycles() {
        let backend = MemoryBackend::new();
        backend.add_endless_source("loop", MONO, vec![1.0, -1.0]);
        let mut input = backend.open_read("loop").unwrap();
        let mut buf = [0.0; 5];
        assert_eq!(input.read(&mut buf).unwrap(), 5);
        assert_eq!(buf, [1.0, -1.0, 1.0, -1.0, 1.0]);
        input.read(&mut buf).unwrap();
        assert_eq!(buf[0], -1.0);
    }

    #[test]
    fn test_handles_are_counted() {
        let backend = MemoryBackend::new();
        backend.add_source("s", MONO, vec![]);
        let input = backend.open_read("s").unwrap();
        let output = backend.open_write("default", MONO).unwrap();
        assert_eq!((backend.open_inputs(), backend.open_outputs()), (1, 1));
        drop(input);
        drop(output);
        assert_eq!((backend.open_inputs(), backend.open_outputs()), (0, 0));
    }

    #[test]
    fn test_unknown_source_and_device() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            backend.open_read("nope").err(),
            Some(Error::SourceNotFound(_))
        ));
        assert!(matches!(
            backend.open_write("speakers", MONO).err(),
            Some(Error::DeviceNotFound(_))
        ));
        assert_eq!(backend.open_outputs(), 0);
    }

    #[test]
    fn test_injected_failures() {
        let backend = MemoryBackend::new();
        backend.add_source("s", MONO, vec![0.0; 10]);
        backend.fail_reads_after("s", 4);
        backend.add_device("flaky");
        backend.fail_writes_after("flaky", 3);
        backend.add_device("dead");
        backend.fail_open_write("dead");

        let mut input = backend.open_read("s").unwrap();
        let mut buf = [0.0; 4];
        assert_eq!(input.read(&mut buf).unwrap(), 4);
        assert!(input.read(&mut buf).is_err());

        let mut out = backend.open_write("flaky", MONO).unwrap();
        out.write(&[0.0; 3]).unwrap();
        assert!(out.write(&[0.0]).is_err());

        assert!(backend.open_write("dead", MONO).is_err());
        assert_eq!(backend.open_outputs(), 1);
    }

    #[test]
    fn test_capture_records_session() {
        let backend = MemoryBackend::new();
        let mut out = backend.open_write("default", MONO).unwrap();
        out.write(&[0.5, 0.25]).unwrap();
        out.finish().unwrap();
        let capture = backend.captured("default").unwrap();
        assert_eq!(capture.samples, vec![0.5, 0.25]);
        assert!(capture.finished);
        assert_eq!(capture.spec, MONO);

        let devices = backend.output_devices().unwrap();
        assert_eq!(devices.len(), 1);
        assert!(devices[0].is_default);
    }
}
