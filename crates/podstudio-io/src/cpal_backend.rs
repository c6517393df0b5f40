//! cpal-based audio backend implementation.
//!
//! [`CpalBackend`] reads sources as WAV files and plays to a system output
//! device through [cpal](https://crates.io/crates/cpal). A device string that
//! ends in `.wav` renders to that file instead, which gives an offline bounce
//! through the same chain.
//!
//! ## Device output
//!
//! The streaming worker and the cpal callback meet at a bounded
//! `crossbeam-channel` queue of sample buffers:
//!
//! ```text
//! worker ──write()──▶ [buf][buf][buf][buf] ──callback──▶ device
//!            blocks when full            zero-fills on underrun
//! ```
//!
//! The queue depth bounds latency and paces the worker at the device rate.
//! Device errors are reported through a shared slot that fails the next
//! `write`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, SendTimeoutError, Sender, TryRecvError, bounded};
use parking_lot::Mutex;

use crate::backend::{AudioBackend, AudioDevice, DEFAULT_DEVICE, InputStream, OutputStream};
use crate::wav::{WavFileReader, WavFileWriter, is_wav_path};
use crate::{Error, Result, SignalSpec};

/// How long a blocked `write` waits between checks of the error slot.
const SEND_POLL: Duration = Duration::from_millis(50);

/// Extra time `finish` allows beyond the queued audio before giving up.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

pub(crate) fn device_name(device: &cpal::Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Queue tuning for device output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpalOptions {
    /// Buffers that may wait between the worker and the device callback.
    pub queue_depth: usize,
}

impl Default for CpalOptions {
    fn default() -> Self {
        Self { queue_depth: 4 }
    }
}

/// cpal-based audio backend.
///
/// Holds no host handle; the platform default host is looked up per call so
/// the backend stays `Send + Sync` on every platform.
#[derive(Debug, Clone, Default)]
pub struct CpalBackend {
    options: CpalOptions,
}

impl CpalBackend {
    /// Create a new cpal backend using the platform's default audio host.
    pub fn new(options: CpalOptions) -> Self {
        tracing::info!(
            host = cpal::default_host().id().name(),
            queue_depth = options.queue_depth,
            "cpal backend initialized"
        );
        Self { options }
    }

    /// Find an output device by exact name, then by case-insensitive substring.
    fn find_output_device(&self, name: &str) -> Result<cpal::Device> {
        let host = cpal::default_host();
        if name == DEFAULT_DEVICE {
            return host.default_output_device().ok_or(Error::NoDevice);
        }
        let mut devices: Vec<(String, cpal::Device)> = host
            .output_devices()
            .map_err(|e| Error::Stream(e.to_string()))?
            .filter_map(|device| device_name(&device).ok().map(|n| (n, device)))
            .collect();

        let search_lower = name.to_lowercase();
        let position = devices
            .iter()
            .position(|(n, _)| n == name)
            .or_else(|| {
                devices
                    .iter()
                    .position(|(n, _)| n.to_lowercase().contains(&search_lower))
            });
        position
            .map(|index| devices.swap_remove(index).1)
            .ok_or_else(|| Error::DeviceNotFound(format!("no output device matching '{name}'")))
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &'static str {
        "cpal"
    }

    fn open_read(&self, source: &str) -> Result<Box<dyn InputStream>> {
        Ok(Box::new(WavFileReader::open(source)?))
    }

    fn open_write(&self, device: &str, spec: SignalSpec) -> Result<Box<dyn OutputStream>> {
        if is_wav_path(device) {
            return Ok(Box::new(WavFileWriter::create(device, spec)?));
        }
        let cpal_device = self.find_output_device(device)?;
        let label = device_name(&cpal_device).unwrap_or_else(|_| device.to_string());
        Ok(Box::new(DeviceOutput::start(
            &cpal_device,
            label,
            spec,
            self.options,
        )?))
    }

    fn output_devices(&self) -> Result<Vec<AudioDevice>> {
        let host = cpal::default_host();
        let default_name = host
            .default_output_device()
            .and_then(|d| device_name(&d).ok());
        let devices = host
            .output_devices()
            .map_err(|e| Error::Stream(e.to_string()))?
            .filter_map(|device| {
                let name = device_name(&device).ok()?;
                let default_sample_rate = device
                    .default_output_config()
                    .map(|c| c.sample_rate())
                    .ok();
                Some(AudioDevice {
                    is_default: default_name.as_deref() == Some(name.as_str()),
                    name,
                    default_sample_rate,
                })
            })
            .collect();
        Ok(devices)
    }
}

/// State shared between the writer and the cpal callback.
struct Shared {
    /// Samples written but not yet handed to the device.
    pending: AtomicUsize,
    /// First device error reported by cpal.
    error: Mutex<Option<String>>,
}

/// Callback-side cursor over queued buffers.
struct Feeder {
    rx: Receiver<Vec<f32>>,
    current: Vec<f32>,
    pos: usize,
    shared: Arc<Shared>,
}

impl Feeder {
    fn fill(&mut self, data: &mut [f32]) {
        let mut written = 0;
        while written < data.len() {
            if self.pos == self.current.len() {
                match self.rx.try_recv() {
                    Ok(next) => {
                        self.current = next;
                        self.pos = 0;
                        continue;
                    }
                    Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
                }
            }
            let n = (self.current.len() - self.pos).min(data.len() - written);
            data[written..written + n].copy_from_slice(&self.current[self.pos..self.pos + n]);
            self.pos += n;
            written += n;
        }
        data[written..].fill(0.0);
        if written > 0 {
            self.shared.pending.fetch_sub(written, Ordering::AcqRel);
        }
    }
}

/// Writer side of the device queue.
struct FeedQueue {
    tx: Sender<Vec<f32>>,
    shared: Arc<Shared>,
    label: String,
}

impl FeedQueue {
    fn check_error(&self) -> Result<()> {
        match self.shared.error.lock().as_ref() {
            Some(msg) => Err(Error::Stream(format!("{}: {msg}", self.label))),
            None => Ok(()),
        }
    }

    /// Queue a copy of `samples`, blocking while the queue is full.
    ///
    /// `pending` counts the samples only while they are queued; a failed
    /// send takes them back off.
    fn push(&self, samples: &[f32]) -> Result<()> {
        self.check_error()?;
        if samples.is_empty() {
            return Ok(());
        }
        self.shared.pending.fetch_add(samples.len(), Ordering::AcqRel);
        let result = self.send(samples.to_vec());
        if result.is_err() {
            self.shared.pending.fetch_sub(samples.len(), Ordering::AcqRel);
        }
        result
    }

    fn send(&self, mut buf: Vec<f32>) -> Result<()> {
        loop {
            match self.tx.send_timeout(buf, SEND_POLL) {
                Ok(()) => return Ok(()),
                Err(SendTimeoutError::Timeout(back)) => {
                    self.check_error()?;
                    buf = back;
                }
                Err(SendTimeoutError::Disconnected(_)) => {
                    return Err(Error::Stream(format!("{}: device stream closed", self.label)));
                }
            }
        }
    }
}

/// Output stream feeding a live cpal device.
pub struct DeviceOutput {
    queue: FeedQueue,
    spec: SignalSpec,
    _stream: cpal::Stream,
}

impl DeviceOutput {
    fn start(
        device: &cpal::Device,
        label: String,
        spec: SignalSpec,
        options: CpalOptions,
    ) -> Result<Self> {
        let (tx, rx) = bounded(options.queue_depth.max(1));
        let shared = Arc::new(Shared {
            pending: AtomicUsize::new(0),
            error: Mutex::new(None),
        });
        let mut feeder = Feeder {
            rx,
            current: Vec::new(),
            pos: 0,
            shared: Arc::clone(&shared),
        };
        let error_slot = Arc::clone(&shared);

        let stream_config = cpal::StreamConfig {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    feeder.fill(data);
                },
                move |err| {
                    let mut slot = error_slot.error.lock();
                    if slot.is_none() {
                        *slot = Some(err.to_string());
                    }
                },
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(device = %label, %spec, "output stream started");

        Ok(Self {
            queue: FeedQueue { tx, shared, label },
            spec,
            _stream: stream,
        })
    }
}

impl OutputStream for DeviceOutput {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        self.queue.push(samples)
    }

    fn finish(&mut self) -> Result<()> {
        let shared = &self.queue.shared;
        let pending = shared.pending.load(Ordering::Acquire);
        let rate = u64::from(self.spec.sample_rate) * u64::from(self.spec.channels.max(1));
        let audio = Duration::from_millis(pending as u64 * 1000 / rate.max(1));
        let deadline = Instant::now() + audio + DRAIN_GRACE;
        while shared.pending.load(Ordering::Acquire) > 0 {
            self.queue.check_error()?;
            if Instant::now() >= deadline {
                tracing::warn!(device = %self.queue.label, "output drain timed out");
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        self.queue.check_error()
    }

    fn description(&self) -> String {
        self.queue.label.clone()
    }
}
