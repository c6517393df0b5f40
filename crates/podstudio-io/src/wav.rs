//! Streaming WAV file reading and writing.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavWriter};

use crate::backend::{InputStream, OutputStream};
use crate::{Error, Result, SignalSpec};

/// Returns true if `path` names a `.wav` file (case-insensitive).
pub fn is_wav_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

/// Streaming WAV reader yielding interleaved `f32`.
///
/// Integer PCM is normalised to `[-1, 1)`; float files pass through.
pub struct WavFileReader {
    reader: WavReader<BufReader<File>>,
    path: PathBuf,
    spec: SignalSpec,
    int_scale: Option<f32>,
}

impl WavFileReader {
    /// Open `path` and read its header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::SourceNotFound(path.display().to_string()));
        }
        let reader = WavReader::open(path)?;
        let header = reader.spec();
        let int_scale = match header.sample_format {
            SampleFormat::Float => None,
            SampleFormat::Int => {
                if !(8..=32).contains(&header.bits_per_sample) {
                    return Err(Error::UnsupportedFormat(format!(
                        "{}-bit integer PCM",
                        header.bits_per_sample
                    )));
                }
                Some((1i64 << (header.bits_per_sample - 1)) as f32)
            }
        };
        if header.channels == 0 {
            return Err(Error::UnsupportedFormat("zero channels".into()));
        }
        if header.sample_rate == 0 {
            return Err(Error::UnsupportedFormat("zero sample rate".into()));
        }
        tracing::debug!(
            path = %path.display(),
            sample_rate = header.sample_rate,
            channels = header.channels,
            bits = header.bits_per_sample,
            "wav opened for reading"
        );
        Ok(Self {
            spec: SignalSpec::from(header),
            reader,
            path: path.to_path_buf(),
            int_scale,
        })
    }

    /// Total frames in the file.
    pub fn frames(&self) -> u64 {
        u64::from(self.reader.duration())
    }
}

impl InputStream for WavFileReader {
    fn spec(&self) -> SignalSpec {
        self.spec
    }

    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        let mut filled = 0;
        match self.int_scale {
            None => {
                for (slot, sample) in buf.iter_mut().zip(self.reader.samples::<f32>()) {
                    *slot = sample?;
                    filled += 1;
                }
            }
            Some(scale) => {
                for (slot, sample) in buf.iter_mut().zip(self.reader.samples::<i32>()) {
                    *slot = sample? as f32 / scale;
                    filled += 1;
                }
            }
        }
        Ok(filled)
    }

    fn description(&self) -> String {
        self.path.display().to_string()
    }
}

/// Streaming WAV writer (32-bit float).
pub struct WavFileWriter {
    writer: Option<WavWriter<BufWriter<File>>>,
    path: PathBuf,
}

impl WavFileWriter {
    /// Create or truncate `path`.
    pub fn create<P: AsRef<Path>>(path: P, spec: SignalSpec) -> Result<Self> {
        let path = path.as_ref();
        let header = hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let writer = WavWriter::create(path, header)?;
        tracing::debug!(path = %path.display(), %spec, "wav opened for writing");
        Ok(Self {
            writer: Some(writer),
            path: path.to_path_buf(),
        })
    }
}

impl OutputStream for WavFileWriter {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::Stream(format!("{} already finalized", self.path.display())))?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
        }
        Ok(())
    }

    fn description(&self) -> String {
        self.path.display().to_string()
    }
}

/// Read a whole WAV file as interleaved `f32` plus its spec.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, SignalSpec)> {
    let mut reader = WavFileReader::open(path)?;
    let mut samples = Vec::new();
    let mut buf = vec![0.0; 4096];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        samples.extend_from_slice(&buf[..n]);
    }
    Ok((samples, reader.spec()))
}

/// Write interleaved `f32` samples to a 32-bit float WAV file.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: SignalSpec) -> Result<()> {
    let mut writer = WavFileWriter::create(path, spec)?;
    writer.write(samples)?;
    writer.finish()
}
