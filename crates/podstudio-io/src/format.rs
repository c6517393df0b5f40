/// Sample format negotiated between an input stream and an output device.
///
/// Samples are always `f32` and interleaved; only the rate and channel count
/// travel between streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalSpec {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
}

impl SignalSpec {
    /// Create a spec.
    pub const fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Number of interleaved samples in `frames` frames.
    pub const fn samples_for(&self, frames: usize) -> usize {
        frames * self.channels as usize
    }
}

impl Default for SignalSpec {
    fn default() -> Self {
        Self::new(48000, 2)
    }
}

impl std::fmt::Display for SignalSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Hz, {} ch", self.sample_rate, self.channels)
    }
}

impl From<hound::WavSpec> for SignalSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self::new(spec.sample_rate, spec.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_for() {
        assert_eq!(SignalSpec::new(44100, 2).samples_for(512), 1024);
        assert_eq!(SignalSpec::new(8000, 1).to_string(), "8000 Hz, 1 ch");
    }
}
