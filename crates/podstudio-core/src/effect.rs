//! Core Effect trait and the per-channel adapter used by compiled chains.
//!
//! The [`Effect`] trait is deliberately mono: one `f32` in, one `f32` out.
//! Streams deliver interleaved multi-channel buffers, so a compiled stage is a
//! [`ChannelBank`] holding one independent effect instance per channel.
//!
//! ## Design Decisions
//!
//! - **Object-safe**: stages are stored as `Box<dyn Effect + Send>` because the
//!   chain is assembled at runtime from effect names.
//! - **Constructed at rate**: effects receive their sample rate from the
//!   factory that builds them; a stage never changes rate mid-session.

/// Core trait for all audio effects.
///
/// # Example
///
/// ```rust
/// use podstudio_core::Effect;
///
/// struct Gain {
///     gain: f32,
/// }
///
/// impl Effect for Gain {
///     fn process(&mut self, input: f32) -> f32 {
///         input * self.gain
///     }
///
///     fn reset(&mut self) {}
/// }
/// ```
pub trait Effect {
    /// Process a single sample.
    ///
    /// For effects with internal state (filters, delays, etc.), this advances
    /// the state by one sample.
    fn process(&mut self, input: f32) -> f32;

    /// Process a block of samples in-place.
    ///
    /// Default implementation calls [`process()`](Self::process) for each sample.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Clear internal state (delay lines, filter history) without touching parameters.
    fn reset(&mut self);

    /// Report processing latency in samples. Default is 0.
    fn latency_samples(&self) -> usize {
        0
    }
}

/// A bank of identical mono effects, one per interleaved channel.
///
/// Channel `c` of every frame is routed through instance `c`, so stateful
/// effects (delays, filters) never bleed between channels.
pub struct ChannelBank {
    instances: Vec<Box<dyn Effect + Send>>,
}

impl ChannelBank {
    /// Create a bank from per-channel instances.
    ///
    /// The number of instances fixes the channel count.
    pub fn new(instances: Vec<Box<dyn Effect + Send>>) -> Self {
        Self { instances }
    }

    /// Number of channels this bank expects per frame.
    pub fn channels(&self) -> usize {
        self.instances.len()
    }

    /// Process an interleaved buffer in place.
    ///
    /// A trailing partial frame is processed channel by channel as far as it goes.
    pub fn process_interleaved(&mut self, buffer: &mut [f32]) {
        let channels = self.instances.len();
        if channels == 0 {
            return;
        }
        if channels == 1 {
            self.instances[0].process_block_inplace(buffer);
            return;
        }
        for frame in buffer.chunks_mut(channels) {
            for (sample, effect) in frame.iter_mut().zip(self.instances.iter_mut()) {
                *sample = effect.process(*sample);
            }
        }
    }

    /// Reset every channel's instance.
    pub fn reset(&mut self) {
        for effect in &mut self.instances {
            effect.reset();
        }
    }

    /// Latency of the bank (all channels are identical).
    pub fn latency_samples(&self) -> usize {
        self.instances
            .first()
            .map(|e| e.latency_samples())
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for ChannelBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelBank")
            .field("channels", &self.instances.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Gain(f32);

    impl Effect for Gain {
        fn process(&mut self, input: f32) -> f32 {
            input * self.0
        }
        fn reset(&mut self) {}
    }

    /// Remembers the previous sample; exposes channel bleed if instances were shared.
    struct OneSampleDelay(f32);

    impl Effect for OneSampleDelay {
        fn process(&mut self, input: f32) -> f32 {
            std::mem::replace(&mut self.0, input)
        }
        fn reset(&mut self) {
            self.0 = 0.0;
        }
    }

    #[test]
    fn test_block_default_uses_process() {
        let mut gain = Gain(2.0);
        let mut buffer = [1.0, 2.0, 3.0];
        gain.process_block_inplace(&mut buffer);
        assert_eq!(buffer, [2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_bank_routes_channels_independently() {
        let mut bank = ChannelBank::new(vec![
            Box::new(OneSampleDelay(0.0)),
            Box::new(OneSampleDelay(0.0)),
        ]);
        // L: 1, 3  R: 2, 4
        let mut buffer = [1.0, 2.0, 3.0, 4.0];
        bank.process_interleaved(&mut buffer);
        assert_eq!(buffer, [0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_bank_reset() {
        let mut bank = ChannelBank::new(vec![Box::new(OneSampleDelay(0.0))]);
        let mut buffer = [5.0];
        bank.process_interleaved(&mut buffer);
        bank.reset();
        let mut buffer = [7.0];
        bank.process_interleaved(&mut buffer);
        assert_eq!(buffer, [0.0]);
    }

    #[test]
    fn test_empty_bank_is_passthrough() {
        let mut bank = ChannelBank::new(Vec::new());
        let mut buffer = [0.5, 0.25];
        bank.process_interleaved(&mut buffer);
        assert_eq!(buffer, [0.5, 0.25]);
        assert_eq!(bank.channels(), 0);
        assert_eq!(bank.latency_samples(), 0);
    }
}
