//! Small DSP building blocks shared by the built-in effects.

/// Flush values too small to matter to zero so feedback loops never stall
/// on denormal arithmetic.
#[inline]
pub(crate) fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Fixed-length circular delay line.
#[derive(Debug, Clone)]
pub(crate) struct DelayLine {
    buffer: Vec<f32>,
    pos: usize,
}

impl DelayLine {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len.max(1)],
            pos: 0,
        }
    }

    /// Oldest sample in the line (delayed by the full length).
    #[inline]
    pub(crate) fn read(&self) -> f32 {
        self.buffer[self.pos]
    }

    /// Overwrite the oldest sample and advance.
    #[inline]
    pub(crate) fn write(&mut self, value: f32) {
        self.buffer[self.pos] = value;
        self.pos = (self.pos + 1) % self.buffer.len();
    }

    pub(crate) fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

/// One-pole lowpass, `y += a * (x - y)`.
#[derive(Debug, Clone)]
pub(crate) struct OnePole {
    coeff: f32,
    state: f32,
}

impl OnePole {
    pub(crate) fn new(sample_rate: f32, cutoff_hz: f32) -> Self {
        let nyquist = sample_rate * 0.5;
        // Ordered so a sub-2 Hz rate cannot invert the bounds.
        let fc = cutoff_hz.max(1.0).min(nyquist * 0.99);
        let coeff = 1.0 - (-std::f32::consts::TAU * fc / sample_rate).exp();
        Self { coeff, state: 0.0 }
    }

    #[inline]
    pub(crate) fn process(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(self.state + self.coeff * (input - self.state));
        self.state
    }

    pub(crate) fn reset(&mut self) {
        self.state = 0.0;
    }
}

/// Feedback comb with a damping lowpass in the loop.
#[derive(Debug, Clone)]
pub(crate) struct Comb {
    delay: DelayLine,
    feedback: f32,
    damp: f32,
    store: f32,
}

impl Comb {
    pub(crate) fn new(len: usize, feedback: f32, damp: f32) -> Self {
        Self {
            delay: DelayLine::new(len),
            feedback: feedback.clamp(0.0, 0.99),
            damp: damp.clamp(0.0, 1.0),
            store: 0.0,
        }
    }

    #[inline]
    pub(crate) fn process(&mut self, input: f32) -> f32 {
        let output = self.delay.read();
        self.store = flush_denormal(output * (1.0 - self.damp) + self.store * self.damp);
        self.delay.write(input + self.store * self.feedback);
        output
    }

    pub(crate) fn clear(&mut self) {
        self.delay.clear();
        self.store = 0.0;
    }
}

/// Schroeder allpass used for diffusion.
#[derive(Debug, Clone)]
pub(crate) struct Allpass {
    delay: DelayLine,
    feedback: f32,
}

impl Allpass {
    pub(crate) fn new(len: usize, feedback: f32) -> Self {
        Self {
            delay: DelayLine::new(len),
            feedback: feedback.clamp(-0.99, 0.99),
        }
    }

    #[inline]
    pub(crate) fn process(&mut self, input: f32) -> f32 {
        let delayed = self.delay.read();
        let output = delayed - input;
        self.delay.write(flush_denormal(input + delayed * self.feedback));
        output
    }

    pub(crate) fn clear(&mut self) {
        self.delay.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_line_delays_by_length() {
        let mut line = DelayLine::new(3);
        let mut out = Vec::new();
        for x in [1.0, 2.0, 3.0, 4.0, 5.0] {
            out.push(line.read());
            line.write(x);
        }
        assert_eq!(out, vec![0.0, 0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_one_pole_converges_to_dc() {
        let mut lp = OnePole::new(48000.0, 1000.0);
        let mut y = 0.0;
        for _ in 0..48000 {
            y = lp.process(1.0);
        }
        assert!((y - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_one_pole_at_tiny_sample_rates() {
        for rate in [1.0, 1.5, 2.0, 3.0] {
            let mut lp = OnePole::new(rate, 20000.0);
            let y = lp.process(1.0);
            assert!(y.is_finite() && (0.0..=1.0).contains(&y), "rate {rate}: {y}");
        }
    }

    #[test]
    fn test_comb_echo_decays() {
        let mut comb = Comb::new(10, 0.8, 0.0);
        comb.process(1.0);
        let mut peaks = Vec::new();
        for i in 1..60 {
            let y = comb.process(0.0);
            if i % 10 == 0 {
                peaks.push(y.abs());
            }
        }
        assert!(peaks[0] > 0.9);
        assert!(peaks.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_allpass_clear_silences() {
        let mut ap = Allpass::new(8, 0.5);
        for _ in 0..32 {
            ap.process(1.0);
        }
        ap.clear();
        for _ in 0..16 {
            assert_eq!(ap.process(0.0), 0.0);
        }
    }
}
