//! Built-in effect implementations and their factories.
//!
//! Every effect here is mono; the registry wraps one instance per channel in
//! a [`ChannelBank`](podstudio_core::ChannelBank).

use podstudio_core::{Effect, EffectArgsError};

use crate::args::{EffectArgs, db_to_linear};
use crate::dsp::{Allpass, Comb, DelayLine, OnePole, flush_denormal};

/// Boxed effect as produced by a factory.
pub type BoxedEffect = Box<dyn Effect + Send>;

/// Fixed gain stage, shared by `vol` and `gain`.
#[derive(Debug, Clone)]
pub struct Volume {
    gain: f32,
}

impl Volume {
    /// Create with a linear gain factor.
    pub fn new(gain: f32) -> Self {
        Self { gain }
    }

    /// Linear gain applied to every sample.
    pub fn gain(&self) -> f32 {
        self.gain
    }
}

impl Effect for Volume {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        input * self.gain
    }

    fn reset(&mut self) {}
}

/// One-pole low or high pass.
#[derive(Debug, Clone)]
pub struct OnePoleFilter {
    lowpass: OnePole,
    highpass: bool,
}

impl OnePoleFilter {
    /// Lowpass at `cutoff_hz`.
    pub fn lowpass(sample_rate: f32, cutoff_hz: f32) -> Self {
        Self {
            lowpass: OnePole::new(sample_rate, cutoff_hz),
            highpass: false,
        }
    }

    /// Highpass at `cutoff_hz` (input minus its lowpassed copy).
    pub fn highpass(sample_rate: f32, cutoff_hz: f32) -> Self {
        Self {
            lowpass: OnePole::new(sample_rate, cutoff_hz),
            highpass: true,
        }
    }
}

impl Effect for OnePoleFilter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let low = self.lowpass.process(input);
        if self.highpass { input - low } else { low }
    }

    fn reset(&mut self) {
        self.lowpass.reset();
    }
}

/// Feedback echo.
#[derive(Debug, Clone)]
pub struct Echo {
    line: DelayLine,
    decay: f32,
    mix: f32,
}

impl Echo {
    /// Create an echo with `delay_ms`, feedback `decay` and wet `mix`.
    pub fn new(sample_rate: f32, delay_ms: f32, decay: f32, mix: f32) -> Self {
        let len = (delay_ms * 0.001 * sample_rate).round() as usize;
        Self {
            line: DelayLine::new(len),
            decay,
            mix,
        }
    }
}

impl Effect for Echo {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let delayed = self.line.read();
        self.line.write(flush_denormal(input + delayed * self.decay));
        input * (1.0 - self.mix) + delayed * self.mix
    }

    fn reset(&mut self) {
        self.line.clear();
    }
}

/// Sine amplitude modulation.
#[derive(Debug, Clone)]
pub struct Tremolo {
    phase: f32,
    increment: f32,
    depth: f32,
}

impl Tremolo {
    /// Create with LFO `speed_hz` and `depth` in `0..=1`.
    pub fn new(sample_rate: f32, speed_hz: f32, depth: f32) -> Self {
        Self {
            phase: 0.0,
            increment: speed_hz / sample_rate.max(1.0),
            depth,
        }
    }
}

impl Effect for Tremolo {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let lfo = 0.5 * (1.0 + (std::f32::consts::TAU * self.phase).sin());
        self.phase = (self.phase + self.increment).fract();
        input * (1.0 - self.depth * lfo)
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Comb tunings in samples at 44.1 kHz (Freeverb).
const COMB_TUNING: [usize; 4] = [1116, 1188, 1277, 1356];
const ALLPASS_TUNING: [usize; 2] = [556, 441];

/// Schroeder/Freeverb-style reverb: parallel damped combs into series allpasses.
#[derive(Debug, Clone)]
pub struct Reverb {
    combs: Vec<Comb>,
    allpasses: Vec<Allpass>,
    wet: f32,
}

impl Reverb {
    /// Create a reverb.
    ///
    /// `reverberance` and `hf_damping` are in `0..=1`; `wet_gain` is linear.
    pub fn new(sample_rate: f32, reverberance: f32, hf_damping: f32, wet_gain: f32) -> Self {
        let scale = sample_rate / 44100.0;
        let scaled = |n: usize| ((n as f32 * scale).round() as usize).max(1);
        let feedback = 0.7 + 0.28 * reverberance;
        let damp = 0.4 * hf_damping;
        Self {
            combs: COMB_TUNING
                .iter()
                .map(|&n| Comb::new(scaled(n), feedback, damp))
                .collect(),
            allpasses: ALLPASS_TUNING
                .iter()
                .map(|&n| Allpass::new(scaled(n), 0.5))
                .collect(),
            wet: wet_gain,
        }
    }
}

impl Effect for Reverb {
    fn process(&mut self, input: f32) -> f32 {
        let fed = input * 0.015;
        let mut wet: f32 = self.combs.iter_mut().map(|c| c.process(fed)).sum();
        for ap in &mut self.allpasses {
            wet = ap.process(wet);
        }
        input + wet * self.wet
    }

    fn reset(&mut self) {
        self.combs.iter_mut().for_each(Comb::clear);
        self.allpasses.iter_mut().for_each(Allpass::clear);
    }
}

/// Soft-clipping overdrive with a colour control adding even harmonics.
#[derive(Debug, Clone)]
pub struct Overdrive {
    drive: f32,
    colour: f32,
    dc_x: f32,
    dc_y: f32,
}

impl Overdrive {
    /// Create with linear `drive` and `colour` in `0..=1`.
    pub fn new(drive: f32, colour: f32) -> Self {
        Self {
            drive,
            colour,
            dc_x: 0.0,
            dc_y: 0.0,
        }
    }
}

impl Effect for Overdrive {
    fn process(&mut self, input: f32) -> f32 {
        let x = input * self.drive + self.colour * 0.5;
        let shaped = x.tanh();
        // DC blocker removes the colour offset.
        let y = shaped - self.dc_x + 0.995 * self.dc_y;
        self.dc_x = shaped;
        self.dc_y = flush_denormal(y);
        y
    }

    fn reset(&mut self) {
        self.dc_x = 0.0;
        self.dc_y = 0.0;
    }
}

pub(crate) fn vol(args: &[String], _sample_rate: f32) -> Result<BoxedEffect, EffectArgsError> {
    let args = EffectArgs::new(args);
    args.expect_at_most(1)?;
    let gain = args.gain(0, 1.0, 16.0, (-60.0, 24.0))?;
    Ok(Box::new(Volume::new(gain)))
}

pub(crate) fn gain(args: &[String], _sample_rate: f32) -> Result<BoxedEffect, EffectArgsError> {
    let args = EffectArgs::new(args);
    args.expect_at_most(1)?;
    let db = args.number(0, 0.0, -60.0, 24.0)?;
    Ok(Box::new(Volume::new(db_to_linear(db))))
}

pub(crate) fn lowpass(args: &[String], sample_rate: f32) -> Result<BoxedEffect, EffectArgsError> {
    let args = EffectArgs::new(args);
    args.expect_at_most(1)?;
    let freq = args.number(0, 3000.0, 20.0, 20000.0)?;
    Ok(Box::new(OnePoleFilter::lowpass(sample_rate, freq)))
}

pub(crate) fn highpass(args: &[String], sample_rate: f32) -> Result<BoxedEffect, EffectArgsError> {
    let args = EffectArgs::new(args);
    args.expect_at_most(1)?;
    let freq = args.number(0, 100.0, 20.0, 20000.0)?;
    Ok(Box::new(OnePoleFilter::highpass(sample_rate, freq)))
}

pub(crate) fn echo(args: &[String], sample_rate: f32) -> Result<BoxedEffect, EffectArgsError> {
    let args = EffectArgs::new(args);
    args.expect_at_most(3)?;
    let delay_ms = args.number(0, 300.0, 1.0, 2000.0)?;
    let decay = args.number(1, 0.4, 0.0, 0.95)?;
    let mix = args.number(2, 0.5, 0.0, 1.0)?;
    Ok(Box::new(Echo::new(sample_rate, delay_ms, decay, mix)))
}

pub(crate) fn tremolo(args: &[String], sample_rate: f32) -> Result<BoxedEffect, EffectArgsError> {
    let args = EffectArgs::new(args);
    args.expect_at_most(2)?;
    let speed = args.number(0, 5.0, 0.1, 30.0)?;
    let depth = args.number(1, 40.0, 0.0, 100.0)?;
    Ok(Box::new(Tremolo::new(sample_rate, speed, depth / 100.0)))
}

pub(crate) fn reverb(args: &[String], sample_rate: f32) -> Result<BoxedEffect, EffectArgsError> {
    let args = EffectArgs::new(args);
    args.expect_at_most(3)?;
    let reverberance = args.number(0, 50.0, 0.0, 100.0)?;
    let damping = args.number(1, 50.0, 0.0, 100.0)?;
    let wet_db = args.number(2, 0.0, -10.0, 10.0)?;
    Ok(Box::new(Reverb::new(
        sample_rate,
        reverberance / 100.0,
        damping / 100.0,
        db_to_linear(wet_db),
    )))
}

pub(crate) fn overdrive(args: &[String], _sample_rate: f32) -> Result<BoxedEffect, EffectArgsError> {
    let args = EffectArgs::new(args);
    args.expect_at_most(2)?;
    let drive_db = args.number(0, 20.0, 0.0, 100.0)?;
    let colour = args.number(1, 20.0, 0.0, 100.0)?;
    Ok(Box::new(Overdrive::new(db_to_linear(drive_db), colour / 100.0)))
}
