//! Positional argument parsing for effect factories.
//!
//! Effects take sox-style positional strings (`reverb 50 30`). Each factory
//! reads its arguments through [`EffectArgs`], which supplies defaults for
//! missing trailing arguments and range-checks the rest.

use podstudio_core::EffectArgsError;

/// Convert decibels to a linear gain factor.
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Borrowed view over an effect's positional arguments.
#[derive(Debug, Clone, Copy)]
pub struct EffectArgs<'a> {
    args: &'a [String],
}

impl<'a> EffectArgs<'a> {
    /// Wrap an argument list.
    pub fn new(args: &'a [String]) -> Self {
        Self { args }
    }

    /// Number of arguments supplied.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns true if no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Reject lists longer than `max`.
    pub fn expect_at_most(&self, max: usize) -> Result<(), EffectArgsError> {
        if self.args.len() > max {
            return Err(EffectArgsError::TooMany {
                max,
                got: self.args.len(),
            });
        }
        Ok(())
    }

    /// Numeric argument at `index`, or `default` when absent.
    ///
    /// A trailing `%`, `Hz`, `ms` or `dB` unit is accepted and ignored; the
    /// caller decides what the number means.
    pub fn number(
        &self,
        index: usize,
        default: f32,
        min: f32,
        max: f32,
    ) -> Result<f32, EffectArgsError> {
        let Some(raw) = self.args.get(index) else {
            return Ok(default);
        };
        let value = parse_number(raw).ok_or_else(|| EffectArgsError::NotANumber {
            index,
            value: raw.clone(),
        })?;
        if !(min..=max).contains(&value) {
            return Err(EffectArgsError::OutOfRange {
                index,
                value,
                min,
                max,
            });
        }
        Ok(value)
    }

    /// Gain argument at `index` as a linear factor.
    ///
    /// Plain numbers are linear factors in `0..=max_linear`; a `dB` suffix
    /// switches to decibels in `min_db..=max_db`.
    pub fn gain(
        &self,
        index: usize,
        default_linear: f32,
        max_linear: f32,
        (min_db, max_db): (f32, f32),
    ) -> Result<f32, EffectArgsError> {
        match self.args.get(index) {
            Some(raw) if has_db_suffix(raw) => {
                self.number(index, 0.0, min_db, max_db).map(db_to_linear)
            }
            _ => self.number(index, default_linear, 0.0, max_linear),
        }
    }
}

fn has_db_suffix(raw: &str) -> bool {
    raw.trim().to_ascii_lowercase().ends_with("db")
}

fn parse_number(raw: &str) -> Option<f32> {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    let number = ["db", "hz", "ms", "%"]
        .iter()
        .find_map(|unit| lower.strip_suffix(unit))
        .unwrap_or(&lower);
    number.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults_fill_missing_trailing_args() {
        let list = args(&["30"]);
        let a = EffectArgs::new(&list);
        assert_eq!(a.number(0, 50.0, 0.0, 100.0), Ok(30.0));
        assert_eq!(a.number(1, 50.0, 0.0, 100.0), Ok(50.0));
    }

    #[test]
    fn test_units_are_stripped() {
        let list = args(&["50%", "300ms", "1000 Hz", "-6dB"]);
        let a = EffectArgs::new(&list);
        assert_eq!(a.number(0, 0.0, 0.0, 100.0), Ok(50.0));
        assert_eq!(a.number(1, 0.0, 0.0, 2000.0), Ok(300.0));
        assert_eq!(a.number(2, 0.0, 20.0, 20000.0), Ok(1000.0));
        assert_eq!(a.number(3, 0.0, -60.0, 24.0), Ok(-6.0));
    }

    #[test]
    fn test_rejections() {
        let list = args(&["loud", "500"]);
        let a = EffectArgs::new(&list);
        assert!(matches!(
            a.number(0, 0.0, 0.0, 1.0),
            Err(EffectArgsError::NotANumber { index: 0, .. })
        ));
        assert!(matches!(
            a.number(1, 0.0, 0.0, 100.0),
            Err(EffectArgsError::OutOfRange { index: 1, .. })
        ));
        assert_eq!(
            a.expect_at_most(1),
            Err(EffectArgsError::TooMany { max: 1, got: 2 })
        );
    }

    #[test]
    fn test_gain_linear_or_db() {
        let list = args(&["0.5", "-6dB"]);
        let a = EffectArgs::new(&list);
        assert_eq!(a.gain(0, 1.0, 16.0, (-60.0, 24.0)), Ok(0.5));
        let db = a.gain(1, 1.0, 16.0, (-60.0, 24.0)).unwrap();
        assert!((db - 0.501).abs() < 1e-3);
    }

    #[test]
    fn test_nan_is_not_a_number() {
        let list = args(&["NaN"]);
        let a = EffectArgs::new(&list);
        assert!(matches!(
            a.number(0, 0.0, -1.0, 1.0),
            Err(EffectArgsError::NotANumber { .. })
        ));
    }
}
