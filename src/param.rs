//! Shape parameters that are either fixed or polled from a live source.
//!
//! The host (typically something tracking scroll position) writes into a
//! [`LiveValue`]; the animator calls [`Param::resolve`] on every sampling tick
//! so it always sees the latest value instead of one captured at setup time.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Something that can be asked for its current value.
pub trait ParamSource: Send + Sync {
    fn current(&self) -> f64;
}

/// A numeric shape parameter.
#[derive(Clone)]
pub enum Param {
    Constant(f64),
    Dynamic(Arc<dyn ParamSource>),
}

impl Param {
    /// Wrap any source as a dynamic parameter.
    pub fn dynamic<S: ParamSource + 'static>(source: S) -> Self {
        Param::Dynamic(Arc::new(source))
    }

    /// Read the value for this tick.
    pub fn resolve(&self) -> f64 {
        match self {
            Param::Constant(value) => *value,
            Param::Dynamic(source) => source.current(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Param::Dynamic(_))
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Constant(value)
    }
}

impl From<LiveValue> for Param {
    fn from(value: LiveValue) -> Self {
        Param::dynamic(value)
    }
}

impl From<Interpolated> for Param {
    fn from(value: Interpolated) -> Self {
        Param::dynamic(value)
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Param::Dynamic(source) => f.debug_tuple("Dynamic").field(&source.current()).finish(),
        }
    }
}

/// A shared `f64` cell. Clones observe the same value.
#[derive(Clone, Default)]
pub struct LiveValue(Arc<AtomicU64>);

impl LiveValue {
    pub fn new(value: f64) -> Self {
        Self(Arc::new(AtomicU64::new(value.to_bits())))
    }

    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }
}

impl ParamSource for LiveValue {
    fn current(&self) -> f64 {
        self.get()
    }
}

impl fmt::Debug for LiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LiveValue").field(&self.get()).finish()
    }
}

/// Linear mapping of a live input (such as scroll progress) from an input
/// range onto an output range.
///
/// By default the input is clamped to its range; [`Interpolated::extrapolate`]
/// lets values outside the range continue the line.
#[derive(Debug, Clone)]
pub struct Interpolated {
    source: LiveValue,
    input: (f64, f64),
    output: (f64, f64),
    clamp: bool,
}

impl Interpolated {
    pub fn new(source: LiveValue, input: (f64, f64), output: (f64, f64)) -> Self {
        Self {
            source,
            input,
            output,
            clamp: true,
        }
    }

    pub fn extrapolate(mut self) -> Self {
        self.clamp = false;
        self
    }
}

impl ParamSource for Interpolated {
    fn current(&self) -> f64 {
        let (in_start, in_end) = self.input;
        let (out_start, out_end) = self.output;
        let span = in_end - in_start;

        // A degenerate input range pins the output to its start.
        let mut t = if span == 0.0 {
            0.0
        } else {
            (self.source.get() - in_start) / span
        };
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        out_start + (out_end - out_start) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn constant_resolves_to_itself() {
        let param = Param::from(12.5);
        assert_eq!(param.resolve(), 12.5);
        assert!(!param.is_dynamic());
    }

    #[test]
    fn dynamic_param_sees_later_writes() {
        let live = LiveValue::new(1.0);
        let param = Param::from(live.clone());
        assert_eq!(param.resolve(), 1.0);

        live.set(4.0);
        assert_eq!(param.resolve(), 4.0);
        assert!(param.is_dynamic());
    }

    #[test]
    fn cloned_params_share_the_source() {
        let live = LiveValue::new(0.0);
        let a = Param::from(live.clone());
        let b = a.clone();

        live.set(-3.0);
        assert_eq!(a.resolve(), -3.0);
        assert_eq!(b.resolve(), -3.0);
    }

    #[rstest]
    #[case(0.0, 10.0)]
    #[case(0.5, 15.0)]
    #[case(1.0, 20.0)]
    #[case(-1.0, 10.0)]
    #[case(2.0, 20.0)]
    fn interpolation_clamps_by_default(#[case] progress: f64, #[case] expected: f64) {
        let scroll = LiveValue::new(progress);
        let mapped = Interpolated::new(scroll, (0.0, 1.0), (10.0, 20.0));
        assert_eq!(mapped.current(), expected);
    }

    #[test]
    fn extrapolation_continues_the_line() {
        let scroll = LiveValue::new(2.0);
        let mapped = Interpolated::new(scroll, (0.0, 1.0), (10.0, 20.0)).extrapolate();
        assert_eq!(mapped.current(), 30.0);
    }

    #[test]
    fn degenerate_input_range_pins_output() {
        let scroll = LiveValue::new(0.7);
        let mapped = Interpolated::new(scroll, (0.3, 0.3), (5.0, 9.0));
        assert_eq!(mapped.current(), 5.0);
    }
}
