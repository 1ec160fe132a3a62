//! Easing functions for animations
//!
//! Every function maps normalized progress `t` in `[0, 1]` onto shaped
//! progress. Outputs may leave `[0, 1]` in the middle of the range (back,
//! elastic, bounce, the exponential epsilon correction) but the end points
//! are always exact: each family returns `0.0` at `t <= 0` and `1.0` at
//! `t >= 1` without going through its formula. The two periodic curves,
//! [`EasingType::SineCurve`] and [`EasingType::CosineCurve`], are the only
//! exceptions.
//!
//! All arithmetic is done in `f64`.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Signature of a user supplied easing function
pub type EasingFn = fn(f64) -> f64;

/// Easing curve kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EasingType {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    OutInQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    OutInCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    OutInQuart,
    InQuint,
    OutQuint,
    InOutQuint,
    OutInQuint,
    InSine,
    OutSine,
    InOutSine,
    OutInSine,
    InExpo,
    OutExpo,
    InOutExpo,
    OutInExpo,
    InCirc,
    OutCirc,
    InOutCirc,
    OutInCirc,
    InElastic,
    OutElastic,
    InOutElastic,
    OutInElastic,
    InBack,
    OutBack,
    InOutBack,
    OutInBack,
    InBounce,
    OutBounce,
    InOutBounce,
    OutInBounce,
    /// Smooth begin, blending into linear progress
    InCurve,
    /// Linear progress, blending into a smooth end
    OutCurve,
    /// One full sine period, `0 -> 1 -> 0`
    SineCurve,
    /// One full cosine period, `0.5 -> 1 -> 0 -> 0.5`
    CosineCurve,
    /// A function supplied through [`EasingCurve::set_custom`]
    Custom,
}

impl EasingType {
    /// All built-in kinds, `Custom` excluded
    pub const ALL: [EasingType; 45] = [
        EasingType::Linear,
        EasingType::InQuad,
        EasingType::OutQuad,
        EasingType::InOutQuad,
        EasingType::OutInQuad,
        EasingType::InCubic,
        EasingType::OutCubic,
        EasingType::InOutCubic,
        EasingType::OutInCubic,
        EasingType::InQuart,
        EasingType::OutQuart,
        EasingType::InOutQuart,
        EasingType::OutInQuart,
        EasingType::InQuint,
        EasingType::OutQuint,
        EasingType::InOutQuint,
        EasingType::OutInQuint,
        EasingType::InSine,
        EasingType::OutSine,
        EasingType::InOutSine,
        EasingType::OutInSine,
        EasingType::InExpo,
        EasingType::OutExpo,
        EasingType::InOutExpo,
        EasingType::OutInExpo,
        EasingType::InCirc,
        EasingType::OutCirc,
        EasingType::InOutCirc,
        EasingType::OutInCirc,
        EasingType::InElastic,
        EasingType::OutElastic,
        EasingType::InOutElastic,
        EasingType::OutInElastic,
        EasingType::InBack,
        EasingType::OutBack,
        EasingType::InOutBack,
        EasingType::OutInBack,
        EasingType::InBounce,
        EasingType::OutBounce,
        EasingType::InOutBounce,
        EasingType::OutInBounce,
        EasingType::InCurve,
        EasingType::OutCurve,
        EasingType::SineCurve,
        EasingType::CosineCurve,
    ];
}

/// Evaluate an easing kind with default parameters
pub fn ease(kind: EasingType, t: f64) -> f64 {
    EasingCurve::new(kind).value_for_progress(t)
}

/// An easing kind together with its shape parameters.
///
/// `amplitude` is used by the elastic and bounce families, `period` by the
/// elastic family and `overshoot` by the back family.
#[derive(Clone, Copy, Debug)]
pub struct EasingCurve {
    kind: EasingType,
    amplitude: f64,
    period: f64,
    overshoot: f64,
    custom: Option<EasingFn>,
}

impl EasingCurve {
    pub const DEFAULT_AMPLITUDE: f64 = 1.0;
    pub const DEFAULT_PERIOD: f64 = 0.3;
    pub const DEFAULT_OVERSHOOT: f64 = 1.70158;

    pub fn new(kind: EasingType) -> Self {
        Self {
            kind,
            amplitude: Self::DEFAULT_AMPLITUDE,
            period: Self::DEFAULT_PERIOD,
            overshoot: Self::DEFAULT_OVERSHOOT,
            custom: None,
        }
    }

    /// Create a curve backed by a user function
    pub fn custom(func: EasingFn) -> Self {
        let mut curve = Self::new(EasingType::Custom);
        curve.custom = Some(func);
        curve
    }

    pub fn kind(&self) -> EasingType {
        self.kind
    }

    /// Change the kind, keeping the shape parameters.
    ///
    /// Switching away from `Custom` forgets the custom function.
    pub fn set_kind(&mut self, kind: EasingType) {
        if kind != EasingType::Custom {
            self.custom = None;
        }
        self.kind = kind;
    }

    pub fn set_custom(&mut self, func: EasingFn) {
        self.kind = EasingType::Custom;
        self.custom = Some(func);
    }

    pub fn custom_fn(&self) -> Option<EasingFn> {
        self.custom
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn set_amplitude(&mut self, amplitude: f64) {
        self.amplitude = amplitude;
    }

    /// Builder: set amplitude
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn set_period(&mut self, period: f64) {
        self.period = period;
    }

    /// Builder: set period
    pub fn with_period(mut self, period: f64) -> Self {
        self.period = period;
        self
    }

    pub fn overshoot(&self) -> f64 {
        self.overshoot
    }

    pub fn set_overshoot(&mut self, overshoot: f64) {
        self.overshoot = overshoot;
    }

    /// Builder: set overshoot
    pub fn with_overshoot(mut self, overshoot: f64) -> Self {
        self.overshoot = overshoot;
        self
    }

    /// Apply the curve to a progress value. Input outside `[0, 1]` is clamped.
    pub fn value_for_progress(&self, progress: f64) -> f64 {
        let t = progress.clamp(0.0, 1.0);
        let (a, p, s) = (self.amplitude, self.period, self.overshoot);

        match self.kind {
            EasingType::Linear => t,

            EasingType::InQuad => in_power(t, 2),
            EasingType::OutQuad => out_power(t, 2),
            EasingType::InOutQuad => in_out_power(t, 2),
            EasingType::OutInQuad => out_in(t, |t| out_power(t, 2), |t| in_power(t, 2)),

            EasingType::InCubic => in_power(t, 3),
            EasingType::OutCubic => out_power(t, 3),
            EasingType::InOutCubic => in_out_power(t, 3),
            EasingType::OutInCubic => out_in(t, |t| out_power(t, 3), |t| in_power(t, 3)),

            EasingType::InQuart => in_power(t, 4),
            EasingType::OutQuart => out_power(t, 4),
            EasingType::InOutQuart => in_out_power(t, 4),
            EasingType::OutInQuart => out_in(t, |t| out_power(t, 4), |t| in_power(t, 4)),

            EasingType::InQuint => in_power(t, 5),
            EasingType::OutQuint => out_power(t, 5),
            EasingType::InOutQuint => in_out_power(t, 5),
            EasingType::OutInQuint => out_in(t, |t| out_power(t, 5), |t| in_power(t, 5)),

            EasingType::InSine => in_sine(t),
            EasingType::OutSine => out_sine(t),
            EasingType::InOutSine => in_out_sine(t),
            EasingType::OutInSine => out_in(t, out_sine, in_sine),

            EasingType::InExpo => in_expo(t),
            EasingType::OutExpo => out_expo(t),
            EasingType::InOutExpo => in_out_expo(t),
            EasingType::OutInExpo => out_in(t, out_expo, in_expo),

            EasingType::InCirc => in_circ(t),
            EasingType::OutCirc => out_circ(t),
            EasingType::InOutCirc => in_out_circ(t),
            EasingType::OutInCirc => out_in(t, out_circ, in_circ),

            EasingType::InElastic => in_elastic(t, a, p),
            EasingType::OutElastic => out_elastic(t, a, p),
            EasingType::InOutElastic => in_out_elastic(t, a, p),
            EasingType::OutInElastic => {
                out_in(t, |t| out_elastic(t, a, p), |t| in_elastic(t, a, p))
            }

            EasingType::InBack => in_back(t, s),
            EasingType::OutBack => out_back(t, s),
            EasingType::InOutBack => in_out_back(t, s),
            EasingType::OutInBack => out_in(t, |t| out_back(t, s), |t| in_back(t, s)),

            EasingType::InBounce => in_bounce(t, a),
            EasingType::OutBounce => out_bounce(t, a),
            EasingType::InOutBounce => in_out_bounce(t, a),
            EasingType::OutInBounce => out_in(t, |t| out_bounce(t, a), |t| in_bounce(t, a)),

            EasingType::InCurve => in_curve(t),
            EasingType::OutCurve => out_curve(t),
            EasingType::SineCurve => sine_curve(t),
            EasingType::CosineCurve => cosine_curve(t),

            EasingType::Custom => match self.custom {
                Some(func) => func(t),
                None => t,
            },
        }
    }
}

impl Default for EasingCurve {
    fn default() -> Self {
        Self::new(EasingType::Linear)
    }
}

impl From<EasingType> for EasingCurve {
    fn from(kind: EasingType) -> Self {
        Self::new(kind)
    }
}

impl PartialEq for EasingCurve {
    fn eq(&self, other: &Self) -> bool {
        // Function pointers are compared by address
        let custom_eq = match (self.custom, other.custom) {
            (Some(a), Some(b)) => a as usize == b as usize,
            (None, None) => true,
            _ => false,
        };
        self.kind == other.kind
            && self.amplitude == other.amplitude
            && self.period == other.period
            && self.overshoot == other.overshoot
            && custom_eq
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Exact end points, `f` only sees the open interval
#[inline]
fn endpoints(t: f64, f: impl FnOnce(f64) -> f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else {
        f(t)
    }
}

/// First half runs the Out curve, second half the In curve, each scaled
/// into half of the output range
#[inline]
fn out_in(t: f64, out: impl Fn(f64) -> f64, inn: impl Fn(f64) -> f64) -> f64 {
    if t < 0.5 {
        out(2.0 * t) / 2.0
    } else {
        inn(2.0 * t - 1.0) / 2.0 + 0.5
    }
}

// ============================================================================
// Power family (quad, cubic, quart, quint)
// ============================================================================

fn in_power(t: f64, order: i32) -> f64 {
    endpoints(t, |t| t.powi(order))
}

fn out_power(t: f64, order: i32) -> f64 {
    endpoints(t, |t| 1.0 - (1.0 - t).powi(order))
}

fn in_out_power(t: f64, order: i32) -> f64 {
    endpoints(t, |t| {
        if t < 0.5 {
            2f64.powi(order - 1) * t.powi(order)
        } else {
            1.0 - (-2.0 * t + 2.0).powi(order) / 2.0
        }
    })
}

// ============================================================================
// Sine family
// ============================================================================

fn in_sine(t: f64) -> f64 {
    endpoints(t, |t| 1.0 - (t * FRAC_PI_2).cos())
}

fn out_sine(t: f64) -> f64 {
    endpoints(t, |t| (t * FRAC_PI_2).sin())
}

fn in_out_sine(t: f64) -> f64 {
    endpoints(t, |t| -0.5 * ((PI * t).cos() - 1.0))
}

// ============================================================================
// Exponential family
// ============================================================================
//
// 2^(10(t-1)) never reaches 0, so the curves are shifted by 0.001 (0.0005 for
// each half of InOut) to meet the end points.

fn in_expo(t: f64) -> f64 {
    endpoints(t, |t| 2f64.powf(10.0 * (t - 1.0)) - 0.001)
}

fn out_expo(t: f64) -> f64 {
    endpoints(t, |t| 1.001 * (1.0 - 2f64.powf(-10.0 * t)))
}

fn in_out_expo(t: f64) -> f64 {
    endpoints(t, |t| {
        let t = t * 2.0;
        if t < 1.0 {
            0.5 * 2f64.powf(10.0 * (t - 1.0)) - 0.0005
        } else {
            0.5 * 1.0005 * (2.0 - 2f64.powf(-10.0 * (t - 1.0)))
        }
    })
}

// ============================================================================
// Circular family
// ============================================================================

fn in_circ(t: f64) -> f64 {
    endpoints(t, |t| 1.0 - (1.0 - t * t).sqrt())
}

fn out_circ(t: f64) -> f64 {
    endpoints(t, |t| {
        let t = t - 1.0;
        (1.0 - t * t).sqrt()
    })
}

fn in_out_circ(t: f64) -> f64 {
    endpoints(t, |t| {
        let t = t * 2.0;
        if t < 1.0 {
            -0.5 * ((1.0 - t * t).sqrt() - 1.0)
        } else {
            let t = t - 2.0;
            0.5 * ((1.0 - t * t).sqrt() + 1.0)
        }
    })
}

// ============================================================================
// Elastic family
// ============================================================================

/// Effective amplitude and phase shift for an elastic curve.
///
/// An amplitude below the distance travelled (1.0) cannot reach the target,
/// so it is raised to 1.0 and the phase falls back to a quarter period.
fn elastic_phase(amplitude: f64, period: f64) -> (f64, f64) {
    if amplitude < 1.0 {
        (1.0, period / 4.0)
    } else {
        (amplitude, period / TAU * (1.0 / amplitude).asin())
    }
}

fn in_elastic(t: f64, amplitude: f64, period: f64) -> f64 {
    endpoints(t, |t| {
        let (a, s) = elastic_phase(amplitude, period);
        let t = t - 1.0;
        -(a * 2f64.powf(10.0 * t) * ((t - s) * TAU / period).sin())
    })
}

fn out_elastic(t: f64, amplitude: f64, period: f64) -> f64 {
    endpoints(t, |t| {
        let (a, s) = elastic_phase(amplitude, period);
        a * 2f64.powf(-10.0 * t) * ((t - s) * TAU / period).sin() + 1.0
    })
}

fn in_out_elastic(t: f64, amplitude: f64, period: f64) -> f64 {
    endpoints(t, |t| {
        let (a, s) = elastic_phase(amplitude, period);
        let t = t * 2.0 - 1.0;
        let wave = ((t - s) * TAU / period).sin();
        if t < 0.0 {
            -0.5 * a * 2f64.powf(10.0 * t) * wave
        } else {
            0.5 * a * 2f64.powf(-10.0 * t) * wave + 1.0
        }
    })
}

// ============================================================================
// Back family
// ============================================================================

fn in_back(t: f64, overshoot: f64) -> f64 {
    endpoints(t, |t| t * t * ((overshoot + 1.0) * t - overshoot))
}

fn out_back(t: f64, overshoot: f64) -> f64 {
    endpoints(t, |t| {
        let t = t - 1.0;
        t * t * ((overshoot + 1.0) * t + overshoot) + 1.0
    })
}

fn in_out_back(t: f64, overshoot: f64) -> f64 {
    endpoints(t, |t| {
        let s = overshoot * 1.525;
        let t = t * 2.0;
        if t < 1.0 {
            0.5 * (t * t * ((s + 1.0) * t - s))
        } else {
            let t = t - 2.0;
            0.5 * (t * t * ((s + 1.0) * t + s) + 2.0)
        }
    })
}

// ============================================================================
// Bounce family
// ============================================================================

/// Four parabolic arcs meeting at 4/11, 8/11 and 10/11. `amplitude` scales
/// how far each bounce drops below the target.
fn bounce_out_helper(t: f64, amplitude: f64) -> f64 {
    const K: f64 = 7.5625;
    if t >= 1.0 {
        return 1.0;
    }
    if t < 4.0 / 11.0 {
        K * t * t
    } else if t < 8.0 / 11.0 {
        let t = t - 6.0 / 11.0;
        -amplitude * (1.0 - (K * t * t + 0.75)) + 1.0
    } else if t < 10.0 / 11.0 {
        let t = t - 9.0 / 11.0;
        -amplitude * (1.0 - (K * t * t + 0.9375)) + 1.0
    } else {
        let t = t - 21.0 / 22.0;
        -amplitude * (1.0 - (K * t * t + 0.984375)) + 1.0
    }
}

fn out_bounce(t: f64, amplitude: f64) -> f64 {
    endpoints(t, |t| bounce_out_helper(t, amplitude))
}

fn in_bounce(t: f64, amplitude: f64) -> f64 {
    endpoints(t, |t| 1.0 - bounce_out_helper(1.0 - t, amplitude))
}

fn in_out_bounce(t: f64, amplitude: f64) -> f64 {
    endpoints(t, |t| {
        if t < 0.5 {
            in_bounce(2.0 * t, amplitude) / 2.0
        } else {
            out_bounce(2.0 * t - 1.0, amplitude) / 2.0 + 0.5
        }
    })
}

// ============================================================================
// Curve family
// ============================================================================

/// Half a sine wave stretched over `[0, 1]`
fn sin_progress(v: f64) -> f64 {
    (v * PI - FRAC_PI_2).sin() / 2.0 + 0.5
}

/// Portion of progress over which the sine shape fades into linear
const SMOOTH_SPAN: f64 = 0.3;

/// 1.0 at v = 0, fading linearly to 0.0 at v = `SMOOTH_SPAN`
fn smooth_mix_factor(v: f64) -> f64 {
    (1.0 - v / SMOOTH_SPAN).clamp(0.0, 1.0)
}

fn in_curve(t: f64) -> f64 {
    endpoints(t, |t| {
        let mix = smooth_mix_factor(t);
        sin_progress(t) * mix + t * (1.0 - mix)
    })
}

fn out_curve(t: f64) -> f64 {
    endpoints(t, |t| {
        let mix = smooth_mix_factor(1.0 - t);
        sin_progress(t) * mix + t * (1.0 - mix)
    })
}

fn sine_curve(t: f64) -> f64 {
    if t <= 0.0 || t >= 1.0 {
        return 0.0;
    }
    ((t * TAU - FRAC_PI_2).sin() + 1.0) / 2.0
}

fn cosine_curve(t: f64) -> f64 {
    if t <= 0.0 || t >= 1.0 {
        return 0.5;
    }
    ((t * TAU - FRAC_PI_2).cos() + 1.0) / 2.0
}
