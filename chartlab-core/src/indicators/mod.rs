//! Concrete indicator implementations, grouped into five recurrence families
//! plus Wilder's stop-and-reverse system.
//!
//! Each indicator is a variant of the closed [`Indicator`] enum carrying its own
//! parameter struct. The recompute call-site is uniform: [`Indicator::compute`]
//! fills up to [`MAX_LINES`] caller-owned output slices from a source series and
//! reports a [`ComputeStatus`]. Nothing here allocates; scratch state lives in a
//! caller-owned [`Workspace`].
//!
//! Every line follows the same stabilization rule: indices before the line's
//! warm-up hold the first computed value, and every index from warm-up onward is
//! finite.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod donchian;
pub mod ema;
pub mod ichimoku;
pub mod macd;
pub mod obv;
pub mod parabolic_sar;
pub mod rolling;
pub mod rsi;
pub mod stochastic;
pub mod wilder;

pub use adx::AdxParams;
pub use atr::AtrParams;
pub use bollinger::BollingerParams;
pub use donchian::DonchianParams;
pub use ichimoku::IchimokuParams;
pub use macd::MacdParams;
pub use parabolic_sar::ParabolicSarParams;
pub use rolling::{Extremum, MonotonicDeque, RollingExtrema};
pub use rsi::RsiParams;
pub use stochastic::StochasticParams;

use crate::config::ConfigError;
use crate::domain::SourceSeries;
use crate::engine::range::{RangePolicy, YRange};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of derived lines any indicator produces.
pub const MAX_LINES: usize = 4;

/// Outcome of one recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeStatus {
    /// Every line is filled and finite over `0..n`.
    Ready,
    /// Fewer points than the indicator's minimum; nothing is drawn.
    InsufficientData { required: usize, available: usize },
    /// Enough points, but some line never produced a finite value.
    NonFinite,
}

impl ComputeStatus {
    pub fn is_ready(self) -> bool {
        matches!(self, ComputeStatus::Ready)
    }

    pub(crate) fn check_len(required: usize, available: usize) -> Option<Self> {
        if available < required {
            Some(ComputeStatus::InsufficientData {
                required,
                available,
            })
        } else {
            None
        }
    }
}

/// Recurrence families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Wilder,
    EmaCascade,
    RollingExtrema,
    Cumulative,
    RollingStatistics,
    StopAndReverse,
}

/// Caller-owned scratch state reused across recomputations.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    /// One paired deque per concurrent window, fastest first.
    pub extrema: [RollingExtrema; 3],
}

/// A configured indicator: kind plus parameters.
///
/// Two values compare equal iff they describe the same computation, so the
/// whole enum serves as the parameter half of a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Indicator {
    Atr(AtrParams),
    Adx(AdxParams),
    Rsi(RsiParams),
    Macd(MacdParams),
    Stochastic(StochasticParams),
    Donchian(DonchianParams),
    Obv,
    Bollinger(BollingerParams),
    Ichimoku(IchimokuParams),
    #[serde(rename = "psar")]
    ParabolicSar(ParabolicSarParams),
}

impl Indicator {
    /// Every supported indicator with default parameters.
    pub fn all_defaults() -> [Indicator; 10] {
        [
            Indicator::Atr(AtrParams::default()),
            Indicator::Adx(AdxParams::default()),
            Indicator::Rsi(RsiParams::default()),
            Indicator::Macd(MacdParams::default()),
            Indicator::Stochastic(StochasticParams::default()),
            Indicator::Donchian(DonchianParams::default()),
            Indicator::Obv,
            Indicator::Bollinger(BollingerParams::default()),
            Indicator::Ichimoku(IchimokuParams::default()),
            Indicator::ParabolicSar(ParabolicSarParams::default()),
        ]
    }

    /// Look up an indicator by name with default parameters.
    pub fn from_name(name: &str) -> Option<Indicator> {
        Self::all_defaults()
            .into_iter()
            .find(|ind| ind.name().eq_ignore_ascii_case(name))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Indicator::Atr(_) => "atr",
            Indicator::Adx(_) => "adx",
            Indicator::Rsi(_) => "rsi",
            Indicator::Macd(_) => "macd",
            Indicator::Stochastic(_) => "stochastic",
            Indicator::Donchian(_) => "donchian",
            Indicator::Obv => "obv",
            Indicator::Bollinger(_) => "bollinger",
            Indicator::Ichimoku(_) => "ichimoku",
            Indicator::ParabolicSar(_) => "psar",
        }
    }

    /// Human-readable label including parameters (e.g. "atr_14", "macd_12_26_9").
    pub fn label(&self) -> String {
        match self {
            Indicator::Atr(p) => format!("atr_{}", p.period),
            Indicator::Adx(p) => format!("adx_{}", p.period),
            Indicator::Rsi(p) => format!("rsi_{}", p.period),
            Indicator::Macd(p) => format!("macd_{}_{}_{}", p.fast, p.slow, p.signal),
            Indicator::Stochastic(p) => format!("stochastic_{}_{}", p.k_period, p.d_period),
            Indicator::Donchian(p) => format!("donchian_{}", p.period),
            Indicator::Obv => "obv".to_string(),
            Indicator::Bollinger(p) => format!("bollinger_{}_{}", p.period, p.std_dev_factor),
            Indicator::Ichimoku(p) => format!(
                "ichimoku_{}_{}_{}_{}",
                p.tenkan, p.kijun, p.senkou_b, p.displacement
            ),
            Indicator::ParabolicSar(p) => format!("psar_{}_{}_{}", p.af_start, p.af_step, p.af_max),
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Indicator::Atr(_) | Indicator::Adx(_) | Indicator::Rsi(_) => Family::Wilder,
            Indicator::Macd(_) => Family::EmaCascade,
            Indicator::Stochastic(_) | Indicator::Donchian(_) | Indicator::Ichimoku(_) => {
                Family::RollingExtrema
            }
            Indicator::Obv => Family::Cumulative,
            Indicator::Bollinger(_) => Family::RollingStatistics,
            Indicator::ParabolicSar(_) => Family::StopAndReverse,
        }
    }

    /// Names of the derived lines, in output-slot order.
    pub fn line_names(&self) -> &'static [&'static str] {
        match self {
            Indicator::Atr(_) => &["atr"],
            Indicator::Adx(_) => &["adx", "plus_di", "minus_di"],
            Indicator::Rsi(_) => &["rsi"],
            Indicator::Macd(_) => &["macd", "signal", "histogram"],
            Indicator::Stochastic(_) => &["k", "d"],
            Indicator::Donchian(_) => &["upper", "middle", "lower"],
            Indicator::Obv => &["obv"],
            Indicator::Bollinger(_) => &["middle", "upper", "lower"],
            Indicator::Ichimoku(_) => &["tenkan", "kijun", "senkou_a", "senkou_b"],
            Indicator::ParabolicSar(_) => &["sar"],
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_names().len()
    }

    /// Index of the first real value of line `line`.
    pub fn line_warmup(&self, line: usize) -> usize {
        match self {
            Indicator::Atr(p) => p.warmup(),
            Indicator::Adx(p) => {
                if line == 0 {
                    p.adx_warmup()
                } else {
                    p.di_warmup()
                }
            }
            Indicator::Rsi(p) => p.warmup(),
            Indicator::Macd(p) => {
                if line == 0 {
                    p.macd_warmup()
                } else {
                    p.signal_warmup()
                }
            }
            Indicator::Stochastic(p) => {
                if line == 0 {
                    p.k_warmup()
                } else {
                    p.d_warmup()
                }
            }
            Indicator::Donchian(p) => p.warmup(),
            Indicator::Obv => 0,
            Indicator::Bollinger(p) => p.warmup(),
            Indicator::Ichimoku(p) => match line {
                0 => p.tenkan_warmup(),
                1 => p.kijun_warmup(),
                2 => p.span_a_warmup(),
                _ => p.span_b_warmup(),
            },
            Indicator::ParabolicSar(_) => parabolic_sar::WARMUP,
        }
    }

    /// Warm-up length of the slowest line.
    pub fn warmup(&self) -> usize {
        (0..self.line_count())
            .map(|line| self.line_warmup(line))
            .max()
            .unwrap_or(0)
    }

    /// Fewest points for which every line has at least one real value.
    pub fn min_points(&self) -> usize {
        match self {
            Indicator::Atr(p) => p.min_points(),
            Indicator::Adx(p) => p.min_points(),
            Indicator::Rsi(p) => p.min_points(),
            Indicator::Macd(p) => p.min_points(),
            Indicator::Stochastic(p) => p.min_points(),
            Indicator::Donchian(p) => p.min_points(),
            Indicator::Obv => obv::MIN_POINTS,
            Indicator::Bollinger(p) => p.min_points(),
            Indicator::Ichimoku(p) => p.min_points(),
            Indicator::ParabolicSar(_) => parabolic_sar::MIN_POINTS,
        }
    }

    /// How the emitter should choose the y-axis for this indicator.
    pub fn range_policy(&self) -> RangePolicy {
        match self {
            Indicator::Adx(_) | Indicator::Rsi(_) | Indicator::Stochastic(_) => {
                RangePolicy::Fixed(YRange::PERCENT)
            }
            Indicator::Atr(_) | Indicator::Macd(_) | Indicator::Obv => RangePolicy::ZeroAnchored,
            Indicator::Donchian(_)
            | Indicator::Bollinger(_)
            | Indicator::Ichimoku(_)
            | Indicator::ParabolicSar(_) => RangePolicy::Overlay,
        }
    }

    /// Horizontal reference levels drawn behind bounded oscillators.
    pub fn reference_levels(&self) -> &'static [f64] {
        match self {
            Indicator::Adx(_) => &[adx::WEAK_TREND, adx::STRONG_TREND],
            Indicator::Rsi(_) => &[rsi::OVERSOLD, rsi::MIDPOINT, rsi::OVERBOUGHT],
            Indicator::Stochastic(_) => &[stochastic::OVERSOLD, stochastic::OVERBOUGHT],
            Indicator::Macd(_) | Indicator::Obv => &[0.0],
            _ => &[],
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.name();
        match self {
            Indicator::Atr(p) => require_period(name, "period", p.period),
            Indicator::Adx(p) => require_period(name, "period", p.period),
            Indicator::Rsi(p) => require_period(name, "period", p.period),
            Indicator::Macd(p) => {
                require_period(name, "fast", p.fast)?;
                require_period(name, "slow", p.slow)?;
                require_period(name, "signal", p.signal)
            }
            Indicator::Stochastic(p) => {
                require_period(name, "k_period", p.k_period)?;
                require_period(name, "d_period", p.d_period)
            }
            Indicator::Donchian(p) => require_period(name, "period", p.period),
            Indicator::Obv => Ok(()),
            Indicator::Bollinger(p) => {
                require_period(name, "period", p.period)?;
                require_factor(name, "std_dev_factor", p.std_dev_factor)
            }
            Indicator::Ichimoku(p) => {
                require_period(name, "tenkan", p.tenkan)?;
                require_period(name, "kijun", p.kijun)?;
                require_period(name, "senkou_b", p.senkou_b)
            }
            Indicator::ParabolicSar(p) => {
                require_factor(name, "af_start", p.af_start)?;
                require_factor(name, "af_step", p.af_step)?;
                require_factor(name, "af_max", p.af_max)?;
                if p.af_max < p.af_start {
                    return Err(ConfigError::InvalidFactor {
                        indicator: name,
                        field: "af_max",
                        value: p.af_max,
                    });
                }
                Ok(())
            }
        }
    }

    /// Recompute every line of this indicator from `src`.
    ///
    /// Each output slice must hold at least `src.len()` values; only the first
    /// `src.len()` are written. Slots beyond `line_count()` are left untouched.
    pub fn compute<S: SourceSeries + ?Sized>(
        &self,
        src: &S,
        out: [&mut [f64]; MAX_LINES],
        ws: &mut Workspace,
    ) -> ComputeStatus {
        let [a, b, c, d] = out;
        match self {
            Indicator::Atr(p) => atr::compute(src, p, a),
            Indicator::Adx(p) => adx::compute(src, p, a, b, c),
            Indicator::Rsi(p) => rsi::compute(src, p, a),
            Indicator::Macd(p) => macd::compute(src, p, a, b, c),
            Indicator::Stochastic(p) => stochastic::compute(src, p, &mut ws.extrema[0], a, b),
            Indicator::Donchian(p) => donchian::compute(src, p, &mut ws.extrema[0], a, b, c),
            Indicator::Obv => obv::compute(src, a),
            Indicator::Bollinger(p) => bollinger::compute(src, p, a, b, c),
            Indicator::Ichimoku(p) => ichimoku::compute(src, p, &mut ws.extrema, a, b, c, d),
            Indicator::ParabolicSar(p) => parabolic_sar::compute(src, p, a),
        }
    }
}

fn require_period(
    indicator: &'static str,
    field: &'static str,
    value: usize,
) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::ZeroPeriod { indicator, field })
    } else {
        Ok(())
    }
}

fn require_factor(
    indicator: &'static str,
    field: &'static str,
    value: f64,
) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidFactor {
            indicator,
            field,
            value,
        })
    }
}

/// Create a series from (open, high, low, close) tuples for testing; x = index,
/// volume = 1000.
#[cfg(test)]
pub fn make_ohlc(data: &[(f64, f64, f64, f64)]) -> crate::domain::VecSeries {
    use crate::domain::{Sample, VecSeries};
    VecSeries::from_samples(
        data.iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| {
                Sample::new(i as f64, open, high, low, close, 1000.0)
            })
            .collect(),
    )
}

/// Create a series from close prices for testing.
///
/// open = prev_close (or close for first sample), high = max(open,close) + 1.0,
/// low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_samples(closes: &[f64]) -> crate::domain::VecSeries {
    let data: Vec<_> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            (open, open.max(close) + 1.0, open.min(close) - 1.0, close)
        })
        .collect();
    make_ohlc(&data)
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
