//! Layer selection: a TOML chart file, a single `--indicator`, or every default.

use anyhow::{bail, Context, Result};
use chartlab_core::indicators::Indicator;
use chartlab_core::viewport::Spacing;
use chartlab_core::{LayerConfig, LayerSpec};
use serde::Deserialize;
use std::path::Path;

/// A chart file: one `[[layer]]` table per indicator layer.
#[derive(Debug, Default, Deserialize)]
pub struct ChartConfig {
    #[serde(default)]
    pub layer: Vec<LayerSpec>,
}

impl ChartConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ChartConfig = toml::from_str(content).context("invalid chart config")?;
        for (i, spec) in config.layer.iter().enumerate() {
            spec.validate()
                .with_context(|| format!("layer {} ({})", i + 1, spec.indicator.label()))?;
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::from_toml(&content)
    }
}

/// Set the single period-like parameter of `indicator`.
pub fn with_period(indicator: Indicator, period: usize) -> Result<Indicator> {
    let out = match indicator {
        Indicator::Atr(mut p) => {
            p.period = period;
            Indicator::Atr(p)
        }
        Indicator::Adx(mut p) => {
            p.period = period;
            Indicator::Adx(p)
        }
        Indicator::Rsi(mut p) => {
            p.period = period;
            Indicator::Rsi(p)
        }
        Indicator::Stochastic(mut p) => {
            p.k_period = period;
            Indicator::Stochastic(p)
        }
        Indicator::Donchian(mut p) => {
            p.period = period;
            Indicator::Donchian(p)
        }
        Indicator::Bollinger(mut p) => {
            p.period = period;
            Indicator::Bollinger(p)
        }
        Indicator::Macd(_)
        | Indicator::Obv
        | Indicator::Ichimoku(_)
        | Indicator::ParabolicSar(_) => {
            bail!("--period does not apply to {}", indicator.name())
        }
    };
    out.validate()?;
    Ok(out)
}

/// Command-line overrides applied on top of the chart file.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub overscan: Option<usize>,
    pub spacing: Option<Spacing>,
    pub lod: Option<bool>,
}

impl Overrides {
    fn apply(&self, render: &mut LayerConfig) {
        if let Some(k) = self.overscan {
            render.overscan = k;
        }
        if let Some(s) = self.spacing {
            render.spacing = s;
        }
        if let Some(enabled) = self.lod {
            render.lod.enabled = enabled;
        }
    }
}

/// Resolve the layers to run. `--indicator` replaces the chart file's layers;
/// with neither, every indicator runs with default parameters.
pub fn resolve(
    config: Option<&Path>,
    indicator: Option<&str>,
    period: Option<usize>,
    overrides: Overrides,
) -> Result<Vec<LayerSpec>> {
    let mut layers = match (indicator, config) {
        (Some(name), _) => {
            let Some(mut ind) = Indicator::from_name(name) else {
                bail!(
                    "unknown indicator '{name}'. Valid: {}",
                    Indicator::all_defaults().map(|i| i.name()).join(", ")
                );
            };
            if let Some(p) = period {
                ind = with_period(ind, p)?;
            }
            vec![LayerSpec {
                indicator: ind,
                render: LayerConfig::default(),
            }]
        }
        (None, Some(path)) => {
            if period.is_some() {
                bail!("--period requires --indicator");
            }
            ChartConfig::from_file(path)?.layer
        }
        (None, None) => {
            if period.is_some() {
                bail!("--period requires --indicator");
            }
            Indicator::all_defaults()
                .into_iter()
                .map(|indicator| LayerSpec {
                    indicator,
                    render: LayerConfig::default(),
                })
                .collect()
        }
    };

    if layers.is_empty() {
        bail!("no layers to run");
    }
    for spec in &mut layers {
        overrides.apply(&mut spec.render);
        spec.validate()?;
    }
    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartlab_core::indicators::{AtrParams, BollingerParams};

    #[test]
    fn parses_chart_file() {
        let cfg = ChartConfig::from_toml(
            r#"
            [[layer]]
            type = "atr"
            period = 10

            [[layer]]
            type = "bollinger"
            std_dev_factor = 3.0

            [layer.render]
            spacing = "irregular"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.layer.len(), 2);
        assert_eq!(cfg.layer[0].indicator, Indicator::Atr(AtrParams { period: 10 }));
        assert_eq!(
            cfg.layer[1].indicator,
            Indicator::Bollinger(BollingerParams {
                period: 20,
                std_dev_factor: 3.0
            })
        );
        assert_eq!(cfg.layer[1].render.spacing, Spacing::Irregular);
    }

    #[test]
    fn chart_file_errors_name_the_layer() {
        let err = ChartConfig::from_toml("[[layer]]\ntype = \"rsi\"\nperiod = 0\n").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("layer 1"), "{msg}");
        assert!(msg.contains("period must be at least 1"), "{msg}");
    }

    #[test]
    fn period_override() {
        let ind = with_period(Indicator::from_name("stochastic").unwrap(), 5).unwrap();
        assert_eq!(ind.label(), "stochastic_5_3");
        assert!(with_period(Indicator::Obv, 5).is_err());
        assert!(with_period(Indicator::from_name("atr").unwrap(), 0).is_err());
    }

    #[test]
    fn defaults_to_every_indicator() {
        let layers = resolve(None, None, None, Overrides::default()).unwrap();
        assert_eq!(layers.len(), 10);
    }

    #[test]
    fn overrides_apply_to_every_layer() {
        let overrides = Overrides {
            overscan: Some(7),
            spacing: Some(Spacing::Uniform),
            lod: Some(false),
        };
        let layers = resolve(None, Some("rsi"), Some(9), overrides).unwrap();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].indicator.label(), "rsi_9");
        assert_eq!(layers[0].render.overscan, 7);
        assert_eq!(layers[0].render.spacing, Spacing::Uniform);
        assert!(!layers[0].render.lod.enabled);
    }

    #[test]
    fn unknown_indicator_lists_valid_names() {
        let err = resolve(None, Some("vwap"), None, Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("bollinger"));
    }
}
