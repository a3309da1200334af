//! Simulated performance metrics.
//!
//! Every selected option may carry signed deltas for named metrics. Deltas on
//! the same metric add up. Two transforms sit on top of the plain sum:
//!
//! | Rule       | Value                                                    |
//! |------------|----------------------------------------------------------|
//! | `additive` | `baseline + sum(deltas)`                                 |
//! | `dampened` | `(baseline + sum(deltas)) / (1 + weight * driver% / 100)` |
//!
//! where `driver%` is the aggregate change of another (additive) metric, e.g.
//! a 0-100 km/h time shrinking with the total power gain percentage.
//!
//! Bounds are explicit per metric (`floor`, `ceiling`) and applied last. A
//! metric without declared bounds is never clamped: braking distance has a
//! floor, acceleration and lateral grip deliberately do not.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Smallest divisor a dampened metric is ever divided by
pub const MIN_DAMPENING_DIVISOR: f64 = 0.1;

/// How contributions to a metric combine
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum MetricRule {
    #[default]
    Additive,
    /// Divide by a factor growing with another metric's aggregate change
    Dampened { driver: String, weight: f64 },
}

/// Which bound, if any, limited the value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    Floor,
    Ceiling,
}

/// Declaration of one simulated metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub name: String,
    pub label: String,
    pub unit: String,
    pub baseline: f64,
    #[serde(default)]
    pub rule: MetricRule,
    /// Lowest value the metric may report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<f64>,
    /// Highest value the metric may report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling: Option<f64>,
}

impl MetricDefinition {
    pub fn additive(name: &str, label: &str, unit: &str, baseline: f64) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            unit: unit.to_string(),
            baseline,
            rule: MetricRule::Additive,
            floor: None,
            ceiling: None,
        }
    }

    pub fn dampened(mut self, driver: &str, weight: f64) -> Self {
        self.rule = MetricRule::Dampened {
            driver: driver.to_string(),
            weight,
        };
        self
    }

    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = Some(floor);
        self
    }

    pub fn with_ceiling(mut self, ceiling: f64) -> Self {
        self.ceiling = Some(ceiling);
        self
    }

    fn clamp(&self, raw: f64) -> (f64, Option<Bound>) {
        if let Some(floor) = self.floor {
            if raw < floor {
                return (floor, Some(Bound::Floor));
            }
        }
        if let Some(ceiling) = self.ceiling {
            if raw > ceiling {
                return (ceiling, Some(Bound::Ceiling));
            }
        }
        (raw, None)
    }
}

/// Computed state of one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub baseline: f64,
    /// Value before bounds were applied
    pub raw: f64,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<Bound>,
}

impl MetricValue {
    /// Signed change against the baseline, after bounds
    pub fn delta(&self) -> f64 {
        self.value - self.baseline
    }
}

/// Evaluate every declared metric from the summed per-metric contributions.
///
/// Additive metrics are computed first so dampened metrics can read their
/// driver's final (bounded) change.
pub fn evaluate(
    definitions: &[MetricDefinition],
    contributions: &BTreeMap<String, f64>,
) -> BTreeMap<String, MetricValue> {
    let mut values = BTreeMap::new();
    let own = |def: &MetricDefinition| {
        def.baseline + contributions.get(&def.name).copied().unwrap_or(0.0)
    };

    for def in definitions.iter().filter(|d| d.rule == MetricRule::Additive) {
        let raw = own(def);
        let (value, bound) = def.clamp(raw);
        values.insert(
            def.name.clone(),
            MetricValue {
                baseline: def.baseline,
                raw,
                value,
                bound,
            },
        );
    }

    for def in definitions {
        let MetricRule::Dampened { driver, weight } = &def.rule else {
            continue;
        };
        let driver_change = values.get(driver).map(MetricValue::delta).unwrap_or(0.0);
        let divisor = (1.0 + weight * driver_change / 100.0).max(MIN_DAMPENING_DIVISOR);
        let raw = own(def) / divisor;
        let (value, bound) = def.clamp(raw);
        values.insert(
            def.name.clone(),
            MetricValue {
                baseline: def.baseline,
                raw,
                value,
                bound,
            },
        );
    }

    values
}
