use tracing::{info, warn};

use shared_config::ThresholdRule;
use shared_models::LoadTestError;

use crate::models::{to_ms, Channel, ChannelKind, MetricsSnapshot, ThresholdResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregation {
    Avg,
    Min,
    Med,
    Max,
    Percentile(f64),
    Rate,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Comparison {
    fn holds(&self, observed: f64, limit: f64) -> bool {
        match self {
            Comparison::Lt => observed < limit,
            Comparison::Le => observed <= limit,
            Comparison::Gt => observed > limit,
            Comparison::Ge => observed >= limit,
            Comparison::Eq => (observed - limit).abs() < f64::EPSILON,
        }
    }
}

/// A parsed rule such as `api_latency: p(95)<2000` or `login_success: rate>0.95`.
#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    pub channel: Channel,
    pub aggregation: Aggregation,
    pub comparison: Comparison,
    pub limit: f64,
    pub expression: String,
}

impl Threshold {
    pub fn parse(rule: &ThresholdRule) -> Result<Self, LoadTestError> {
        let invalid = |why: &str| {
            LoadTestError::InvalidThreshold(format!("{}: '{}' ({})", rule.metric, rule.expression, why))
        };

        let channel = Channel::from_name(&rule.metric).ok_or_else(|| invalid("unknown metric"))?;

        let expr: String = rule.expression.chars().filter(|c| !c.is_whitespace()).collect();

        // Two-character operators must be tried before their one-character prefixes.
        let (pos, op_len, comparison) = [
            ("<=", Comparison::Le),
            (">=", Comparison::Ge),
            ("==", Comparison::Eq),
            ("<", Comparison::Lt),
            (">", Comparison::Gt),
        ]
        .iter()
        .find_map(|(op, cmp)| expr.find(op).map(|pos| (pos, op.len(), *cmp)))
        .ok_or_else(|| invalid("missing comparison operator"))?;

        let lhs = &expr[..pos];
        let rhs = &expr[pos + op_len..];

        let limit: f64 = rhs.parse().map_err(|_| invalid("limit is not a number"))?;

        let aggregation = match lhs {
            "avg" => Aggregation::Avg,
            "min" => Aggregation::Min,
            "med" => Aggregation::Med,
            "max" => Aggregation::Max,
            "rate" => Aggregation::Rate,
            "count" => Aggregation::Count,
            p if p.starts_with("p(") && p.ends_with(')') => {
                let value: f64 = p[2..p.len() - 1]
                    .parse()
                    .map_err(|_| invalid("percentile is not a number"))?;
                if !(0.0..=100.0).contains(&value) {
                    return Err(invalid("percentile out of range"));
                }
                Aggregation::Percentile(value)
            }
            _ => return Err(invalid("unknown aggregation")),
        };

        let valid_for_kind = match (channel.kind(), aggregation) {
            (ChannelKind::Rate, Aggregation::Rate | Aggregation::Count) => true,
            (ChannelKind::Trend, Aggregation::Rate) => false,
            (ChannelKind::Trend, _) => true,
            (ChannelKind::Rate, _) => false,
        };
        if !valid_for_kind {
            return Err(invalid("aggregation does not apply to this metric"));
        }

        Ok(Self {
            channel,
            aggregation,
            comparison,
            limit,
            expression: rule.expression.clone(),
        })
    }

    fn observe(&self, snapshot: &MetricsSnapshot) -> Option<f64> {
        match self.channel.kind() {
            ChannelKind::Trend => {
                let histogram = snapshot.histogram(self.channel).filter(|h| h.len() > 0)?;
                Some(match self.aggregation {
                    Aggregation::Avg => histogram.mean() / 1000.0,
                    Aggregation::Min => to_ms(histogram.min()),
                    Aggregation::Med => to_ms(histogram.value_at_quantile(0.5)),
                    Aggregation::Max => to_ms(histogram.max()),
                    Aggregation::Count => histogram.len() as f64,
                    Aggregation::Percentile(p) => to_ms(histogram.value_at_quantile(p / 100.0)),
                    Aggregation::Rate => return None,
                })
            }
            ChannelKind::Rate => {
                let rate = snapshot.rate(self.channel).filter(|r| r.total() > 0)?;
                match self.aggregation {
                    Aggregation::Rate => Some(rate.rate),
                    Aggregation::Count => Some(rate.total() as f64),
                    _ => None,
                }
            }
        }
    }

    /// Metrics that received no samples pass with no observed value.
    pub fn evaluate(&self, snapshot: &MetricsSnapshot) -> ThresholdResult {
        let observed = self.observe(snapshot);
        let passed = observed.map_or(true, |value| self.comparison.holds(value, self.limit));

        ThresholdResult {
            metric: self.channel.name().to_string(),
            expression: self.expression.clone(),
            observed,
            passed,
        }
    }
}

/// Parses and evaluates every rule, storing the results on the snapshot.
pub fn evaluate_thresholds(
    snapshot: &mut MetricsSnapshot,
    rules: &[ThresholdRule],
) -> Result<bool, LoadTestError> {
    let thresholds = rules.iter().map(Threshold::parse).collect::<Result<Vec<_>, _>>()?;

    let results: Vec<ThresholdResult> = thresholds.iter().map(|t| t.evaluate(snapshot)).collect();
    snapshot.thresholds = results;

    for result in &snapshot.thresholds {
        if result.passed {
            info!("Threshold {} {} passed", result.metric, result.expression);
        } else {
            warn!(
                "Threshold {} {} failed (observed {:?})",
                result.metric, result.expression, result.observed
            );
        }
    }

    Ok(snapshot.thresholds_passed())
}
