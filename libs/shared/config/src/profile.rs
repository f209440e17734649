use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use shared_models::LoadTestError;

/// One ramp segment: over `duration`, move the virtual-user count linearly
/// from the previous stage's target to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub duration: Duration,
    pub target: u32,
}

impl Stage {
    pub const fn new(duration: Duration, target: u32) -> Self {
        Self { duration, target }
    }
}

const fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

const fn mins(m: u64) -> Duration {
    Duration::from_secs(m * 60)
}

/// A pass/fail rule applied to one metric after the run, e.g. `p(95)<2000`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub metric: String,
    pub expression: String,
}

impl ThresholdRule {
    pub fn new(metric: &str, expression: &str) -> Self {
        Self {
            metric: metric.to_string(),
            expression: expression.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadProfile {
    Smoke,
    Load,
    Stress,
    Spike,
}

impl LoadProfile {
    pub fn name(&self) -> &'static str {
        match self {
            LoadProfile::Smoke => "smoke",
            LoadProfile::Load => "load",
            LoadProfile::Stress => "stress",
            LoadProfile::Spike => "spike",
        }
    }

    pub fn stages(&self) -> Vec<Stage> {
        match self {
            LoadProfile::Smoke => vec![
                Stage::new(secs(10), 2),
                Stage::new(secs(30), 2),
                Stage::new(secs(10), 0),
            ],
            LoadProfile::Load => vec![
                Stage::new(mins(2), 50),
                Stage::new(mins(5), 50),
                Stage::new(mins(2), 100),
                Stage::new(mins(5), 100),
                Stage::new(mins(2), 0),
            ],
            LoadProfile::Stress => vec![
                Stage::new(mins(2), 100),
                Stage::new(mins(5), 100),
                Stage::new(mins(2), 200),
                Stage::new(mins(5), 200),
                Stage::new(mins(2), 300),
                Stage::new(mins(5), 300),
                Stage::new(mins(5), 0),
            ],
            LoadProfile::Spike => vec![
                Stage::new(secs(10), 10),
                Stage::new(mins(1), 10),
                Stage::new(secs(10), 500),
                Stage::new(mins(3), 500),
                Stage::new(secs(10), 10),
                Stage::new(mins(3), 10),
                Stage::new(secs(10), 0),
            ],
        }
    }

    pub fn thresholds(&self) -> Vec<ThresholdRule> {
        match self {
            LoadProfile::Smoke | LoadProfile::Load => vec![
                ThresholdRule::new("api_latency", "p(95)<2000"),
                ThresholdRule::new("login_success", "rate>0.95"),
                ThresholdRule::new("consultation_success", "rate>0.90"),
                ThresholdRule::new("payment_success", "rate>0.90"),
                ThresholdRule::new("http_req_failed", "rate<0.10"),
            ],
            LoadProfile::Stress | LoadProfile::Spike => vec![
                ThresholdRule::new("api_latency", "p(95)<5000"),
                ThresholdRule::new("login_success", "rate>0.85"),
                ThresholdRule::new("consultation_success", "rate>0.80"),
                ThresholdRule::new("payment_success", "rate>0.80"),
                ThresholdRule::new("http_req_failed", "rate<0.20"),
            ],
        }
    }

    pub fn peak_vus(&self) -> u32 {
        self.stages().iter().map(|s| s.target).max().unwrap_or(0)
    }

    pub fn total_duration(&self) -> Duration {
        self.stages().iter().map(|s| s.duration).sum()
    }

    pub fn test_plan(&self, graceful_stop: Duration) -> String {
        test_plan(&self.stages(), graceful_stop)
    }
}

/// Renders stages in goose's `--test-plan` form: `users,duration` steps
/// joined by `;`. A plan that does not end at zero users gets one more
/// ramp-down step lasting `graceful_stop`.
pub fn test_plan(stages: &[Stage], graceful_stop: Duration) -> String {
    let mut steps: Vec<String> = stages
        .iter()
        .map(|stage| format!("{},{}", stage.target, plan_duration(stage.duration)))
        .collect();

    if stages.last().is_some_and(|stage| stage.target > 0) {
        steps.push(format!("0,{}", plan_duration(graceful_stop)));
    }

    steps.join(";")
}

// Test plan durations are whole seconds; partial seconds round up.
fn plan_duration(duration: Duration) -> String {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    format!("{}s", secs)
}

impl FromStr for LoadProfile {
    type Err = LoadTestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smoke" => Ok(LoadProfile::Smoke),
            "load" | "average" => Ok(LoadProfile::Load),
            "stress" => Ok(LoadProfile::Stress),
            "spike" => Ok(LoadProfile::Spike),
            other => Err(LoadTestError::Config(format!("unknown load profile '{}'", other))),
        }
    }
}
