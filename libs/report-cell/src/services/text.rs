use std::fmt::Write as _;

use metrics_cell::{Channel, ChannelKind, MetricsSnapshot};

/// Condensed end-of-run summary in the usual `name....: value` layout.
pub fn text_summary(snapshot: &MetricsSnapshot) -> String {
    let mut out = String::new();

    let checks_total = snapshot.checks_passed() + snapshot.checks_failed();
    let checks_rate = if checks_total > 0 {
        snapshot.checks_passed() as f64 / checks_total as f64 * 100.0
    } else {
        0.0
    };

    let _ = writeln!(
        out,
        "{:.<28}: {:.2}% ({} passed, {} failed)",
        "checks",
        checks_rate,
        snapshot.checks_passed(),
        snapshot.checks_failed()
    );

    for channel in Channel::ALL.into_iter().filter(|c| c.kind() == ChannelKind::Trend) {
        if let Some(trend) = snapshot.trend(channel) {
            let _ = writeln!(
                out,
                "{:.<28}: avg={:.2}ms min={:.2}ms med={:.2}ms max={:.2}ms p(90)={:.2}ms p(95)={:.2}ms",
                channel.name(),
                trend.avg,
                trend.min,
                trend.med,
                trend.max,
                trend.p90,
                trend.p95
            );
        }
    }

    for channel in Channel::ALL.into_iter().filter(|c| c.kind() == ChannelKind::Rate) {
        if let Some(rate) = snapshot.rate(channel) {
            let _ = writeln!(
                out,
                "{:.<28}: {:.2}% ({} of {})",
                channel.name(),
                rate.rate * 100.0,
                rate.passes,
                rate.total()
            );
        }
    }

    let _ = writeln!(
        out,
        "{:.<28}: {} ({:.2}/s)",
        "http_reqs",
        snapshot.http_reqs,
        snapshot.requests_per_second()
    );
    let _ = writeln!(out, "{:.<28}: {}", "iterations", snapshot.iterations);
    let _ = writeln!(out, "{:.<28}: {}", "vus_max", snapshot.vus_max);

    for threshold in &snapshot.thresholds {
        let mark = if threshold.passed { "✓" } else { "✗" };
        let observed = threshold
            .observed
            .map_or_else(|| "no data".to_string(), |v| format!("{:.4}", v));
        let _ = writeln!(
            out,
            "{} {} {} (observed {})",
            mark, threshold.metric, threshold.expression, observed
        );
    }

    out
}
