use std::sync::Arc;

use goose::goose::{Scenario, Transaction, TransactionFunction};
use goose::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::context::JourneyContext;
use crate::journeys::run_iteration;

pub const SCENARIO_NAME: &str = "ConsultationPlatform";
pub const ITERATION_NAME: &str = "iteration";

/// The single goose scenario of a run. Each transaction call is one
/// iteration: role draw, fresh session, full journey. Goose repeats it on
/// every user until the test plan ends.
pub fn journey_scenario(ctx: Arc<JourneyContext>) -> Result<Scenario, GooseError> {
    let think_time = ctx.config.think_time;

    let iteration: TransactionFunction = Arc::new(move |user| {
        let ctx = Arc::clone(&ctx);
        Box::pin(async move {
            let mut rng = StdRng::from_entropy();
            run_iteration(&ctx, user, &mut rng).await;
            Ok(())
        })
    });

    let scenario = scenario!(SCENARIO_NAME)
        .register_transaction(Transaction::new(iteration).set_name(ITERATION_NAME));

    if think_time.is_zero() {
        Ok(scenario)
    } else {
        scenario.set_wait_time(think_time, think_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use fixture_cell::FixtureSet;
    use metrics_cell::MetricsCollector;
    use shared_utils::test_utils::TestConfig;

    fn context(think_time: Duration) -> Arc<JourneyContext> {
        let mut config = TestConfig::default().to_load_test_config();
        config.think_time = think_time;

        let mut rng = StdRng::seed_from_u64(1);
        let fixtures = FixtureSet::generate(2, 2, &mut rng).shared();
        let collector = Arc::new(MetricsCollector::new().unwrap());

        Arc::new(JourneyContext::new(Arc::new(config), fixtures, collector).unwrap())
    }

    #[test]
    fn test_single_iteration_transaction() {
        let scenario = journey_scenario(context(Duration::ZERO)).unwrap();

        assert_eq!(scenario.name, SCENARIO_NAME);
        assert_eq!(scenario.transactions.len(), 1);
        assert_eq!(scenario.transactions[0].name, ITERATION_NAME);
    }

    #[test]
    fn test_think_time_becomes_wait_time() {
        let scenario = journey_scenario(context(Duration::from_millis(500))).unwrap();

        assert_eq!(
            scenario.transaction_wait,
            Some((Duration::from_millis(500), Duration::from_millis(500)))
        );
    }
}
