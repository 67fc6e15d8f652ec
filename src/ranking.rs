//! Ranking candidate destinations by what the whole group pays

use tracing::debug;

use crate::models::{DestinationCostTable, RankedDestination};
use crate::{MeetPointError, Result};

/// Number of destinations returned when the caller does not ask for more
pub const DEFAULT_TOP_N: usize = 2;

/// The `top_n` cheapest destinations by aggregate cost.
///
/// Travelers without an entry for a destination add nothing to its total.
/// The sort is stable, so equal totals keep the table's destination order.
pub fn rank(costs: &DestinationCostTable, top_n: usize) -> Result<Vec<RankedDestination>> {
    if costs.is_empty() {
        return Err(MeetPointError::EmptyCostTable);
    }
    if top_n == 0 {
        return Err(MeetPointError::validation(
            "Number of destinations to rank must be positive",
        ));
    }

    let mut ranked: Vec<RankedDestination> = costs
        .destinations()
        .map(|costs| RankedDestination {
            destination: costs.destination.clone(),
            aggregate_cost: costs.aggregate_cost(),
        })
        .collect();

    ranked.sort_by(|a, b| a.aggregate_cost.cmp(&b.aggregate_cost));
    ranked.truncate(top_n);

    debug!(
        "Ranked {} of {} destinations: {:?}",
        ranked.len(),
        costs.len(),
        ranked
            .iter()
            .map(|r| format!("{} ({})", r.destination, r.aggregate_cost))
            .collect::<Vec<_>>()
    );

    Ok(ranked)
}

/// The single cheapest destination
pub fn cheapest(costs: &DestinationCostTable) -> Result<RankedDestination> {
    rank(costs, 1)?
        .into_iter()
        .next()
        .ok_or(MeetPointError::EmptyCostTable)
}
