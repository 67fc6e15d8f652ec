//! Meeting planner
//!
//! Resolves every traveler's home airport, finds the group's midpoint, asks
//! the data source for airports around it, prices every traveler to every
//! candidate and ranks the candidates by what the group pays in total.

use std::collections::HashSet;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::api::FlightDataSource;
use crate::midpoint::{distance_km, midpoint};
use crate::models::{
    CostEntry, DestinationCostTable, GeoPoint, RankedDestination, Traveler, TravelerInput,
};
use crate::ranking::{DEFAULT_TOP_N, rank};
use crate::{MeetPointError, Result};

/// Degree offsets probed around the midpoint for candidate airports.
///
/// Each probe asks for the airport nearest to `midpoint + offset`; the
/// candidates are the distinct answers in probe order. This is a heuristic:
/// it does not search for the globally cheapest airport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePolicy {
    offsets: Vec<(f64, f64)>,
}

impl CandidatePolicy {
    #[must_use]
    pub fn new(offsets: Vec<(f64, f64)>) -> Self {
        Self { offsets }
    }

    #[must_use]
    pub fn offsets(&self) -> &[(f64, f64)] {
        &self.offsets
    }

    /// Distinct nearest airports for every offset, in offset order
    pub fn probe<S: FlightDataSource + ?Sized>(&self, source: &S, center: GeoPoint) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::new();
        for &(delta_latitude, delta_longitude) in &self.offsets {
            let probe = center.offset(delta_latitude, delta_longitude);
            match source.nearest_airport(probe) {
                Some(code) if !candidates.contains(&code) => candidates.push(code),
                Some(code) => debug!("Probe {} found {} again", probe.format_coordinates(), code),
                None => debug!("No airport near {}", probe.format_coordinates()),
            }
        }
        candidates
    }
}

impl Default for CandidatePolicy {
    fn default() -> Self {
        Self::new(vec![(0.0, 0.0), (5.0, 5.0), (-5.0, -5.0)])
    }
}

/// Everything needed to plan one trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub travelers: Vec<TravelerInput>,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub top_n: usize,
}

impl TripRequest {
    pub fn new(travelers: Vec<TravelerInput>, departure_date: NaiveDate, return_date: NaiveDate) -> Self {
        Self {
            travelers,
            departure_date,
            return_date,
            top_n: DEFAULT_TOP_N,
        }
    }

    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Whether the trip leaves after `today`
    #[must_use]
    pub fn departs_after(&self, today: NaiveDate) -> bool {
        self.departure_date > today
    }

    /// Check the request and return normalized travelers.
    ///
    /// A departure today or earlier is allowed but logged, since the service
    /// rarely has fares for it.
    pub fn validate(&self) -> Result<Vec<TravelerInput>> {
        if self.travelers.is_empty() {
            return Err(MeetPointError::validation("At least one traveler is required"));
        }
        if self.return_date < self.departure_date {
            return Err(MeetPointError::validation(format!(
                "Return date {} is before departure date {}",
                self.return_date, self.departure_date
            )));
        }
        if self.top_n == 0 {
            return Err(MeetPointError::validation(
                "Number of destinations to rank must be positive",
            ));
        }
        if !self.departs_after(Local::now().date_naive()) {
            warn!(
                "Departure date {} is not in the future, please select a future date",
                self.departure_date
            );
        }

        let travelers = self
            .travelers
            .iter()
            .map(TravelerInput::normalized)
            .collect::<Result<Vec<_>>>()?;

        let mut names = HashSet::new();
        for traveler in &travelers {
            if !names.insert(traveler.name.as_str()) {
                return Err(MeetPointError::validation(format!(
                    "Traveler name '{}' is used more than once",
                    traveler.name
                )));
            }
        }
        Ok(travelers)
    }
}

/// A ranked destination with the context shown to the group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub ranked: RankedDestination,
    /// Airport coordinates, when the lookup succeeded
    pub location: Option<GeoPoint>,
    pub distance_from_midpoint_km: Option<f64>,
}

/// One traveler's trip to a destination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelerLeg<'a> {
    pub traveler: &'a Traveler,
    /// `None` when no route could be priced
    pub cost: Option<&'a CostEntry>,
    /// Price minus the destination's average cost per traveler
    pub delta_from_average: Option<Decimal>,
}

/// The outcome of planning a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingPlan {
    pub travelers: Vec<Traveler>,
    pub midpoint: GeoPoint,
    pub candidates: Vec<String>,
    pub costs: DestinationCostTable,
    pub recommendations: Vec<Recommendation>,
}

impl MeetingPlan {
    /// The cheapest destination
    #[must_use]
    pub fn best(&self) -> Option<&Recommendation> {
        self.recommendations.first()
    }

    /// Aggregate cost split evenly over every traveler in the group
    #[must_use]
    pub fn average_cost(&self, destination: &str) -> Option<Decimal> {
        let costs = self.costs.get(destination)?;
        let travelers = Decimal::from(self.travelers.len());
        (!travelers.is_zero()).then(|| costs.aggregate_cost() / travelers)
    }

    /// Per-traveler legs to `destination`, in traveler order
    #[must_use]
    pub fn breakdown(&self, destination: &str) -> Vec<TravelerLeg<'_>> {
        let average = self.average_cost(destination);
        self.travelers
            .iter()
            .map(|traveler| {
                let cost = self.costs.entry(destination, &traveler.name);
                TravelerLeg {
                    traveler,
                    cost,
                    delta_from_average: cost
                        .zip(average)
                        .map(|(entry, average)| entry.total_price - average),
                }
            })
            .collect()
    }
}

/// Plans trips against a flight data source
pub struct MeetingPlanner<'a, S: FlightDataSource + ?Sized> {
    source: &'a S,
    policy: CandidatePolicy,
}

impl<'a, S: FlightDataSource + ?Sized> MeetingPlanner<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            policy: CandidatePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: CandidatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Look up every traveler's home airport, failing on the first miss
    pub fn resolve_travelers(&self, inputs: Vec<TravelerInput>) -> Result<Vec<Traveler>> {
        inputs
            .into_iter()
            .map(|input| match self.source.airport_coordinates(&input.origin_airport) {
                Some(home) => {
                    debug!(
                        "Resolved {} ({}) at {}",
                        input.name,
                        input.origin_airport,
                        home.format_coordinates()
                    );
                    Ok(Traveler::new(input, home))
                }
                None => {
                    warn!("Failed to fetch coordinates for {}", input.origin_airport);
                    Err(MeetPointError::unresolved_airport(
                        input.name,
                        input.origin_airport,
                    ))
                }
            })
            .collect()
    }

    /// Price every traveler to every candidate.
    ///
    /// The first offer returned is used. Pairs without an offer are left out
    /// of the table, as are candidates nobody could be priced to.
    pub fn price_candidates(
        &self,
        travelers: &[Traveler],
        candidates: &[String],
        departure_date: NaiveDate,
        return_date: NaiveDate,
    ) -> DestinationCostTable {
        let mut table = DestinationCostTable::new();
        for destination in candidates {
            for traveler in travelers {
                let offer = self
                    .source
                    .flight_offers(&traveler.origin_airport, destination, departure_date, return_date)
                    .into_iter()
                    .next();
                match offer {
                    Some(offer) => {
                        table.insert(CostEntry::from_offer(traveler.name.clone(), offer));
                    }
                    None => info!(
                        "No route available for {} from {} to {}",
                        traveler.name, traveler.origin_airport, destination
                    ),
                }
            }
        }
        table
    }

    /// Run the whole planning pipeline
    #[instrument(skip(self, request), fields(travelers = request.travelers.len()))]
    pub fn plan(&self, request: &TripRequest) -> Result<MeetingPlan> {
        let inputs = request.validate()?;

        let travelers = self.resolve_travelers(inputs)?;
        let homes: Vec<GeoPoint> = travelers.iter().map(|t| t.home).collect();
        let center = midpoint(&homes)?;
        info!("Geographic midpoint is {}", center.format_coordinates());

        let candidates = self.policy.probe(self.source, center);
        if candidates.is_empty() {
            return Err(MeetPointError::NoCandidates);
        }
        info!("The midpoint airports are: {:?}", candidates);

        let costs = self.price_candidates(
            &travelers,
            &candidates,
            request.departure_date,
            request.return_date,
        );

        let recommendations = rank(&costs, request.top_n)?
            .into_iter()
            .map(|ranked| {
                let location = self.source.airport_coordinates(&ranked.destination);
                Recommendation {
                    distance_from_midpoint_km: location.map(|l| distance_km(&center, &l)),
                    location,
                    ranked,
                }
            })
            .collect();

        Ok(MeetingPlan {
            travelers,
            midpoint: center,
            candidates,
            costs,
            recommendations,
        })
    }
}
