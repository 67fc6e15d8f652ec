//! Priced flights and the per-destination cost table

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single round-trip offer returned by the flight search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOffer {
    pub destination: String,
    pub total_price: Decimal,
    /// Airport codes visited on the way out, in order
    pub route: Vec<String>,
    /// Airport codes visited on the way back, in order
    pub return_route: Vec<String>,
}

/// The price one traveler pays to reach one destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEntry {
    pub destination: String,
    pub traveler_name: String,
    pub total_price: Decimal,
    pub route: Vec<String>,
    pub return_route: Vec<String>,
}

impl CostEntry {
    #[must_use]
    pub fn from_offer<S: Into<String>>(traveler_name: S, offer: FlightOffer) -> Self {
        Self {
            destination: offer.destination,
            traveler_name: traveler_name.into(),
            total_price: offer.total_price,
            route: offer.route,
            return_route: offer.return_route,
        }
    }
}

/// Every priced traveler for one destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationCosts {
    pub destination: String,
    /// Traveler name to their entry; absent travelers have no route
    pub entries: BTreeMap<String, CostEntry>,
}

impl DestinationCosts {
    /// Sum of every present entry's price, saturating at `Decimal::MAX`
    #[must_use]
    pub fn aggregate_cost(&self) -> Decimal {
        self.entries
            .values()
            .fold(Decimal::ZERO, |total, entry| total.saturating_add(entry.total_price))
    }
}

/// Destination code to traveler costs, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinationCostTable {
    destinations: Vec<DestinationCosts>,
}

impl DestinationCostTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry, replacing any earlier entry for the same
    /// destination and traveler.
    pub fn insert(&mut self, entry: CostEntry) -> Option<CostEntry> {
        let index = match self
            .destinations
            .iter()
            .position(|d| d.destination == entry.destination)
        {
            Some(index) => index,
            None => {
                self.destinations.push(DestinationCosts {
                    destination: entry.destination.clone(),
                    entries: BTreeMap::new(),
                });
                self.destinations.len() - 1
            }
        };
        self.destinations[index]
            .entries
            .insert(entry.traveler_name.clone(), entry)
    }

    #[must_use]
    pub fn get(&self, destination: &str) -> Option<&DestinationCosts> {
        self.destinations
            .iter()
            .find(|d| d.destination == destination)
    }

    /// The entry for a pair, or `None` when that traveler has no route there
    #[must_use]
    pub fn entry(&self, destination: &str, traveler_name: &str) -> Option<&CostEntry> {
        self.get(destination)?.entries.get(traveler_name)
    }

    pub fn destinations(&self) -> impl Iterator<Item = &DestinationCosts> {
        self.destinations.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Order destinations alphabetically so that ranking ties resolve
    /// the same way regardless of pricing order.
    pub fn sort_destinations(&mut self) {
        self.destinations
            .sort_by(|a, b| a.destination.cmp(&b.destination));
    }
}

impl FromIterator<CostEntry> for DestinationCostTable {
    fn from_iter<I: IntoIterator<Item = CostEntry>>(iter: I) -> Self {
        let mut table = Self::new();
        for entry in iter {
            table.insert(entry);
        }
        table
    }
}

/// A destination and the total its travelers pay to get there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedDestination {
    pub destination: String,
    pub aggregate_cost: Decimal,
}
