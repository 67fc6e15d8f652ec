//! Data models for the MeetPoint library
//!
//! - Location: geographic points and travelers
//! - Flight: priced offers, cost entries and the destination cost table

pub mod flight;
pub mod location;

pub use flight::{CostEntry, DestinationCostTable, DestinationCosts, FlightOffer, RankedDestination};
pub use location::{GeoPoint, Traveler, TravelerInput, normalize_airport_code};
