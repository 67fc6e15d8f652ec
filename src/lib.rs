//! `MeetPoint` - Find where a group of travelers should meet
//!
//! This library locates each traveler's home airport, computes the group's
//! geographic midpoint, looks for airports around it and ranks them by what
//! the whole group pays to fly there.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod midpoint;
pub mod models;
pub mod planner;
pub mod ranking;

// Re-export core types for public API
pub use api::{
    AuthToken, ClientCredentials, ClientSettings, FlightDataClient, FlightDataSource,
    HttpResponse, HttpTransport, ReqwestTransport,
};
pub use config::MeetPointConfig;
pub use error::MeetPointError;
pub use midpoint::{distance_km, midpoint};
pub use models::{
    CostEntry, DestinationCostTable, DestinationCosts, FlightOffer, GeoPoint, RankedDestination,
    Traveler, TravelerInput,
};
pub use planner::{CandidatePolicy, MeetingPlan, MeetingPlanner, Recommendation, TravelerLeg, TripRequest};
pub use ranking::{DEFAULT_TOP_N, cheapest, rank};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, MeetPointError>;
