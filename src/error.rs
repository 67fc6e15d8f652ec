//! Error types and handling for `MeetPoint`

use thiserror::Error;

/// Main error type for the `MeetPoint` library
#[derive(Error, Debug)]
pub enum MeetPointError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Flight data service errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Token issuance or refresh failures
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A midpoint was requested for zero points
    #[error("Cannot compute a midpoint of zero points")]
    EmptyInput,

    /// Ranking was requested over a table with no destinations
    #[error("No destinations to rank")]
    EmptyCostTable,

    /// A traveler's home airport could not be located
    #[error("Could not resolve airport {airport_code} for {traveler}")]
    UnresolvedAirport {
        traveler: String,
        airport_code: String,
    },

    /// No airport was found near the midpoint
    #[error("No candidate airports found near the midpoint")]
    NoCandidates,
}

impl MeetPointError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new authentication error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unresolved_airport<T: Into<String>, C: Into<String>>(traveler: T, code: C) -> Self {
        Self::UnresolvedAirport {
            traveler: traveler.into(),
            airport_code: code.into(),
        }
    }

    /// The user-facing message, when it adds something to `Display`
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        let message = self.user_message();
        (message != self.to_string()).then_some(message)
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            MeetPointError::Config { .. } => {
                "Configuration error. Please check your config file and Amadeus credentials."
                    .to_string()
            }
            MeetPointError::Api { .. } | MeetPointError::Auth { .. } => {
                "Unable to reach the flight data service. Please check your connection and credentials."
                    .to_string()
            }
            MeetPointError::Validation { message } => format!("Invalid input: {message}"),
            MeetPointError::EmptyInput => "At least one traveler is required.".to_string(),
            MeetPointError::EmptyCostTable => {
                "No flights could be priced for any candidate destination.".to_string()
            }
            MeetPointError::UnresolvedAirport { airport_code, .. } => {
                format!("Failed to fetch coordinates for {airport_code}")
            }
            MeetPointError::NoCandidates => {
                "No airport was found close to the group's midpoint.".to_string()
            }
        }
    }
}
