//! Flight data client for the Amadeus self-service API
//!
//! The client lazily obtains a bearer token with the client-credentials
//! grant, looks up airports and prices round trips. Every lookup goes through
//! [`FlightDataClient::send_authorized`]: on a 401 the token is replaced once
//! and the request is retried once. Service failures never escape as errors;
//! they are logged and turned into `None` or an empty list.

pub mod amadeus;
pub mod auth;
pub mod transport;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, error, info, instrument, warn};

use crate::config::AmadeusConfig;
use crate::models::{FlightOffer, GeoPoint};
use crate::{MeetPointError, Result};

pub use auth::{AuthToken, ClientCredentials};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const LOCATIONS_PATH: &str = "/v1/reference-data/locations";
const NEAREST_AIRPORTS_PATH: &str = "/v1/reference-data/locations/airports";
const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";

/// Lookups the meeting planner needs from a flight data provider
pub trait FlightDataSource {
    /// Coordinates of an airport, `None` when it cannot be found
    fn airport_coordinates(&self, airport_code: &str) -> Option<GeoPoint>;

    /// Code of the airport closest to a point, `None` when there is none
    fn nearest_airport(&self, point: GeoPoint) -> Option<String>;

    /// Round-trip offers, cheapest first; empty when there is no route
    fn flight_offers(
        &self,
        origin: &str,
        destination: &str,
        departure_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Vec<FlightOffer>;
}

/// Endpoint and search scope settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    /// Country the airport keyword search is restricted to
    pub country_code: String,
    /// Currency flight prices are quoted in
    pub currency_code: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "https://test.api.amadeus.com".to_string(),
            country_code: "US".to_string(),
            currency_code: "USD".to_string(),
        }
    }
}

impl From<&AmadeusConfig> for ClientSettings {
    fn from(config: &AmadeusConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country_code: config.country_code.clone(),
            currency_code: config.currency_code.clone(),
        }
    }
}

/// Stateful client owning the bearer token
pub struct FlightDataClient<T = ReqwestTransport> {
    transport: T,
    credentials: ClientCredentials,
    settings: ClientSettings,
    token: Mutex<Option<AuthToken>>,
}

impl FlightDataClient<ReqwestTransport> {
    /// Build a client talking HTTP with the configured timeout
    pub fn from_config(config: &AmadeusConfig) -> anyhow::Result<Self> {
        let credentials = config.credentials()?;
        let transport =
            ReqwestTransport::new(Duration::from_secs(config.timeout_seconds.into()))?;
        Ok(Self::with_transport(
            transport,
            credentials,
            ClientSettings::from(config),
        ))
    }
}

impl<T: HttpTransport> FlightDataClient<T> {
    pub fn with_transport(transport: T, credentials: ClientCredentials, settings: ClientSettings) -> Self {
        Self {
            transport,
            credentials,
            settings,
            token: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token_slot().is_some()
    }

    /// The held token, requesting one first if none is held
    pub fn ensure_token(&self) -> Result<AuthToken> {
        let mut slot = self.token_slot();
        if let Some(token) = slot.as_ref() {
            return Ok(token.clone());
        }

        info!("Getting access token...");
        let token = self.request_token()?;
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Replace a token the service rejected.
    ///
    /// When another caller has already swapped `stale` out, its newer token
    /// is returned instead of requesting yet another one.
    fn refresh_token(&self, stale: &AuthToken) -> Result<AuthToken> {
        let mut slot = self.token_slot();
        if let Some(current) = slot.as_ref()
            && current != stale
        {
            debug!("Access token was already refreshed");
            return Ok(current.clone());
        }

        *slot = None;
        info!("Refreshing access token...");
        let token = self.request_token()?;
        *slot = Some(token.clone());
        Ok(token)
    }

    fn request_token(&self) -> Result<AuthToken> {
        let url = self.url(TOKEN_PATH);
        let response = self
            .transport
            .post_form(&url, &self.credentials.grant_form())
            .map_err(|e| MeetPointError::auth(format!("Token request failed: {e:#}")))?;

        if !response.is_success() {
            return Err(MeetPointError::auth(format!(
                "Token endpoint returned status {}",
                response.status
            )));
        }

        let token: auth::TokenResponse = amadeus::parse_json(&response.body, "token")
            .map_err(|e| MeetPointError::auth(format!("{e:#}")))?;
        if token.access_token.is_empty() {
            return Err(MeetPointError::auth("Token endpoint returned an empty token"));
        }
        debug!("Access token obtained (expires in {:?}s)", token.expires_in);
        Ok(AuthToken::new(token.access_token))
    }

    fn token_slot(&self) -> MutexGuard<'_, Option<AuthToken>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url, path)
    }

    /// Authenticated GET with a single token refresh on 401.
    ///
    /// Any failure is logged and becomes `None`; see [`Self::authorized_get`]
    /// for what counts as one.
    fn send_authorized<R>(
        &self,
        operation: &str,
        url: &str,
        query: &[(&str, String)],
        parse: impl Fn(&str) -> anyhow::Result<R>,
    ) -> Option<R> {
        match self.authorized_get(url, query, parse) {
            Ok(value) => Some(value),
            Err(e @ MeetPointError::Auth { .. }) => {
                error!("Failed to {}: {}", operation, e);
                None
            }
            Err(e) => {
                warn!("Failed to {}: {}", operation, e);
                None
            }
        }
    }

    /// Fails with `Auth` when no token can be obtained, and with `Api` when
    /// the request fails, the status is neither success nor 401, the retry
    /// after a refresh does not succeed, or `parse` rejects the body.
    fn authorized_get<R>(
        &self,
        url: &str,
        query: &[(&str, String)],
        parse: impl Fn(&str) -> anyhow::Result<R>,
    ) -> Result<R> {
        let token = self.ensure_token()?;
        let mut response = self.send_get(url, query, &token)?;

        if response.is_unauthorized() {
            let token = self.refresh_token(&token)?;
            response = self.send_get(url, query, &token)?;
            if !response.is_success() {
                return Err(MeetPointError::api(format!(
                    "status {} after refreshing token",
                    response.status
                )));
            }
        } else if !response.is_success() {
            return Err(MeetPointError::api(format!("status {}", response.status)));
        }

        parse(&response.body).map_err(|e| MeetPointError::api(format!("{e:#}")))
    }

    fn send_get(&self, url: &str, query: &[(&str, String)], token: &AuthToken) -> Result<HttpResponse> {
        self.transport
            .get(url, query, token.as_str())
            .map_err(|e| MeetPointError::api(format!("{e:#}")))
    }

    /// Coordinates of an airport within the configured country
    #[instrument(skip(self))]
    pub fn get_airport_coordinates(&self, airport_code: &str) -> Option<GeoPoint> {
        info!("Getting coordinates for {}", airport_code);
        let query = [
            ("subType", "AIRPORT".to_string()),
            ("keyword", airport_code.to_string()),
            ("countryCode", self.settings.country_code.clone()),
        ];
        self.send_authorized(
            "get airport coordinates",
            &self.url(LOCATIONS_PATH),
            &query,
            amadeus::first_geocode,
        )
        .flatten()
    }

    /// Code of the airport the service ranks closest to a point
    #[instrument(skip(self))]
    pub fn get_nearest_airport(&self, latitude: f64, longitude: f64) -> Option<String> {
        info!("Getting closest airport to {}, {}", latitude, longitude);
        let query = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
        ];
        self.send_authorized(
            "get nearest airport",
            &self.url(NEAREST_AIRPORTS_PATH),
            &query,
            amadeus::first_iata_code,
        )
        .flatten()
    }

    /// The cheapest round trip for one adult
    #[instrument(skip(self))]
    pub fn get_flight_offers(
        &self,
        origin: &str,
        destination: &str,
        departure_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Vec<FlightOffer> {
        info!(
            "Getting flight offers {} -> {} departing {} and returning {}",
            origin, destination, departure_date, return_date
        );
        let query = [
            ("originLocationCode", origin.to_string()),
            ("destinationLocationCode", destination.to_string()),
            ("departureDate", departure_date.format("%Y-%m-%d").to_string()),
            ("returnDate", return_date.format("%Y-%m-%d").to_string()),
            ("adults", "1".to_string()),
            ("currencyCode", self.settings.currency_code.clone()),
            ("max", "1".to_string()),
        ];
        self.send_authorized(
            "get flight offers",
            &self.url(FLIGHT_OFFERS_PATH),
            &query,
            |body| amadeus::flight_offers(body, destination),
        )
        .unwrap_or_default()
    }
}

impl<T: HttpTransport> FlightDataSource for FlightDataClient<T> {
    fn airport_coordinates(&self, airport_code: &str) -> Option<GeoPoint> {
        self.get_airport_coordinates(airport_code)
    }

    fn nearest_airport(&self, point: GeoPoint) -> Option<String> {
        self.get_nearest_airport(point.latitude, point.longitude)
    }

    fn flight_offers(
        &self,
        origin: &str,
        destination: &str,
        departure_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Vec<FlightOffer> {
        self.get_flight_offers(origin, destination, departure_date, return_date)
    }
}
