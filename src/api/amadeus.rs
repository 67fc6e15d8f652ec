//! Amadeus response payloads and their conversion into domain types

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::models::{FlightOffer, GeoPoint};

/// Largest round-trip total accepted from the service
pub(crate) const MAX_OFFER_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Deserialize a JSON body, naming the payload in the error
pub(crate) fn parse_json<T: DeserializeOwned>(body: &str, payload: &str) -> Result<T> {
    serde_json::from_str(body).with_context(|| format!("Failed to parse {payload} response"))
}

#[derive(Debug, Deserialize)]
pub(crate) struct LocationsResponse {
    #[serde(default)]
    pub data: Vec<LocationRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LocationRecord {
    pub iata_code: Option<String>,
    pub geo_code: Option<GeoCode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeoCode {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlightOffersResponse {
    #[serde(default)]
    pub data: Vec<FlightOfferRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlightOfferRecord {
    pub price: OfferPrice,
    #[serde(default)]
    pub itineraries: Vec<Itinerary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OfferPrice {
    pub total: Decimal,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Itinerary {
    #[serde(default)]
    pub segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Segment {
    pub departure: SegmentEndpoint,
    pub arrival: SegmentEndpoint,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SegmentEndpoint {
    pub iata_code: String,
}

/// Coordinates of the first location match, `None` when nothing matched
pub(crate) fn first_geocode(body: &str) -> Result<Option<GeoPoint>> {
    let response: LocationsResponse = parse_json(body, "location search")?;
    let Some(first) = response.data.into_iter().next() else {
        return Ok(None);
    };
    let geo_code = first
        .geo_code
        .context("First location match has no geoCode")?;
    let point = GeoPoint::new(geo_code.latitude, geo_code.longitude)?;
    Ok(Some(point))
}

/// IATA code of the first airport match, `None` when nothing matched
pub(crate) fn first_iata_code(body: &str) -> Result<Option<String>> {
    let response: LocationsResponse = parse_json(body, "nearest airport")?;
    match response.data.into_iter().next() {
        Some(first) => first
            .iata_code
            .map(Some)
            .context("First airport match has no iataCode"),
        None => Ok(None),
    }
}

/// Every offer in a flight-offer search response, in response order
pub(crate) fn flight_offers(body: &str, destination: &str) -> Result<Vec<FlightOffer>> {
    let response: FlightOffersResponse = parse_json(body, "flight offer search")?;
    response
        .data
        .into_iter()
        .map(|offer| {
            if offer.price.total.is_sign_negative() {
                anyhow::bail!("Flight offer has a negative total price: {}", offer.price.total);
            }
            if offer.price.total > MAX_OFFER_PRICE {
                anyhow::bail!("Flight offer total {} is out of range", offer.price.total);
            }
            let mut itineraries = offer.itineraries.iter().map(itinerary_path);
            Ok(FlightOffer {
                destination: destination.to_string(),
                total_price: offer.price.total,
                route: itineraries.next().unwrap_or_default(),
                return_route: itineraries.next().unwrap_or_default(),
            })
        })
        .collect()
}

/// Airport codes visited by an itinerary, in order.
///
/// A connecting segment departs from the airport the previous one arrived at,
/// so a code equal to the one just before it is skipped.
fn itinerary_path(itinerary: &Itinerary) -> Vec<String> {
    let mut path: Vec<String> = Vec::with_capacity(itinerary.segments.len() + 1);
    for segment in &itinerary.segments {
        for code in [&segment.departure.iata_code, &segment.arrival.iata_code] {
            if path.last() != Some(code) {
                path.push(code.clone());
            }
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const ROUND_TRIP: &str = r#"{
        "meta": {"count": 1},
        "data": [{
            "type": "flight-offer",
            "id": "1",
            "itineraries": [
                {"duration": "PT7H", "segments": [
                    {"departure": {"iataCode": "BOS", "at": "2026-11-01T08:00:00"}, "arrival": {"iataCode": "ORD"}, "carrierCode": "UA"},
                    {"departure": {"iataCode": "ORD"}, "arrival": {"iataCode": "DEN"}, "carrierCode": "UA"}
                ]},
                {"duration": "PT6H", "segments": [
                    {"departure": {"iataCode": "DEN"}, "arrival": {"iataCode": "IAD"}},
                    {"departure": {"iataCode": "IAD"}, "arrival": {"iataCode": "BOS"}}
                ]}
            ],
            "price": {"currency": "USD", "total": "355.34", "base": "290.00"}
        }]
    }"#;

    #[test]
    fn test_round_trip_routes() {
        let offers = flight_offers(ROUND_TRIP, "DEN").unwrap();
        assert_eq!(offers.len(), 1);
        let offer = &offers[0];
        assert_eq!(offer.destination, "DEN");
        assert_eq!(offer.route, ["BOS", "ORD", "DEN"]);
        assert_eq!(offer.return_route, ["DEN", "IAD", "BOS"]);
        assert_eq!(offer.total_price, Decimal::from_str("355.34").unwrap());
    }

    #[test]
    fn test_one_way_offer_has_empty_return_route() {
        let body = r#"{"data":[{"price":{"total":"99.10"},"itineraries":[
            {"segments":[{"departure":{"iataCode":"SEA"},"arrival":{"iataCode":"SFO"}}]}
        ]}]}"#;
        let offers = flight_offers(body, "SFO").unwrap();
        assert_eq!(offers[0].route, ["SEA", "SFO"]);
        assert!(offers[0].return_route.is_empty());
    }

    #[test]
    fn test_only_consecutive_repeats_are_skipped() {
        let body = r#"{"data":[{"price":{"total":"410.00"},"itineraries":[
            {"segments":[
                {"departure":{"iataCode":"JFK"},"arrival":{"iataCode":"ORD"}},
                {"departure":{"iataCode":"ORD"},"arrival":{"iataCode":"JFK"}},
                {"departure":{"iataCode":"JFK"},"arrival":{"iataCode":"MIA"}}
            ]}
        ]}]}"#;
        let offers = flight_offers(body, "MIA").unwrap();
        assert_eq!(offers[0].route, ["JFK", "ORD", "JFK", "MIA"]);
    }

    #[test]
    fn test_no_offers() {
        assert!(flight_offers(r#"{"meta":{"count":0},"data":[]}"#, "DEN").unwrap().is_empty());
        assert!(flight_offers(r#"{"meta":{"count":0}}"#, "DEN").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_offer_is_an_error() {
        assert!(flight_offers(r#"{"data":[{"itineraries":[]}]}"#, "DEN").is_err());
        assert!(flight_offers("<html>", "DEN").is_err());
        assert!(flight_offers(r#"{"data":[{"price":{"total":"-1.00"}}]}"#, "DEN").is_err());
        assert!(
            flight_offers(
                r#"{"data":[{"price":{"total":"79228162514264337593543950335"}}]}"#,
                "DEN"
            )
            .is_err()
        );
        assert!(flight_offers(r#"{"data":[{"price":{"total":"1000000.00"}}]}"#, "DEN").is_ok());
    }

    #[test]
    fn test_first_geocode() {
        let body = r#"{"data":[
            {"type":"location","subType":"AIRPORT","name":"JOHN F KENNEDY INTL","iataCode":"JFK","geoCode":{"latitude":40.63975,"longitude":-73.77893}},
            {"type":"location","subType":"AIRPORT","iataCode":"XXX","geoCode":{"latitude":1.0,"longitude":1.0}}
        ]}"#;
        let point = first_geocode(body).unwrap().unwrap();
        assert_eq!(point.latitude, 40.63975);
        assert_eq!(point.longitude, -73.77893);

        assert_eq!(first_geocode(r#"{"data":[]}"#).unwrap(), None);
        assert!(first_geocode(r#"{"data":[{"iataCode":"JFK"}]}"#).is_err());
    }

    #[test]
    fn test_first_iata_code() {
        let body = r#"{"data":[
            {"subType":"AIRPORT","iataCode":"DEN","distance":{"value":12,"unit":"KM"}},
            {"subType":"AIRPORT","iataCode":"COS"}
        ]}"#;
        assert_eq!(first_iata_code(body).unwrap(), Some("DEN".to_string()));
        assert_eq!(first_iata_code(r#"{"data":[]}"#).unwrap(), None);
    }
}
