//! End-to-end planning through the flight data client with an in-memory
//! Amadeus stand-in

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use meetpoint::{
    ClientCredentials, ClientSettings, FlightDataClient, HttpResponse, HttpTransport,
    MeetPointError, MeetingPlanner, TravelerInput, TripRequest,
};

/// Answers lookups from tables instead of a queue so call order does not
/// matter, except for nearest-airport probes which are answered in turn.
struct FakeAmadeus {
    airports: HashMap<&'static str, (f64, f64)>,
    nearest: Mutex<VecDeque<&'static str>>,
    prices: HashMap<(&'static str, &'static str), &'static str>,
    /// Reject the next flight search with 401 once
    expire_token_once: AtomicBool,
    tokens_issued: AtomicUsize,
}

impl FakeAmadeus {
    fn new() -> Self {
        Self {
            airports: HashMap::from([
                ("JFK", (40.63975, -73.77893)),
                ("LAX", (33.94254, -118.40807)),
                ("DEN", (39.85841, -104.667)),
                ("ORD", (41.9786, -87.9048)),
            ]),
            nearest: Mutex::new(VecDeque::from(["DEN", "ORD", "DEN"])),
            prices: HashMap::from([
                (("JFK", "DEN"), "300.00"),
                (("LAX", "DEN"), "200.00"),
                (("JFK", "ORD"), "150.00"),
                (("LAX", "ORD"), "400.50"),
            ]),
            expire_token_once: AtomicBool::new(false),
            tokens_issued: AtomicUsize::new(0),
        }
    }

    fn tokens_issued(&self) -> usize {
        self.tokens_issued.load(Ordering::SeqCst)
    }

    fn value<'a>(query: &'a [(&str, String)], key: &str) -> &'a str {
        query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    }
}

impl HttpTransport for FakeAmadeus {
    fn get(&self, url: &str, query: &[(&str, String)], bearer_token: &str) -> anyhow::Result<HttpResponse> {
        assert!(bearer_token.starts_with("token-"));

        if url.ends_with("/v1/reference-data/locations/airports") {
            let code = self.nearest.lock().unwrap().pop_front();
            let body = match code {
                Some(code) => format!(r#"{{"data":[{{"subType":"AIRPORT","iataCode":"{code}"}}]}}"#),
                None => r#"{"data":[]}"#.to_string(),
            };
            return Ok(HttpResponse::new(200, body));
        }

        if url.ends_with("/v1/reference-data/locations") {
            let keyword = Self::value(query, "keyword");
            let body = match self.airports.get(keyword) {
                Some((latitude, longitude)) => format!(
                    r#"{{"data":[{{"iataCode":"{keyword}","geoCode":{{"latitude":{latitude},"longitude":{longitude}}}}}]}}"#
                ),
                None => r#"{"data":[]}"#.to_string(),
            };
            return Ok(HttpResponse::new(200, body));
        }

        if url.ends_with("/v2/shopping/flight-offers") {
            if self.expire_token_once.swap(false, Ordering::SeqCst) {
                return Ok(HttpResponse::new(401, r#"{"errors":[{"code":38190}]}"#));
            }
            let origin = Self::value(query, "originLocationCode");
            let destination = Self::value(query, "destinationLocationCode");
            let total = self
                .prices
                .iter()
                .find(|((o, d), _)| *o == origin && *d == destination)
                .map(|(_, total)| *total);
            let body = match total {
                Some(total) => format!(
                    r#"{{"data":[{{"price":{{"currency":"USD","total":"{total}"}},"itineraries":[
                        {{"segments":[{{"departure":{{"iataCode":"{origin}"}},"arrival":{{"iataCode":"{destination}"}}}}]}},
                        {{"segments":[{{"departure":{{"iataCode":"{destination}"}},"arrival":{{"iataCode":"{origin}"}}}}]}}
                    ]}}]}}"#
                ),
                None => r#"{"meta":{"count":0},"data":[]}"#.to_string(),
            };
            return Ok(HttpResponse::new(200, body));
        }

        Ok(HttpResponse::new(404, "not found"))
    }

    fn post_form(&self, _url: &str, _form: &[(&str, &str)]) -> anyhow::Result<HttpResponse> {
        let n = self.tokens_issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(HttpResponse::new(
            200,
            format!(r#"{{"access_token":"token-{n}","expires_in":1799}}"#),
        ))
    }
}

fn client(fake: FakeAmadeus) -> FlightDataClient<FakeAmadeus> {
    FlightDataClient::with_transport(
        fake,
        ClientCredentials::new("id", "secret"),
        ClientSettings {
            base_url: "https://api.test".to_string(),
            ..ClientSettings::default()
        },
    )
}

fn request(travelers: &[(&str, &str)]) -> TripRequest {
    TripRequest::new(
        travelers
            .iter()
            .map(|&(name, code)| TravelerInput::new(name, code))
            .collect(),
        NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 11, 8).unwrap(),
    )
}

fn price(value: &str) -> Decimal {
    value.parse().unwrap()
}

#[test]
fn test_plan_across_the_continent() {
    let client = client(FakeAmadeus::new());
    let plan = MeetingPlanner::new(&client)
        .plan(&request(&[("Alice", "jfk"), ("Bob", "LAX")]))
        .unwrap();

    assert_eq!(plan.candidates, ["DEN", "ORD"]);
    assert!(plan.midpoint.latitude > 33.0 && plan.midpoint.latitude < 42.0);
    assert!(plan.midpoint.longitude < -73.0 && plan.midpoint.longitude > -119.0);

    let ranked: Vec<_> = plan
        .recommendations
        .iter()
        .map(|r| (r.ranked.destination.as_str(), r.ranked.aggregate_cost))
        .collect();
    assert_eq!(ranked, vec![("DEN", price("500.00")), ("ORD", price("550.50"))]);

    let best = plan.best().unwrap();
    assert!(best.location.is_some());
    assert!(best.distance_from_midpoint_km.unwrap() < 1500.0);

    let legs = plan.breakdown("DEN");
    assert_eq!(legs[0].cost.unwrap().route, ["JFK", "DEN"]);
    assert_eq!(legs[1].cost.unwrap().return_route, ["DEN", "LAX"]);
    assert_eq!(plan.average_cost("DEN"), Some(price("250")));
}

#[test]
fn test_expired_token_mid_plan_is_refreshed_once() {
    let fake = FakeAmadeus::new();
    fake.expire_token_once.store(true, Ordering::SeqCst);
    let client = client(fake);

    let plan = MeetingPlanner::new(&client)
        .plan(&request(&[("Alice", "JFK"), ("Bob", "LAX")]))
        .unwrap();

    assert_eq!(plan.recommendations.len(), 2);
    assert_eq!(plan.costs.len(), 2);
    assert!(client.has_token());
    assert_eq!(client.transport().tokens_issued(), 2);
}

#[test]
fn test_absurd_price_is_treated_as_no_route() {
    let mut fake = FakeAmadeus::new();
    fake.prices
        .insert(("LAX", "DEN"), "79228162514264337593543950335");
    let client = client(fake);

    let plan = MeetingPlanner::new(&client)
        .plan(&request(&[("Alice", "JFK"), ("Bob", "LAX")]))
        .unwrap();

    let den = plan.breakdown("DEN");
    assert!(den[0].cost.is_some());
    assert!(den[1].cost.is_none());
    assert_eq!(plan.best().unwrap().ranked.aggregate_cost, price("300.00"));
}

#[test]
fn test_missing_route_is_left_out_of_the_total() {
    let mut fake = FakeAmadeus::new();
    fake.prices.remove(&("LAX", "ORD"));
    let client = client(fake);

    let plan = MeetingPlanner::new(&client)
        .plan(&request(&[("Alice", "JFK"), ("Bob", "LAX")]))
        .unwrap();

    let best = plan.best().unwrap();
    assert_eq!(best.ranked.destination, "ORD");
    assert_eq!(best.ranked.aggregate_cost, price("150.00"));

    let legs = plan.breakdown("ORD");
    assert!(legs[0].cost.is_some());
    assert!(legs[1].cost.is_none());
}

#[test]
fn test_unknown_home_airport_stops_before_searching() {
    let client = client(FakeAmadeus::new());
    let result = MeetingPlanner::new(&client).plan(&request(&[("Alice", "JFK"), ("Cy", "XYZ")]));

    assert!(matches!(
        result,
        Err(MeetPointError::UnresolvedAirport { ref airport_code, .. }) if airport_code == "XYZ"
    ));
}

#[test]
fn test_top_n_limits_recommendations() {
    let client = client(FakeAmadeus::new());
    let plan = MeetingPlanner::new(&client)
        .plan(&request(&[("Alice", "JFK"), ("Bob", "LAX")]).with_top_n(1))
        .unwrap();

    assert_eq!(plan.recommendations.len(), 1);
    assert_eq!(plan.costs.len(), 2);
}
