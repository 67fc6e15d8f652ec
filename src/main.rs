use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::debug;

use meetpoint::logging::init_tracing;
use meetpoint::{
    FlightDataClient, GeoPoint, MeetPointConfig, MeetPointError, MeetingPlan, MeetingPlanner,
    TravelerInput, TripRequest, models::normalize_airport_code,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Find the cheapest airport for a group to meet at")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank meeting airports for a group of travelers.
    Plan {
        /// Traveler and home airport, e.g. `Alice=JFK`. Repeat per traveler.
        #[arg(long = "traveler", short = 't', required = true, value_parser = parse_traveler)]
        travelers: Vec<TravelerInput>,
        /// Outbound date (YYYY-MM-DD).
        #[arg(long = "depart")]
        departure_date: NaiveDate,
        /// Return date (YYYY-MM-DD).
        #[arg(long = "return")]
        return_date: NaiveDate,
        /// Number of destinations to show.
        #[arg(long)]
        top: Option<usize>,
        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the coordinates of an airport.
    Coords {
        /// IATA airport code.
        code: String,
    },
    /// Print the airport closest to a point.
    Nearest {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
}

fn parse_traveler(value: &str) -> std::result::Result<TravelerInput, String> {
    TravelerInput::parse(value).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = MeetPointConfig::load_from_path(cli.config.clone())?;
    init_tracing(&config.logging);
    debug!("Loaded configuration: {:?}", config);

    let client = FlightDataClient::from_config(&config.amadeus)
        .context("Failed to create flight data client")?;

    match cli.command {
        Command::Plan {
            travelers,
            departure_date,
            return_date,
            top,
            json,
        } => {
            let request = TripRequest::new(travelers, departure_date, return_date)
                .with_top_n(top.unwrap_or(config.search.top_n));
            let planner =
                MeetingPlanner::new(&client).with_policy(config.search.candidate_policy());
            let plan = planner.plan(&request).map_err(report)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_plan(&plan, &config.amadeus.currency_code);
            }
        }
        Command::Coords { code } => {
            let code = normalize_airport_code(&code).map_err(report)?;
            match client.get_airport_coordinates(&code) {
                Some(point) => println!("{code}: {}", point.format_coordinates()),
                None => anyhow::bail!("No coordinates found for {code}"),
            }
        }
        Command::Nearest { lat, lon } => {
            let point = GeoPoint::new(lat, lon).map_err(report)?;
            match client.get_nearest_airport(point.latitude, point.longitude) {
                Some(code) => println!("{code}"),
                None => anyhow::bail!("No airport found near {}", point.format_coordinates()),
            }
        }
    }

    Ok(())
}

/// Show the friendly hint, if any, before handing the error to anyhow
fn report(error: MeetPointError) -> anyhow::Error {
    if let Some(hint) = error.hint() {
        eprintln!("{hint}");
    }
    error.into()
}

fn print_plan(plan: &MeetingPlan, currency: &str) {
    println!("Travelers:");
    for traveler in &plan.travelers {
        println!(
            "  {} from {} ({})",
            traveler.name,
            traveler.origin_airport,
            traveler.home.format_coordinates()
        );
    }
    println!("Midpoint: {}", plan.midpoint.format_coordinates());
    println!("Candidate airports: {}", plan.candidates.join(", "));
    println!();

    for (position, recommendation) in plan.recommendations.iter().enumerate() {
        let destination = &recommendation.ranked.destination;
        print!(
            "{}. {} - total {} {}",
            position + 1,
            destination,
            recommendation.ranked.aggregate_cost,
            currency
        );
        if let Some(distance) = recommendation.distance_from_midpoint_km {
            print!(" ({distance:.0} km from midpoint)");
        }
        println!();

        for leg in plan.breakdown(destination) {
            match leg.cost {
                Some(cost) => {
                    let delta = leg
                        .delta_from_average
                        .map(|d| {
                            let sign = if d.is_sign_negative() { "" } else { "+" };
                            format!(" ({sign}{} vs average)", d.round_dp(2))
                        })
                        .unwrap_or_default();
                    println!(
                        "     {:<12} {:>10} {}{}  {} / {}",
                        leg.traveler.name,
                        cost.total_price,
                        currency,
                        delta,
                        cost.route.join("-"),
                        cost.return_route.join("-")
                    );
                }
                None => println!("     {:<12} no route", leg.traveler.name),
            }
        }
    }
}
