use super::setup::{embedder, finalize, load_config, missing_embeddings_notice, open_store};
use super::ui::{print_header, print_key_value, print_panel, print_table, print_warning};
use anyhow::Result;
use clap::Args;
use console::Style;
use hemolink_core::ranking::Exclusion;
use hemolink_core::{BloodType, Query, RankedResult};
use hemolink_engine::RecommendService;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RankArgs {
    /// Free-text description of the emergency
    pub query: String,

    /// Requested blood type (e.g. O+, AB-, blood_o_neg)
    #[arg(long)]
    pub blood: BloodType,

    /// Restrict candidates to this city
    #[arg(long)]
    pub city: Option<String>,

    /// Requester latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Requester longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Number of results (overrides ranking.top_k)
    #[arg(long)]
    pub top: Option<usize>,

    /// Rank without the similarity term if embeddings are unavailable
    #[arg(long, default_value_t = false)]
    pub degraded: bool,

    /// Print JSON instead of a table
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Serialize)]
struct RankOutput<'a> {
    query: &'a Query,
    degraded: bool,
    results: &'a [RankedResult],
    exclusions: &'a [Exclusion],
}

pub async fn handle_rank(args: RankArgs, config_path: Option<&Path>, data: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path, data)?;
    if let Some(top) = args.top {
        config.ranking.top_k = top;
    }
    if args.degraded {
        config.ranking.allow_degraded = true;
    }
    let config = finalize(config)?;
    let allow_degraded = config.ranking.allow_degraded;

    let store = open_store(&config)?;
    let embedder = embedder(&config, allow_degraded)?;
    if let Some(notice) = missing_embeddings_notice(&store) {
        print_warning(&notice);
    }

    let service = RecommendService::from_config(Arc::new(store), embedder, &config);

    let mut query = Query::new(args.query, args.blood, args.lat, args.lon);
    if let Some(city) = args.city {
        query = query.in_city(city);
    }

    let recommendation = service.recommend(&query, config.ranking.top_k, allow_degraded).await?;
    let outcome = &recommendation.outcome;

    if args.json {
        let output = RankOutput {
            query: &query,
            degraded: recommendation.degraded,
            results: &outcome.results,
            exclusions: &outcome.exclusions,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_header(&format!("Top {} for \"{}\"", config.ranking.top_k, query.text));
    print_key_value("Blood type", query.blood_type.code());
    print_key_value("Scope", query.city.as_deref().unwrap_or("all cities"));
    print_key_value("Requester", &format!("{:.4}, {:.4}", query.latitude, query.longitude));
    if recommendation.degraded {
        print_warning("embeddings unavailable; ranked on distance, response time and rating only");
    }
    println!();

    if outcome.results.is_empty() {
        print_panel(
            "No matches",
            &format!(
                "No hospital in scope reports {} stock. Try widening the city filter.",
                query.blood_type
            ),
            Style::new().yellow(),
            None,
        );
    } else {
        let headers: Vec<String> = ["#", "Hospital", "Distance (km)", "Rating", "Response (min)", "ICU", "Units", "Score"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let rows: Vec<Vec<String>> = outcome
            .results
            .iter()
            .enumerate()
            .map(|(i, r)| {
                vec![
                    format!("{}", i + 1),
                    r.hospital.name.clone(),
                    format!("{:.2}", r.display_distance_km),
                    format!("{:.1}", r.hospital.rating),
                    format!("{:.0}", r.hospital.avg_response_time_mins),
                    r.hospital.icu_beds_available.to_string(),
                    r.hospital.units_of(query.blood_type).to_string(),
                    r.score.map(|s| format!("{:.4}", s)).unwrap_or_default(),
                ]
            })
            .collect();
        print_table(&headers, &rows, 2);
    }

    if !outcome.exclusions.is_empty() {
        println!();
        let lines: Vec<String> = outcome
            .exclusions
            .iter()
            .map(|e| format!("{} ({}): {}", e.name, e.id, e.reason))
            .collect();
        print_panel(
            &format!("Excluded {}", outcome.exclusions.len()),
            &lines.join("\n"),
            Style::new().dim(),
            Some(Style::new().dim()),
        );
    }

    Ok(())
}
