use super::setup::{embedder, finalize, load_config, missing_embeddings_notice, open_store};
use super::ui::{print_header, print_key_value, print_panel, print_success, print_table, print_warning};
use anyhow::{bail, Result};
use clap::Args;
use console::Style;
use hemolink_config::StrategyKind;
use hemolink_engine::evaluation::{queries_from_config, CellStatus, StrategySummary};
use hemolink_engine::{Cancellation, EvaluationHarness, EvaluationReport, RecommendService};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Comma-separated strategies (overrides evaluation.strategies)
    #[arg(long, value_delimiter = ',')]
    pub strategies: Option<Vec<StrategyKind>>,

    /// Cut-off K (overrides evaluation.k)
    #[arg(long)]
    pub k: Option<usize>,

    /// Cells in flight at once (overrides evaluation.concurrency)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Write the per-strategy table as CSV
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Write the full report as JSON
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,
}

pub async fn handle_evaluate(args: EvaluateArgs, config_path: Option<&Path>, data: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path, data)?;
    if let Some(strategies) = args.strategies {
        config.evaluation.strategies = strategies;
    }
    if let Some(k) = args.k {
        config.evaluation.k = k;
    }
    if let Some(concurrency) = args.concurrency {
        config.evaluation.concurrency = concurrency;
    }
    let config = finalize(config)?;
    let strategies = config.evaluation.strategies.clone();
    let needs_embeddings = strategies.iter().any(|s| s.uses_embedding());

    let store = open_store(&config)?;
    let embedder = embedder(&config, true)?;
    if needs_embeddings {
        if embedder.is_none() {
            print_warning("similarity strategies will be reported as failed cells");
        } else if let Some(notice) = missing_embeddings_notice(&store) {
            print_warning(&notice);
        }
    }

    let queries = queries_from_config(&config.evaluation)?;
    if queries.is_empty() {
        bail!("evaluation.queries is empty");
    }

    let service = Arc::new(RecommendService::from_config(Arc::new(store), embedder, &config));
    let harness = EvaluationHarness::from_config(service, &config);

    let cancel = Cancellation::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.green} {msg}")?,
    );
    spinner.set_message(format!(
        "Evaluating {} queries × {} strategies...",
        queries.len(),
        strategies.len()
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let report = harness.evaluate(&queries, &strategies, &cancel).await;
    spinner.finish_and_clear();

    print_report(&report, &config.evaluation.city);

    if let Some(path) = &args.csv {
        report.write_csv(path)?;
        print_success(&format!("CSV written to {}", path.display()));
    }
    if let Some(path) = &args.json {
        report.write_json(path)?;
        print_success(&format!("JSON written to {}", path.display()));
    }

    Ok(())
}

fn print_report(report: &EvaluationReport, city: &str) {
    print_header("Retrieval strategy comparison");
    print_key_value("City", city);
    print_key_value("K", &report.k.to_string());
    if report.cancelled {
        print_warning("run was interrupted; aggregates cover completed cells only");
    }
    println!();

    let k = report.k;
    let headers: Vec<String> = vec![
        "System".into(),
        "MRR".into(),
        format!("NDCG@{k}"),
        format!("Precision@{k}"),
        "AvgDistance".into(),
        "NormDistance".into(),
        "FinalScore".into(),
        "Latency (ms)".into(),
        "Runs".into(),
    ];
    let rows: Vec<Vec<String>> = report
        .summaries
        .iter()
        .map(|s| {
            let latency = report
                .timing(s.strategy)
                .map(|t| format!("{:.1}", t.mean_latency_ms))
                .unwrap_or_default();
            vec![
                s.strategy.to_string(),
                format!("{:.4}", s.mrr),
                format!("{:.4}", s.ndcg),
                format!("{:.4}", s.precision),
                s.avg_distance_km.map(|d| format!("{:.2}", d)).unwrap_or_else(|| "-".into()),
                format!("{:.4}", s.norm_distance),
                format!("{:.4}", s.final_score),
                latency,
                run_counts(s),
            ]
        })
        .collect();
    print_table(&headers, &rows, 1);

    println!();
    let name = |s: Option<StrategyKind>| s.map(|k| k.to_string()).unwrap_or_else(|| "-".into());
    let ranking = report
        .ranking
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" > ");
    let analysis = format!(
        "Best MRR: {}\nBest NDCG@{k}: {}\nBest Precision@{k}: {}\nClosest results: {}\nBest overall: {}\nRanking: {}",
        name(report.best.mrr),
        name(report.best.ndcg),
        name(report.best.precision),
        name(report.best.distance),
        name(report.best.final_score),
        ranking
    );
    print_panel("Strength analysis", &analysis, Style::new().cyan(), None);

    let failures: Vec<String> = report
        .runs
        .iter()
        .filter_map(|r| match &r.status {
            CellStatus::Failed { error } => Some(format!("{} / \"{}\": {}", r.strategy, r.query, error)),
            _ => None,
        })
        .collect();
    if !failures.is_empty() {
        println!();
        print_panel(
            &format!("Failed cells ({})", failures.len()),
            &failures.join("\n"),
            Style::new().red(),
            None,
        );
    }
}

fn run_counts(summary: &StrategySummary) -> String {
    let mut counts = summary.completed.to_string();
    if summary.failed > 0 {
        counts.push_str(&format!(" ({} failed)", summary.failed));
    }
    if summary.cancelled > 0 {
        counts.push_str(&format!(" ({} cancelled)", summary.cancelled));
    }
    counts
}
