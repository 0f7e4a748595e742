use super::ui::print_header;
use console::Style;
use hemolink_config::StrategyKind;

fn describe(kind: StrategyKind) -> &'static str {
    match kind {
        StrategyKind::FilterOnly => "all cities, stocked hospitals, fastest average response first",
        StrategyKind::FilterByRating => "all cities, stocked hospitals, highest rating first",
        StrategyKind::SimilarityOnly => "all hospitals, nearest profile embedding first",
        StrategyKind::Hybrid => "city and stock filter, composite score (similarity, distance, response, rating)",
    }
}

pub fn handle_strategies() {
    print_header("Strategies");
    for kind in StrategyKind::ALL {
        let marker = if kind.uses_embedding() { " [embeddings]" } else { "" };
        println!(
            "{:<18} {}{}",
            Style::new().bold().apply_to(kind.as_str()),
            describe(kind),
            Style::new().dim().apply_to(marker)
        );
    }
}
