mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{handle_embed, handle_evaluate, handle_rank, handle_strategies, Cli, Commands};
use hemolink_config::error::ErrorFormatter;
use hemolink_config::ConfigError;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` first, then our own crates at info (debug with `-v`),
/// everything else at warn.
fn log_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "info" };
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    for target in ["hemolink", "cli"] {
        if let Ok(directive) = format!("{target}={level}").parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(verbose))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        match err.downcast::<ConfigError>() {
            Ok(config_err) => eprintln!("{}", ErrorFormatter::new(config_err).format()),
            Err(err) => commands::ui::print_error(&format!("{:#}", err)),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();
    let data = cli.data.as_deref();

    match cli.command {
        Commands::Rank(args) => handle_rank(args, config, data).await?,
        Commands::Evaluate(args) => handle_evaluate(args, config, data).await?,
        Commands::Embed { batch } => handle_embed(batch, config, data).await?,
        Commands::Strategies => handle_strategies(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_covers_binary_and_default() {
        let filter = log_filter(false).to_string();
        assert!(filter.contains("cli=info"), "{filter}");
        assert!(filter.contains("hemolink=info"), "{filter}");
        assert!(filter.contains("warn"), "{filter}");

        let verbose = log_filter(true).to_string();
        assert!(verbose.contains("cli=debug"), "{verbose}");
    }
}
