use clap::Parser;

mod cli;
mod parse_ric;
mod transform;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Transform {
            raw,
            instruments,
            output,
            expected,
            tolerance,
            duckdb,
            config,
            report,
        } => transform::run(&transform::TransformArgs {
            raw,
            instruments,
            output,
            expected,
            tolerance,
            duckdb,
            config,
            report,
        }),
        cli::Command::ParseRic { ric } => parse_ric::run(&ric),
    }
}
