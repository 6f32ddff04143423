use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("meld_gate=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let config = commands::resolve_config(&cli.global)?;

    match cli.command {
        cli::Command::Chain => commands::chain(&config),
        cli::Command::Check { address } => commands::check(&config, address),
        cli::Command::Onboard {
            address,
            chain_id,
            auto_switch,
            username,
            user_id,
        } => commands::onboard(&config, &commands::OnboardArgs {
            address,
            chain_id,
            auto_switch,
            username,
            user_id,
        }),
    }
}
