use std::path::PathBuf;

use alloy::primitives::Address;
use clap::{Args, Parser, Subcommand};

/// Token-gate onboarding: check wallet eligibility, link a messaging
/// identity and issue a group invite.
#[derive(Parser)]
#[command(name = "meld-gate", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// JSON config file (missing keys keep their defaults)
    #[arg(long, global = true, env = "MELD_GATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the chain's JSON-RPC endpoint
    #[arg(long, global = true, env = "MELD_GATE_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Override the invite service base URL
    #[arg(long, global = true, env = "MELD_GATE_INVITE_URL")]
    pub invite_url: Option<String>,

    /// Override the SQLite database path
    #[arg(long, global = true, env = "MELD_GATE_DB")]
    pub db: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the required network descriptor as JSON
    Chain,

    /// Check whether an address is eligible
    Check {
        /// Holder address
        address: Address,
    },

    /// Run the whole onboarding flow with a headless wallet
    Onboard {
        /// Wallet address
        #[arg(long)]
        address: Address,

        /// Chain the wallet starts on (default: the required chain)
        #[arg(long)]
        chain_id: Option<u64>,

        /// Let the wallet accept a network switch request
        #[arg(long)]
        auto_switch: bool,

        /// Messaging username
        #[arg(long)]
        username: String,

        /// Messaging user id
        #[arg(long)]
        user_id: String,
    },
}
