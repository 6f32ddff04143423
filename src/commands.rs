use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::{Context, Result, bail};

use meld_gate::chain::RpcBalanceReader;
use meld_gate::config::GateConfig;
use meld_gate::evaluator::Evaluator;
use meld_gate::invite::HttpInviteIssuer;
use meld_gate::model::identity::IdentityAssertion;
use meld_gate::model::wallet::WalletSession;
use meld_gate::network::NetworkGuard;
use meld_gate::onboarding::state::StateKind;
use meld_gate::store::SqliteStore;
use meld_gate::wallet::HeadlessWallet;
use meld_gate::Onboarding;

use crate::cli::GlobalArgs;

pub struct OnboardArgs {
    pub address: Address,
    pub chain_id: Option<u64>,
    pub auto_switch: bool,
    pub username: String,
    pub user_id: String,
}

/// Defaults → config file → flags/env.
pub fn resolve_config(args: &GlobalArgs) -> Result<GateConfig> {
    let mut config = GateConfig::load_or_default(args.config.as_deref())?;
    if let Some(url) = &args.rpc_url {
        config.chain.rpc_url = url.clone();
    }
    if let Some(url) = &args.invite_url {
        config.invite_service_url = url.clone();
    }
    if let Some(db) = &args.db {
        config.db_path = db.clone();
    }
    config.validate()?;
    Ok(config)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("creating tokio runtime")
}

pub fn chain(config: &GateConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&config.chain)?);
    Ok(())
}

pub fn check(config: &GateConfig, address: Address) -> Result<()> {
    let reader = RpcBalanceReader::new(&config.chain)?;
    let evaluator = Evaluator::new(Arc::new(reader), config.gate(), config.chain.chain_id());
    let session = WalletSession::connected(address, config.chain.chain_id());

    let evaluation = runtime()?
        .block_on(evaluator.evaluate(&session))
        .context("eligibility check failed")?;
    let result = &evaluation.result;

    println!("Address:  {address}");
    println!("Network:  {}", config.chain);
    println!("Tokens:   {}", result.token_balance);
    println!("NFTs:     {}", result.nft_balance);
    println!("Eligible: {}", if result.is_eligible { "yes" } else { "no" });
    if let Some(url) = config.chain.address_url(&address.to_string()) {
        println!("Explorer: {url}");
    }
    Ok(())
}

pub fn onboard(config: &GateConfig, args: &OnboardArgs) -> Result<()> {
    let project_id = config.require_project_id()?;
    let required = config.chain.chain_id();
    let wallet = Arc::new(HeadlessWallet::new(
        project_id,
        args.address,
        args.chain_id.unwrap_or(required),
        args.auto_switch,
    )?);

    let reader = Arc::new(RpcBalanceReader::new(&config.chain)?);
    let invites = Arc::new(
        HttpInviteIssuer::new(config.invite_service_url.clone(), config.http_timeout())
            .context("creating invite HTTP client")?,
    );
    let store = Arc::new(
        SqliteStore::open(&config.db_path)
            .with_context(|| format!("opening database at {}", config.db_path.display()))?,
    );

    let evaluator = Evaluator::new(reader, config.gate(), required).with_prefetch(invites.clone());
    let guard = NetworkGuard::new(wallet.clone(), required);
    let mut flow = Onboarding::new(guard, evaluator, store, invites);

    println!("=== meld-gate onboard ===");
    println!("Network:  {}", config.chain);
    println!("Wallet:   {}", args.address);
    println!();

    runtime()?.block_on(async move {
        flow.handle_wallet_event(wallet.connect_event());

        if flow.kind() == StateKind::WrongNetwork {
            println!("Switching to {}...", config.chain.name);
            flow.switch_network().await?;
        }

        println!("Checking eligibility...");
        flow.check_eligibility().await?;
        if let Some(result) = flow.state().eligibility() {
            println!("  Tokens: {}", result.token_balance);
            println!("  NFTs:   {}", result.nft_balance);
        }
        if let Some(alert) = flow.alert() {
            println!("  {}", alert.message);
        }
        if flow.kind() != StateKind::IdentityPending {
            bail!("wallet is not eligible");
        }

        flow.identity_callback()
            .post(IdentityAssertion::new(args.username.clone(), args.user_id.clone()));
        flow.wait_for_identity().await?;

        println!("Saving onboarding record...");
        match flow.persist().await? {
            Some(invite) => println!("\nInvite: {invite}"),
            None => {
                let reason = flow.alert().map(|a| a.message.clone()).unwrap_or_default();
                bail!("record saved but no invite available: {reason}");
            }
        }
        Ok::<(), anyhow::Error>(())
    })
}

