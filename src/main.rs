//! recovery-check - dry-run the snapshot + operation-log load
//!
//! Connects to the configured MySQL store, loads the snapshot tables, and
//! replays the full operation log into a bookkeeping-only state. Exits
//! zero if the persisted data would recover cleanly; otherwise logs the
//! exact record that breaks and exits nonzero. Run it before restarting
//! the engine after a failover to know the restart will not abort halfway.

use anyhow::Context;
use engine_recovery::config::AppConfig;
use engine_recovery::logging::init_logging;
use engine_recovery::models::MarketInfo;
use engine_recovery::recovery::Recovery;
use engine_recovery::store::Db;
use engine_recovery::verify::VerifyState;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

fn build_state(config: &AppConfig) -> VerifyState {
    let mut state = VerifyState::new();
    for market in &config.markets {
        state.add_market(
            &market.name,
            MarketInfo {
                stock_prec: market.stock_prec,
                money_prec: market.money_prec,
                fee_prec: market.fee_prec,
            },
        );
    }
    for asset in &config.assets {
        state.add_asset(&asset.name, asset.prec);
    }
    state
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _guard = init_logging(&config);

    tracing::info!(env = %env, markets = config.markets.len(), assets = config.assets.len(), "starting dry-run recovery");

    let db = Db::connect(&config.mysql_url)
        .await
        .context("connect to backing store")?;
    db.health_check().await.context("store health check")?;

    let mut state = build_state(&config);
    let mut recovery = Recovery::new(&db, &config.tables);
    if let Some(page_size) = config.page_size {
        recovery = recovery.with_page_size(page_size);
    }

    let last_oper_id = recovery
        .run(&mut state)
        .await
        .context("recovery would fail")?;

    tracing::info!(
        last_oper_id,
        resting_orders = state.order_count(),
        balances = state.balance_count(),
        market_orders = state.market_orders_seen(),
        "snapshot and operation log replay cleanly"
    );
    Ok(())
}
