//! Build, sign and (optionally) post a small limit order.
//!
//! Run with:
//! ```
//! POLY_PRIVATE_KEY=0x... POLY_TOKEN_ID=... cargo run --example place_order
//! ```
//!
//! Set `POLY_POST=1` to actually submit the order. API credentials come from
//! `POLY_API_KEY` / `POLY_API_SECRET` / `POLY_API_PASSPHRASE` when set and are
//! created or derived otherwise.

use anyhow::Context;
use polymarket_clob::{
    ApiCredentials, ClientConfig, ClobClient, CreateOrderOptions, OrderArgs, OrderSide, OrderType,
    Signer,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== CLOB Order Demo ===\n");

    // Step 1: Configuration and signer
    println!("1. Loading configuration...");
    let config = ClientConfig::from_env()?;
    println!("   Host: {} (chain {})", config.base_url(), config.chain_id);

    let private_key = std::env::var("POLY_PRIVATE_KEY").context("POLY_PRIVATE_KEY must be set")?;
    let signer = Signer::new(&private_key, config.chain_id)?;
    println!("   Signer address: {}", signer.address());

    let mut client = ClobClient::new(config)?.with_signer(signer)?;

    // Step 2: API credentials
    println!("\n2. Resolving API credentials...");
    match ApiCredentials::from_env() {
        Ok(creds) => {
            client.set_credentials(creds);
            println!("   Using credentials from environment");
        }
        Err(_) => {
            let creds = client.create_or_derive_api_key(None).await?;
            println!(
                "   Obtained API key {}...",
                &creds.api_key[..8.min(creds.api_key.len())]
            );
        }
    }

    // Step 3: Market data
    let token_id = std::env::var("POLY_TOKEN_ID").context("POLY_TOKEN_ID must be set")?;
    println!("\n3. Fetching market data for {}...", token_id);
    let tick_size = client.get_tick_size(&token_id).await?;
    let neg_risk = client.get_neg_risk(&token_id).await?;
    let book = client.get_order_book(&token_id).await?;
    println!("   Tick size: {}  neg-risk: {}", tick_size, neg_risk);
    println!(
        "   Best bid: {:?}  best ask: {:?}",
        book.best_bid(),
        book.best_ask()
    );

    // Step 4: Build and sign a resting bid at the minimum price
    println!("\n4. Building order...");
    let size = std::env::var("POLY_SIZE")
        .ok()
        .and_then(|s| Decimal::from_str(&s).ok())
        .unwrap_or(Decimal::new(5, 0));
    let args = OrderArgs::new(token_id.as_str(), tick_size.as_decimal(), size, OrderSide::Buy);
    let order = client.create_order(&args, CreateOrderOptions::default()).await?;
    println!(
        "   maker_amount={} taker_amount={} signature={}...",
        order.maker_amount,
        order.taker_amount,
        &order.signature[..12]
    );

    // Step 5: Submit
    if std::env::var("POLY_POST").as_deref() == Ok("1") {
        println!("\n5. Posting order...");
        let resp = client.post_order(&order, OrderType::Gtc).await?;
        println!(
            "   success={} status={} order_id={}",
            resp.success, resp.status, resp.order_id
        );
        if !resp.error_msg.is_empty() {
            println!("   error: {}", resp.error_msg);
        }
    } else {
        println!("\n5. Skipping submission (set POLY_POST=1 to post)");
        println!("{}", serde_json::to_string_pretty(&order)?);
    }

    Ok(())
}
