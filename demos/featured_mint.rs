use mint_frame_client::{
    ClientOptions, FeaturedMintTransactionParams, Hooks, MintApiClient, RequestOptions,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base_url = std::env::var("MINT_API_BASE_URL")?;
    let address = std::env::var("MINT_WALLET_ADDRESS")?;

    let client = MintApiClient::new(base_url.clone())
        .with_options(ClientOptions {
            base_url,
            read_timeout_ms: 5_000,
            timeout_retry_decay_factor: Some(0.3),
            ..ClientOptions::default()
        })
        .with_hooks(
            Hooks::default()
                .on_timeout(|event| {
                    eprintln!(
                        "{} timed out after {} ms",
                        event.request_info.endpoint_name, event.time_since_request_start_ms
                    );
                })
                .on_error(|event| eprintln!("request failed: {}", event.error)),
        );

    let mint = client
        .get_featured_mint(None, RequestOptions::default())
        .await?
        .data
        .result
        .mint;
    println!("{} by {}: {} ETH", mint.name, mint.creator.display_name, mint.price_eth);

    let tx = client
        .get_featured_mint_transaction(
            FeaturedMintTransactionParams::new(address).collection(mint.collection),
            RequestOptions::default(),
        )
        .await?
        .data
        .result
        .tx;
    println!("send {:?} wei to {} with data {}", tx.value_wei(), tx.to, tx.data);

    Ok(())
}
