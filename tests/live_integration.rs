use mint_frame_client::{FeaturedMintTransactionParams, MintApiClient, RequestOptions};

/// Runs against a real deployment when `MINT_API_BASE_URL` is set; otherwise skips.
fn live_client() -> Option<MintApiClient> {
    match MintApiClient::from_env() {
        Ok(client) => Some(client),
        Err(reason) => {
            eprintln!("skipping live test: {reason}");
            None
        }
    }
}

#[tokio::test]
async fn live_featured_mint_transaction() {
    let Some(client) = live_client() else {
        return;
    };
    let address = std::env::var("MINT_API_TEST_ADDRESS")
        .unwrap_or_else(|_| "0x0000000000000000000000000000000000000001".to_owned());

    let response = client
        .get_featured_mint_transaction(
            FeaturedMintTransactionParams::new(address),
            RequestOptions::default(),
        )
        .await
        .expect("live transaction fetch must succeed");

    assert_eq!(response.status, 200);
    let tx = response.data.result.tx;
    assert!(tx.to.starts_with("0x"));
    assert!(tx.data.starts_with("0x"));
    assert!(tx.value_wei().is_some());
}
