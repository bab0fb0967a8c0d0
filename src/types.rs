use serde::{Deserialize, Serialize};

use crate::QueryParams;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Base,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pfp {
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMinimal {
    pub fid: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pfp: Option<Pfp>,
}

/// Mint currently featured in the frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedMint {
    pub name: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub creator: UserMinimal,
    pub chain: Chain,
    pub collection: String,
    pub contract: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    pub is_minting: bool,
    pub price_eth: String,
    pub price_usd: f64,
    /// Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<u64>,
    /// Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<u64>,
}

/// Ready-to-sign mint call. `data` and `value` are `0x`-prefixed hex.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedMintTransaction {
    pub chain: Chain,
    pub to: String,
    pub data: String,
    pub value: String,
}

impl FeaturedMintTransaction {
    /// Parses `value` as a wei amount. `None` when it is not valid hex.
    pub fn value_wei(&self) -> Option<u128> {
        let digits = self
            .value
            .strip_prefix("0x")
            .or_else(|| self.value.strip_prefix("0X"))
            .unwrap_or(&self.value);
        if digits.is_empty() {
            return Some(0);
        }
        u128::from_str_radix(digits, 16).ok()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeaturedMintResult {
    pub mint: FeaturedMint,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeaturedMintResponse {
    pub result: FeaturedMintResult,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedMintTransactionResult {
    pub tx: FeaturedMintTransaction,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedMintTransactionResponse {
    pub result: FeaturedMintTransactionResult,
}

/// Query for [`crate::MintApiClient::get_featured_mint`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeaturedMintParams {
    pub collection: Option<String>,
}

impl From<FeaturedMintParams> for QueryParams {
    fn from(params: FeaturedMintParams) -> Self {
        QueryParams::new().with("collection", params.collection)
    }
}

/// Query for [`crate::MintApiClient::get_featured_mint_transaction`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeaturedMintTransactionParams {
    /// Wallet that receives the mint.
    pub address: String,
    pub collection: Option<String>,
}

impl FeaturedMintTransactionParams {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            collection: None,
        }
    }

    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }
}

impl From<FeaturedMintTransactionParams> for QueryParams {
    fn from(params: FeaturedMintTransactionParams) -> Self {
        QueryParams::new()
            .with("address", params.address)
            .with("collection", params.collection)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Chain, FeaturedMintResponse, FeaturedMintTransaction};
    use crate::{FeaturedMintTransactionParams, QueryParams};

    #[test]
    fn featured_mint_decodes_camel_case() {
        let response: FeaturedMintResponse = serde_json::from_value(json!({
            "result": {
                "mint": {
                    "name": "Higher Self",
                    "imageUrl": "https://example.com/frame.png",
                    "creator": { "fid": 2266, "username": "ripe", "displayName": "ripe" },
                    "chain": "base",
                    "collection": "0xc49Bae5D82644f607eaC97bE42d5188a51cb0CAF",
                    "contract": "0xc49Bae5D82644f607eaC97bE42d5188a51cb0CAF",
                    "tokenId": "1",
                    "isMinting": true,
                    "priceEth": "0.0025",
                    "priceUsd": 8.5,
                    "endsAt": 1735938001000u64
                }
            }
        }))
        .expect("featured mint must decode");

        let mint = response.result.mint;
        assert_eq!(mint.chain, Chain::Base);
        assert_eq!(mint.creator.fid, 2266);
        assert_eq!(mint.token_id.as_deref(), Some("1"));
        assert_eq!(mint.starts_at, None);
        assert_eq!(mint.ends_at, Some(1_735_938_001_000));
    }

    #[test]
    fn unknown_chain_is_tolerated() {
        let chain: Chain = serde_json::from_value(json!("zora")).expect("chain");
        assert_eq!(chain, Chain::Unknown);
    }

    #[test]
    fn value_wei_parses_hex() {
        let tx = FeaturedMintTransaction {
            chain: Chain::Base,
            to: "0xc49B".to_owned(),
            data: "0x1234".to_owned(),
            value: "0x2386f26fc10000".to_owned(),
        };
        assert_eq!(tx.value_wei(), Some(10_000_000_000_000_000));

        let bad = FeaturedMintTransaction {
            value: "0xzz".to_owned(),
            ..tx
        };
        assert_eq!(bad.value_wei(), None);
    }

    #[test]
    fn transaction_params_drop_missing_collection() {
        let query: QueryParams = FeaturedMintTransactionParams::new("0xabc").into();
        assert_eq!(query.to_query_string(), "address=0xabc");

        let query: QueryParams = FeaturedMintTransactionParams::new("0xabc")
            .collection("0xdef")
            .into();
        assert_eq!(query.to_query_string(), "address=0xabc&collection=0xdef");
    }
}
