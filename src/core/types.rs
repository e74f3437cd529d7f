/// Core data types shared across the analysis pipeline

use serde::{Deserialize, Serialize};

/// Lamports per SOL for native transfer conversion
pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Timestamps above this are milliseconds, not seconds
pub const EPOCH_MILLIS_THRESHOLD: i64 = 1_600_000_000_000;

/// A native-asset (SOL) transfer inside a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeTransfer {
    #[serde(rename = "fromUserAccount", default)]
    pub from_user_account: String,
    #[serde(rename = "toUserAccount", default)]
    pub to_user_account: String,
    /// Transfer amount in lamports
    #[serde(default)]
    pub amount: u64,
}

impl NativeTransfer {
    pub fn amount_sol(&self) -> f64 {
        self.amount as f64 / LAMPORTS_PER_SOL
    }
}

/// An SPL token transfer inside a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenTransfer {
    #[serde(default)]
    pub mint: String,
    /// UI amount, decimals already applied upstream
    #[serde(rename = "tokenAmount", default)]
    pub token_amount: f64,
    #[serde(rename = "fromUserAccount", default)]
    pub from_user_account: String,
    #[serde(rename = "toUserAccount", default)]
    pub to_user_account: String,
}

/// One enriched transaction as returned by the history endpoint.
///
/// Immutable once fetched; cached verbatim apart from timestamp
/// normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub signature: String,
    /// Unix seconds after normalization
    #[serde(default)]
    pub timestamp: i64,
    #[serde(rename = "type", default)]
    pub tx_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "feePayer", default)]
    pub fee_payer: String,
    #[serde(rename = "transactionError", default, skip_serializing_if = "Option::is_none")]
    pub transaction_error: Option<serde_json::Value>,
    #[serde(rename = "nativeTransfers", default)]
    pub native_transfers: Vec<NativeTransfer>,
    #[serde(rename = "tokenTransfers", default)]
    pub token_transfers: Vec<TokenTransfer>,
}

impl Transaction {
    pub fn is_swap(&self) -> bool {
        self.tx_type.eq_ignore_ascii_case("swap")
    }

    pub fn succeeded(&self) -> bool {
        self.transaction_error.is_none()
    }

    /// Collapse millisecond timestamps to seconds. Idempotent: a value
    /// already in seconds is left alone.
    pub fn normalize_timestamp(&mut self) {
        if self.timestamp > EPOCH_MILLIS_THRESHOLD {
            self.timestamp /= 1000;
        }
    }

    /// Summed native transfer value in SOL
    pub fn native_value_sol(&self) -> f64 {
        self.native_transfers.iter().map(|t| t.amount_sol()).sum()
    }
}

/// A transaction with its resolved monetary value and derived flags
#[derive(Debug, Clone, Serialize)]
pub struct ValuedTransaction {
    pub signature: String,
    pub wallet: String,
    pub timestamp: i64,
    /// Absolute monetary magnitude
    pub amount: f64,
    /// True when `amount` is SOL-denominated rather than target-token-denominated
    pub is_native_value: bool,
    pub is_swap: bool,
    /// Same wallet swapped again inside the rapid interval
    pub is_rapid: bool,
    pub has_flash_loan: bool,
    pub has_high_slippage: bool,
}

/// Trade size classes for the volume distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeBucket {
    VerySmall,
    Small,
    Medium,
    Large,
    VeryLarge,
}

impl VolumeBucket {
    pub const ALL: [VolumeBucket; 5] = [
        VolumeBucket::VerySmall,
        VolumeBucket::Small,
        VolumeBucket::Medium,
        VolumeBucket::Large,
        VolumeBucket::VeryLarge,
    ];

    /// Pick the bucket for an amount against ascending thresholds
    /// `[very_small_max, small_max, medium_max, large_max]`.
    pub fn pick(amount: f64, thresholds: &[f64; 4]) -> Self {
        if amount < thresholds[0] {
            VolumeBucket::VerySmall
        } else if amount < thresholds[1] {
            VolumeBucket::Small
        } else if amount < thresholds[2] {
            VolumeBucket::Medium
        } else if amount < thresholds[3] {
            VolumeBucket::Large
        } else {
            VolumeBucket::VeryLarge
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VolumeBucket::VerySmall => "very_small",
            VolumeBucket::Small => "small",
            VolumeBucket::Medium => "medium",
            VolumeBucket::Large => "large",
            VolumeBucket::VeryLarge => "very_large",
        }
    }
}

/// Behavioral class assigned to a wallet, one per analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraderCategory {
    MarketMakingBot,
    LargeMarketMaker,
    SniperBot,
    Whale,
    Retail,
}

impl TraderCategory {
    pub const ALL: [TraderCategory; 5] = [
        TraderCategory::MarketMakingBot,
        TraderCategory::LargeMarketMaker,
        TraderCategory::SniperBot,
        TraderCategory::Whale,
        TraderCategory::Retail,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TraderCategory::MarketMakingBot => "market_making_bot",
            TraderCategory::LargeMarketMaker => "large_market_maker",
            TraderCategory::SniperBot => "sniper_bot",
            TraderCategory::Whale => "whale",
            TraderCategory::Retail => "retail",
        }
    }
}

impl std::fmt::Display for TraderCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Token metadata pulled from the RPC metadata endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub mint: String,
    pub symbol: Option<String>,
    pub decimals: u8,
    pub supply: Option<String>,
}
