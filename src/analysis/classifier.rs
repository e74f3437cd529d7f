/// Per-transaction value resolution, volume bucketing, and pattern detection
///
/// The classifier owns no counters: every call folds into a
/// `ClassifierState` owned by the caller, so a classification run is a
/// function of (transaction, running state).

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::config::{BucketThresholds, PatternSettings};
use crate::core::{Transaction, ValuedTransaction, VolumeBucket};

/// Running count/amount pair for one volume bucket
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BucketTotals {
    pub count: u64,
    pub amount: f64,
}

/// Five-bucket volume distribution
#[derive(Debug, Clone, Default, Serialize)]
pub struct VolumeDistribution {
    pub very_small: BucketTotals,
    pub small: BucketTotals,
    pub medium: BucketTotals,
    pub large: BucketTotals,
    pub very_large: BucketTotals,
}

impl VolumeDistribution {
    pub fn add(&mut self, bucket: VolumeBucket, amount: f64) {
        let totals = self.bucket_mut(bucket);
        totals.count += 1;
        totals.amount += amount;
    }

    pub fn get(&self, bucket: VolumeBucket) -> BucketTotals {
        match bucket {
            VolumeBucket::VerySmall => self.very_small,
            VolumeBucket::Small => self.small,
            VolumeBucket::Medium => self.medium,
            VolumeBucket::Large => self.large,
            VolumeBucket::VeryLarge => self.very_large,
        }
    }

    fn bucket_mut(&mut self, bucket: VolumeBucket) -> &mut BucketTotals {
        match bucket {
            VolumeBucket::VerySmall => &mut self.very_small,
            VolumeBucket::Small => &mut self.small,
            VolumeBucket::Medium => &mut self.medium,
            VolumeBucket::Large => &mut self.large,
            VolumeBucket::VeryLarge => &mut self.very_large,
        }
    }

    pub fn total_count(&self) -> u64 {
        VolumeBucket::ALL.iter().map(|b| self.get(*b).count).sum()
    }
}

/// Occurrence counters for detected patterns
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatternCounters {
    pub swaps: u64,
    pub transfers: u64,
    pub large_transfers: u64,
    pub multi_transfers: u64,
    pub rapid_swaps: u64,
    pub bot_trades: u64,
    pub flash_loans: u64,
    pub high_slippage: u64,
    pub arbitrage: u64,
    pub sandwich_attacks: u64,
    pub wash_trades: u64,
}

/// Volume attributed to each activity type
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivityVolumes {
    pub swaps: f64,
    pub transfers: f64,
    pub flash_loans: f64,
    pub high_slippage: f64,
    pub bot_trades: f64,
}

/// Implied price observed at a swap
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PricePoint {
    pub timestamp: i64,
    pub price: f64,
}

/// A trade above the large-transfer floor, kept for the sandwich pass
#[derive(Debug, Clone, Serialize)]
pub struct LargeSwap {
    pub timestamp: i64,
    pub amount: f64,
    pub wallet: String,
}

/// Accumulator folded over one analysis run
#[derive(Debug, Default)]
pub struct ClassifierState {
    pub distribution: VolumeDistribution,
    pub patterns: PatternCounters,
    pub activity: ActivityVolumes,
    pub total_volume: f64,
    pub price_points: Vec<PricePoint>,
    pub large_swaps: Vec<LargeSwap>,
    last_swap_by_wallet: HashMap<String, i64>,
}

pub struct VolumeClassifier {
    target_mint: String,
    buckets: BucketThresholds,
    settings: PatternSettings,
}

impl VolumeClassifier {
    pub fn new(target_mint: &str, buckets: BucketThresholds, settings: PatternSettings) -> Self {
        Self {
            target_mint: target_mint.to_string(),
            buckets,
            settings,
        }
    }

    /// Classify one transaction, folding counters into `state`.
    ///
    /// Transactions must arrive in ascending timestamp order for the
    /// rapid-swap tracking to see gaps correctly.
    pub fn classify(&self, tx: &Transaction, state: &mut ClassifierState) -> ValuedTransaction {
        let (amount, is_native_value) = self.resolve_value(tx);

        let thresholds = if is_native_value {
            &self.buckets.native
        } else {
            &self.buckets.token
        };
        let bucket = VolumeBucket::pick(amount, thresholds);
        state.distribution.add(bucket, amount);
        state.total_volume += amount;

        if tx.is_swap() {
            state.activity.swaps += amount;
        } else if tx.description.to_lowercase().contains("transfer") {
            state.patterns.transfers += 1;
            state.activity.transfers += amount;
        }

        let is_rapid = self.track_swap_timing(tx, amount, state);
        let has_flash_loan = self.detect_flash_loan(tx, amount, state);
        let has_high_slippage = self.track_price_impact(tx, amount, state);

        if tx.token_transfers.len() > 2 {
            state.patterns.multi_transfers += 1;
            let distinct_mints: HashSet<&str> =
                tx.token_transfers.iter().map(|t| t.mint.as_str()).collect();
            if distinct_mints.len() > 2 {
                state.patterns.arbitrage += 1;
            }
        }

        if amount > self.settings.large_transfer_floor {
            state.patterns.large_transfers += 1;
            state.large_swaps.push(LargeSwap {
                timestamp: tx.timestamp,
                amount,
                wallet: tx.fee_payer.clone(),
            });
        }

        ValuedTransaction {
            signature: tx.signature.clone(),
            wallet: tx.fee_payer.clone(),
            timestamp: tx.timestamp,
            amount,
            is_native_value,
            is_swap: tx.is_swap(),
            is_rapid,
            has_flash_loan,
            has_high_slippage,
        }
    }

    /// Post-pass detections that need the whole run: sandwich shapes over
    /// the collected large swaps, wash-trade shapes per wallet.
    pub fn finalize(
        &self,
        state: &mut ClassifierState,
        wallet_transactions: &HashMap<String, Vec<ValuedTransaction>>,
    ) {
        for pair in state.large_swaps.windows(2) {
            if pair[1].timestamp - pair[0].timestamp < self.settings.sandwich_window_secs {
                state.patterns.sandwich_attacks += 1;
            }
        }

        for transactions in wallet_transactions.values() {
            if transactions.len() >= self.settings.wash_trade_min_trades {
                let first = transactions.first().map(|t| t.timestamp).unwrap_or(0);
                let last = transactions.last().map(|t| t.timestamp).unwrap_or(0);
                if last - first < self.settings.wash_trade_window_secs {
                    state.patterns.wash_trades += 1;
                }
            }
        }
    }

    /// Resolve the monetary value of a transaction, first matching rule
    /// wins:
    ///   1. swap: summed native legs when present, else the target-token leg
    ///   2. any native transfer: summed native legs
    ///   3. first target-token transfer, zero if none
    fn resolve_value(&self, tx: &Transaction) -> (f64, bool) {
        let native_sum = tx.native_value_sol();

        if tx.is_swap() {
            if native_sum > 0.0 {
                return (native_sum, true);
            }
            let token_leg = tx
                .token_transfers
                .iter()
                .find(|t| t.mint == self.target_mint)
                .map(|t| t.token_amount.abs())
                .unwrap_or(0.0);
            return (token_leg, false);
        }

        if native_sum > 0.0 {
            return (native_sum, true);
        }

        let token_leg = tx
            .token_transfers
            .iter()
            .find(|t| t.mint == self.target_mint)
            .map(|t| t.token_amount.abs())
            .unwrap_or(0.0);
        (token_leg, false)
    }

    /// Swap timing per wallet: a gap under the rapid interval counts as a
    /// rapid swap, under the bot interval as a bot trade.
    fn track_swap_timing(&self, tx: &Transaction, amount: f64, state: &mut ClassifierState) -> bool {
        if !tx.is_swap() {
            return false;
        }
        state.patterns.swaps += 1;

        let mut is_rapid = false;
        if let Some(&last) = state.last_swap_by_wallet.get(&tx.fee_payer) {
            let gap = tx.timestamp - last;
            if gap < self.settings.rapid_interval_secs {
                state.patterns.rapid_swaps += 1;
                is_rapid = true;
                if gap < self.settings.bot_interval_secs {
                    state.patterns.bot_trades += 1;
                    state.activity.bot_trades += amount;
                }
            }
        }
        state
            .last_swap_by_wallet
            .insert(tx.fee_payer.clone(), tx.timestamp);
        is_rapid
    }

    /// A mint whose running net in/out returns to within tolerance of zero
    /// inside one transaction is a flash-loan round-trip.
    fn detect_flash_loan(&self, tx: &Transaction, amount: f64, state: &mut ClassifierState) -> bool {
        let mut net: HashMap<&str, f64> = HashMap::new();
        for transfer in &tx.token_transfers {
            if let Some(&running) = net.get(transfer.mint.as_str()) {
                if (running + transfer.token_amount).abs() < self.settings.flash_loan_tolerance {
                    state.patterns.flash_loans += 1;
                    state.activity.flash_loans += amount;
                    return true;
                }
            }
            *net.entry(transfer.mint.as_str()).or_insert(0.0) -= transfer.token_amount;
        }
        false
    }

    /// Implied price for swaps with both legs; a jump above the slippage
    /// threshold versus the previous price flags the swap.
    fn track_price_impact(&self, tx: &Transaction, amount: f64, state: &mut ClassifierState) -> bool {
        if !tx.is_swap() || tx.token_transfers.len() < 2 {
            return false;
        }

        let mut token_amount = None;
        let mut counter_amount = None;
        for transfer in &tx.token_transfers {
            if transfer.mint == self.target_mint {
                token_amount = Some(transfer.token_amount.abs());
            } else {
                counter_amount = Some(transfer.token_amount.abs());
            }
        }

        let (Some(token_amount), Some(counter_amount)) = (token_amount, counter_amount) else {
            return false;
        };
        if token_amount <= 0.0 {
            return false;
        }

        let price = counter_amount / token_amount;
        let previous = state.price_points.last().map(|p| p.price);
        state.price_points.push(PricePoint {
            timestamp: tx.timestamp,
            price,
        });

        if let Some(previous) = previous {
            if previous > 0.0 {
                let impact = (price - previous).abs() / previous;
                if impact > self.settings.slippage_threshold {
                    state.patterns.high_slippage += 1;
                    state.activity.high_slippage += amount;
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{swap_tx, token_swap_tx, transfer_tx};
    use crate::core::TokenTransfer;

    const MINT: &str = "TargetMint111";

    fn classifier() -> VolumeClassifier {
        VolumeClassifier::new(MINT, BucketThresholds::default(), PatternSettings::default())
    }

    #[test]
    fn test_swap_with_native_leg_is_native_denominated() {
        let classifier = classifier();
        let mut state = ClassifierState::default();

        let valued = classifier.classify(&swap_tx("a", "w1", 1_700_000_000, 2.5), &mut state);
        assert!(valued.is_native_value);
        assert!((valued.amount - 2.5).abs() < 1e-9);
        assert_eq!(state.distribution.medium.count, 1);
    }

    #[test]
    fn test_swap_without_native_leg_falls_back_to_token_leg() {
        let classifier = classifier();
        let mut state = ClassifierState::default();

        let tx = token_swap_tx("a", "w1", 1_700_000_000, MINT, 500.0, "Usdc", 12.0);
        let valued = classifier.classify(&tx, &mut state);
        assert!(!valued.is_native_value);
        assert!((valued.amount - 500.0).abs() < 1e-9);
        // 500 sits in the small token bucket (100..1000)
        assert_eq!(state.distribution.small.count, 1);
    }

    #[test]
    fn test_plain_transfer_uses_first_matching_token_leg() {
        let classifier = classifier();
        let mut state = ClassifierState::default();

        let valued = classifier.classify(&transfer_tx("a", "w1", 1_700_000_000, MINT, 250.0), &mut state);
        assert!(!valued.is_native_value);
        assert!((valued.amount - 250.0).abs() < 1e-9);
        assert_eq!(state.patterns.transfers, 1);
    }

    #[test]
    fn test_unmatched_transaction_resolves_to_zero() {
        let classifier = classifier();
        let mut state = ClassifierState::default();

        let valued = classifier.classify(&transfer_tx("a", "w1", 1_700_000_000, "OtherMint", 99.0), &mut state);
        assert_eq!(valued.amount, 0.0);
        // Still bucketed: zero lands in very_small
        assert_eq!(state.distribution.very_small.count, 1);
    }

    #[test]
    fn test_every_transaction_lands_in_exactly_one_bucket() {
        let classifier = classifier();
        let mut state = ClassifierState::default();

        let amounts = [0.0, 0.05, 0.5, 5.0, 50.0, 500.0, 0.09, 99.9];
        for (i, sol) in amounts.iter().enumerate() {
            classifier.classify(&swap_tx(&format!("s{}", i), "w1", 1_700_000_000 + i as i64 * 120, *sol), &mut state);
        }

        assert_eq!(state.distribution.total_count(), amounts.len() as u64);
    }

    #[test]
    fn test_rapid_and_bot_swaps_are_tracked_per_wallet() {
        let classifier = classifier();
        let mut state = ClassifierState::default();

        let first = classifier.classify(&swap_tx("a", "w1", 1_700_000_000, 1.0), &mut state);
        assert!(!first.is_rapid);

        // 2s later: rapid and bot
        let second = classifier.classify(&swap_tx("b", "w1", 1_700_000_002, 1.0), &mut state);
        assert!(second.is_rapid);
        assert_eq!(state.patterns.rapid_swaps, 1);
        assert_eq!(state.patterns.bot_trades, 1);

        // 30s later: rapid but not bot
        let third = classifier.classify(&swap_tx("c", "w1", 1_700_000_032, 1.0), &mut state);
        assert!(third.is_rapid);
        assert_eq!(state.patterns.rapid_swaps, 2);
        assert_eq!(state.patterns.bot_trades, 1);

        // Different wallet: no history, not rapid
        let other = classifier.classify(&swap_tx("d", "w2", 1_700_000_033, 1.0), &mut state);
        assert!(!other.is_rapid);
    }

    #[test]
    fn test_flash_loan_round_trip_is_flagged() {
        let classifier = classifier();
        let mut state = ClassifierState::default();

        let mut tx = swap_tx("a", "w1", 1_700_000_000, 1.0);
        tx.token_transfers = vec![
            TokenTransfer {
                mint: "Loaned".into(),
                token_amount: 1_000.0,
                from_user_account: "pool".into(),
                to_user_account: "w1".into(),
            },
            TokenTransfer {
                mint: "Loaned".into(),
                token_amount: 1_000.0,
                from_user_account: "w1".into(),
                to_user_account: "pool".into(),
            },
        ];

        let valued = classifier.classify(&tx, &mut state);
        assert!(valued.has_flash_loan);
        assert_eq!(state.patterns.flash_loans, 1);
    }

    #[test]
    fn test_flash_loan_requires_near_zero_net() {
        let classifier = classifier();
        let mut state = ClassifierState::default();

        let mut tx = swap_tx("a", "w1", 1_700_000_000, 1.0);
        tx.token_transfers = vec![
            TokenTransfer {
                mint: "Loaned".into(),
                token_amount: 1_000.0,
                from_user_account: "pool".into(),
                to_user_account: "w1".into(),
            },
            TokenTransfer {
                mint: "Loaned".into(),
                token_amount: 900.0, // repaid short, net stays open
                from_user_account: "w1".into(),
                to_user_account: "pool".into(),
            },
        ];

        let valued = classifier.classify(&tx, &mut state);
        assert!(!valued.has_flash_loan);
        assert_eq!(state.patterns.flash_loans, 0);
    }

    #[test]
    fn test_high_slippage_flags_price_jump() {
        let classifier = classifier();
        let mut state = ClassifierState::default();

        // Implied price 0.01
        let first = token_swap_tx("a", "w1", 1_700_000_000, MINT, 1_000.0, "Usdc", 10.0);
        // Implied price 0.02: a 100% jump
        let second = token_swap_tx("b", "w2", 1_700_000_010, MINT, 1_000.0, "Usdc", 20.0);
        // Implied price 0.0202: +1%, inside tolerance
        let third = token_swap_tx("c", "w3", 1_700_000_020, MINT, 1_000.0, "Usdc", 20.2);

        assert!(!classifier.classify(&first, &mut state).has_high_slippage);
        assert!(classifier.classify(&second, &mut state).has_high_slippage);
        assert!(!classifier.classify(&third, &mut state).has_high_slippage);
        assert_eq!(state.patterns.high_slippage, 1);
        assert_eq!(state.price_points.len(), 3);
    }

    #[test]
    fn test_finalize_detects_sandwich_and_wash_shapes() {
        let classifier = classifier();
        let mut state = ClassifierState::default();

        // Two large trades 10s apart
        let big1 = token_swap_tx("a", "w1", 1_700_000_000, MINT, 5_000.0, "Usdc", 50.0);
        let big2 = token_swap_tx("b", "w2", 1_700_000_010, MINT, 5_000.0, "Usdc", 50.0);
        let v1 = classifier.classify(&big1, &mut state);
        let v2 = classifier.classify(&big2, &mut state);
        assert_eq!(state.patterns.large_transfers, 2);

        // w3 churns three trades inside five minutes
        let mut wallet_txs: HashMap<String, Vec<ValuedTransaction>> = HashMap::new();
        wallet_txs.insert("w1".into(), vec![v1]);
        wallet_txs.insert("w2".into(), vec![v2]);
        let churn: Vec<ValuedTransaction> = (0..3)
            .map(|i| {
                classifier.classify(
                    &swap_tx(&format!("c{}", i), "w3", 1_700_000_100 + i * 60, 0.5),
                    &mut state,
                )
            })
            .collect();
        wallet_txs.insert("w3".into(), churn);

        classifier.finalize(&mut state, &wallet_txs);
        assert_eq!(state.patterns.sandwich_attacks, 1);
        assert_eq!(state.patterns.wash_trades, 1);
    }
}
