/// Transaction analysis pipeline: fetch, classify, categorize, aggregate

pub mod aggregator;
pub mod categorizer;
pub mod classifier;
pub mod fetcher;

pub use aggregator::{AnalysisReport, TokenAnalyzer};
pub use categorizer::{TraderCategorizer, WalletProfile};
pub use classifier::{ClassifierState, VolumeClassifier};
pub use fetcher::TransactionFetcher;

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::client::{ClientError, TransactionSource};
    use crate::core::{NativeTransfer, TokenTransfer, Transaction};

    type PageResult = Result<Vec<Transaction>, ClientError>;

    enum Script {
        Pages(Mutex<VecDeque<PageResult>>),
        Endless(Box<dyn Fn(usize, usize) -> Vec<Transaction> + Send + Sync>),
    }

    /// Synthetic transaction source with a call counter
    pub struct ScriptedSource {
        script: Script,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        /// Serve the given pages in order, then empty pages
        pub fn pages(pages: Vec<PageResult>) -> Self {
            Self {
                script: Script::Pages(Mutex::new(pages.into())),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Serve pages produced by `f(page_index, limit)` forever
        pub fn endless(f: impl Fn(usize, usize) -> Vec<Transaction> + Send + Sync + 'static) -> Self {
            Self {
                script: Script::Endless(Box::new(f)),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn calls(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.calls)
        }
    }

    #[async_trait]
    impl TransactionSource for ScriptedSource {
        async fn fetch_page(
            &self,
            _address: &str,
            _before: Option<&str>,
            limit: usize,
        ) -> PageResult {
            let page = self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                Script::Pages(queue) => queue.lock().unwrap().pop_front().unwrap_or_else(|| Ok(vec![])),
                Script::Endless(f) => Ok(f(page, limit)),
            }
        }
    }

    /// Swap transaction whose value is a single native leg worth `sol`
    pub fn swap_tx(signature: &str, wallet: &str, timestamp: i64, sol: f64) -> Transaction {
        Transaction {
            signature: signature.to_string(),
            timestamp,
            tx_type: "SWAP".into(),
            description: String::new(),
            fee_payer: wallet.to_string(),
            transaction_error: None,
            native_transfers: vec![NativeTransfer {
                from_user_account: wallet.to_string(),
                to_user_account: "pool".into(),
                amount: (sol * 1e9) as u64,
            }],
            token_transfers: vec![],
        }
    }

    /// Swap with two token legs and no native transfer
    pub fn token_swap_tx(
        signature: &str,
        wallet: &str,
        timestamp: i64,
        target_mint: &str,
        target_amount: f64,
        counter_mint: &str,
        counter_amount: f64,
    ) -> Transaction {
        Transaction {
            signature: signature.to_string(),
            timestamp,
            tx_type: "SWAP".into(),
            description: String::new(),
            fee_payer: wallet.to_string(),
            transaction_error: None,
            native_transfers: vec![],
            token_transfers: vec![
                TokenTransfer {
                    mint: target_mint.to_string(),
                    token_amount: target_amount,
                    from_user_account: "pool".into(),
                    to_user_account: wallet.to_string(),
                },
                TokenTransfer {
                    mint: counter_mint.to_string(),
                    token_amount: counter_amount,
                    from_user_account: wallet.to_string(),
                    to_user_account: "pool".into(),
                },
            ],
        }
    }

    /// Plain token transfer of the given mint
    pub fn transfer_tx(signature: &str, wallet: &str, timestamp: i64, mint: &str, amount: f64) -> Transaction {
        Transaction {
            signature: signature.to_string(),
            timestamp,
            tx_type: "TRANSFER".into(),
            description: "token transfer".into(),
            fee_payer: wallet.to_string(),
            transaction_error: None,
            native_transfers: vec![],
            token_transfers: vec![TokenTransfer {
                mint: mint.to_string(),
                token_amount: amount,
                from_user_account: wallet.to_string(),
                to_user_account: "other".into(),
            }],
        }
    }
}
