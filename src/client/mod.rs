pub mod helius;

pub use helius::{ClientError, HeliusClient, TransactionSource};
