use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("amount must be a positive value")]
    InvalidAmount,
    #[error("no balance bucket exists for payer {0}")]
    NoSuchPayer(String),
    #[error("insufficient balance for payer {id}: price={price} balance={balance}")]
    InsufficientBalance {
        id: String,
        price: Decimal,
        balance: Decimal,
    },
    #[error("could not extract a payer id from destination '{0}'")]
    PayerExtractionFailed(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
