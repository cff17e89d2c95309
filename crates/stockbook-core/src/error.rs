use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("No active stock sheet.")]
    NoActiveSheet,
    #[error("Stock sheet not found: {0}")]
    SheetNotFound(String),
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    #[error("Sale not found: {0}")]
    SaleNotFound(String),
    #[error("Cannot add sale. {product} has only {available} in stock.")]
    InsufficientStock { product: String, available: i64 },
    #[error("{0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn rejected(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!(reason = %message, "mutation rejected");
        CoreError::Validation(message)
    }
}
