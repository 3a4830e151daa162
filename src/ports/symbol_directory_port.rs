//! Symbol directory port trait.

use crate::domain::error::StockError;

pub trait SymbolDirectoryPort {
    /// Every listed symbol, already suffix-qualified.
    fn fetch_symbols(&self) -> Result<Vec<String>, StockError>;
}
