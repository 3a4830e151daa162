//! Symbol directory loading with fallback, and suggestion filtering.

use crate::ports::symbol_directory_port::SymbolDirectoryPort;

/// Well-known symbols used whenever the directory cannot be loaded.
pub const FALLBACK_SYMBOLS: [&str; 3] = ["RELIANCE", "TCS", "INFY"];

pub const DEFAULT_SUFFIX: &str = ".NS";
pub const DEFAULT_SUGGESTION_LIMIT: usize = 16;

/// Append the exchange suffix unless the symbol already carries it.
pub fn qualify(symbol: &str, suffix: &str) -> String {
    let symbol = symbol.trim().to_uppercase();
    if suffix.is_empty() || symbol.ends_with(&suffix.to_uppercase()) {
        symbol
    } else {
        format!("{symbol}{suffix}")
    }
}

pub fn fallback_symbols(suffix: &str) -> Vec<String> {
    FALLBACK_SYMBOLS.iter().map(|s| qualify(s, suffix)).collect()
}

/// Fetch the directory; any failure or an empty listing yields the fallback list.
pub fn load_symbols(directory: &dyn SymbolDirectoryPort, suffix: &str) -> Vec<String> {
    match directory.fetch_symbols() {
        Ok(symbols) if !symbols.is_empty() => {
            tracing::debug!(count = symbols.len(), "symbol directory loaded");
            symbols
        }
        Ok(_) => {
            tracing::warn!("symbol directory is empty; using fallback list");
            fallback_symbols(suffix)
        }
        Err(e) => {
            tracing::warn!(error = %e, "symbol directory unavailable; using fallback list");
            fallback_symbols(suffix)
        }
    }
}

/// Upper-cased substring filter over `symbols`, in directory order.
pub fn suggest<'a>(symbols: &'a [String], query: &str, limit: usize) -> Vec<&'a str> {
    let needle = query.trim().to_uppercase();
    symbols
        .iter()
        .filter(|s| s.contains(&needle))
        .take(limit)
        .map(String::as_str)
        .collect()
}
