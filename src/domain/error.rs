//! Domain error types.

/// Top-level error type for stockscope.
#[derive(Debug, thiserror::Error)]
pub enum StockError {
    #[error("network error for {symbol}: {reason}")]
    Network { symbol: String, reason: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("render error: {reason}")]
    Render { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockError {
    pub fn network(symbol: &str, reason: impl ToString) -> Self {
        StockError::Network {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn render(reason: impl ToString) -> Self {
        StockError::Render {
            reason: reason.to_string(),
        }
    }

    /// One-line message shown to the user above the raw error text.
    pub fn user_message(&self) -> &'static str {
        match self {
            StockError::Network { .. } | StockError::InsufficientData { .. } => {
                "error fetching stock data, check symbol!"
            }
            StockError::Render { .. } => "error rendering report or chart",
            StockError::ConfigParse { .. } | StockError::ConfigInvalid { .. } => {
                "error in configuration"
            }
            StockError::Io(_) => "error writing output",
        }
    }
}

impl From<&StockError> for std::process::ExitCode {
    fn from(err: &StockError) -> Self {
        let code: u8 = match err {
            StockError::Io(_) => 1,
            StockError::ConfigParse { .. } | StockError::ConfigInvalid { .. } => 2,
            StockError::Network { .. } => 3,
            StockError::InsufficientData { .. } => 5,
            StockError::Render { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_display_names_symbol() {
        let err = StockError::network("TCS.NS", "connection refused");
        assert_eq!(
            err.to_string(),
            "network error for TCS.NS: connection refused"
        );
    }

    #[test]
    fn insufficient_data_display() {
        let err = StockError::InsufficientData {
            symbol: "INFY.NS".into(),
            bars: 0,
            minimum: 1,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for INFY.NS: have 0 bars, need 1"
        );
    }

    #[test]
    fn fetch_failures_share_user_message() {
        let net = StockError::network("X", "timeout");
        let data = StockError::InsufficientData {
            symbol: "X".into(),
            bars: 3,
            minimum: 20,
        };
        assert_eq!(net.user_message(), data.user_message());
        assert_ne!(
            net.user_message(),
            StockError::render("svg").user_message()
        );
    }

    #[test]
    fn exit_codes_distinguish_kinds() {
        use std::process::ExitCode;
        assert_eq!(
            ExitCode::from(&StockError::network("X", "down")),
            ExitCode::from(3)
        );
        assert_eq!(
            ExitCode::from(&StockError::render("empty")),
            ExitCode::from(6)
        );
        let io = StockError::from(std::io::Error::other("disk"));
        assert_eq!(ExitCode::from(&io), ExitCode::from(1));
    }
}
