//! Domain error types.

/// Top-level error type for sigtrader.
#[derive(Debug, thiserror::Error)]
pub enum SigtraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("no price data in {path}")]
    NoData { path: String },

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("signal series has {signals} points but price series has {bars} bars")]
    MisalignedSeries { bars: usize, signals: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SigtraderError> for std::process::ExitCode {
    fn from(err: &SigtraderError) -> Self {
        let code: u8 = match err {
            SigtraderError::Io(_) => 1,
            SigtraderError::ConfigParse { .. }
            | SigtraderError::ConfigMissing { .. }
            | SigtraderError::ConfigInvalid { .. }
            | SigtraderError::UnknownStrategy { .. } => 2,
            SigtraderError::Data { .. } => 3,
            SigtraderError::NoData { .. }
            | SigtraderError::InsufficientData { .. }
            | SigtraderError::MisalignedSeries { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_strategy() {
        let err = SigtraderError::UnknownStrategy {
            name: "momentum".into(),
        };
        assert_eq!(err.to_string(), "unknown strategy: momentum");
    }

    #[test]
    fn display_misaligned_series() {
        let err = SigtraderError::MisalignedSeries {
            bars: 100,
            signals: 99,
        };
        assert_eq!(
            err.to_string(),
            "signal series has 99 points but price series has 100 bars"
        );
    }

    #[test]
    fn exit_code_mapping_covers_all_variants() {
        // ExitCode has no PartialEq; exercising the conversion is enough to
        // keep the match total
        let errors = [
            SigtraderError::ConfigMissing {
                section: "backtest".into(),
                key: "initial_capital".into(),
            },
            SigtraderError::UnknownStrategy {
                name: "momentum".into(),
            },
            SigtraderError::NoData {
                path: "prices.csv".into(),
            },
            SigtraderError::Data {
                reason: "bad row".into(),
            },
            SigtraderError::MisalignedSeries {
                bars: 2,
                signals: 1,
            },
        ];
        for err in &errors {
            let _code: std::process::ExitCode = err.into();
        }
    }
}
