use rill_api::RillError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Stage(#[from] RillError),

    #[error("verb \"{0}\" not found")]
    UnknownVerb(String),

    #[error("{verb}: {message}")]
    Usage { verb: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("channel to {0} closed unexpectedly")]
    ChannelClosed(String),

    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("pipeline cancelled")]
    Cancelled,
}

impl EngineError {
    /// Add context to the error.
    ///
    /// For `Stage` variant, context is added to the inner `RillError`.
    /// For message-carrying variants, context is prepended to the message.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            EngineError::Stage(e) => EngineError::Stage(e.with_context(ctx)),
            EngineError::Config(msg) => EngineError::Config(format!("{ctx}: {msg}")),
            EngineError::Usage { verb, message } => EngineError::Usage { verb, message: format!("{ctx}: {message}") },
            EngineError::Io(e) => EngineError::Io(std::io::Error::new(e.kind(), format!("{ctx}: {e}"))),
            other => other,
        }
    }

    /// Errors that should be reported before any input is read.
    pub fn is_usage(&self) -> bool {
        matches!(self, EngineError::UnknownVerb(_) | EngineError::Usage { .. } | EngineError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_reaches_the_inner_error() {
        let err = EngineError::from(RillError::format("bad line")).with_context("data.csv");
        assert_eq!(err.to_string(), "format error: data.csv: bad line");

        let err = EngineError::Config("missing verb".into()).with_context("stages[2]");
        assert_eq!(err.to_string(), "config error: stages[2]: missing verb");
    }

    #[test]
    fn io_context_keeps_the_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = EngineError::from(io).with_context("in.csv");
        match err {
            EngineError::Io(e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
                assert_eq!(e.to_string(), "in.csv: no such file");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn usage_errors_are_flagged() {
        assert!(EngineError::UnknownVerb("frob".into()).is_usage());
        assert!(!EngineError::Cancelled.is_usage());
    }
}
