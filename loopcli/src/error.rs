use loopcore::utils::ParseMessage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration file '{file}': {source}")]
    ConfigParseError {
        source: toml::de::Error,
        file: String,
    },

    #[error("Configuration file '{0}' does not exist")]
    ConfigNotFound(String),

    #[error("Failed to encode output as JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid {input} `{text}`")]
    InvalidInput {
        input: &'static str,
        text: String,
        messages: Vec<ParseMessage>,
    },

    #[error(transparent)]
    Core(#[from] loopcore::Error),
}

impl CliError {
    /// Attaches the offending text to a parse failure so it can be reported with context.
    pub fn from_input(input: &'static str, text: &str, error: loopcore::Error) -> Self {
        match error {
            loopcore::Error::ParseErrors { messages } => CliError::InvalidInput {
                input,
                text: text.to_string(),
                messages,
            },
            other => CliError::Core(other),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
