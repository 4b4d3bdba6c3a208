use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown host: {0}")]
    UnknownHost(String),

    #[error("Remote command failed (exit {exit_code}): {command}\n{stderr}")]
    RemoteCommand {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Database dump failed: {0}")]
    Dump(String),

    #[error("Refusing to replace database: '{0}' is not a disposable local/demo target")]
    UnsafeTarget(String),

    #[error("Too many recipients: {0} (provider limit is 990). Break into chunks")]
    TooManyRecipients(usize),

    #[error("Recipient {0} appears in both to and cc/bcc")]
    DuplicateRecipient(String),

    #[error("Mail send failed: status={status}, body={body}")]
    Mail { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::UnknownHost(_) => "UNKNOWN_HOST",
            Error::RemoteCommand { .. } => "REMOTE_COMMAND_FAILED",
            Error::Dump(_) => "DUMP_ERROR",
            Error::UnsafeTarget(_) => "UNSAFE_TARGET",
            Error::TooManyRecipients(_) => "TOO_MANY_RECIPIENTS",
            Error::DuplicateRecipient(_) => "DUPLICATE_RECIPIENT",
            Error::Mail { .. } => "MAIL_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }
    }
}
