use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("{sink} unavailable: {reason}")]
    Unavailable { sink: &'static str, reason: String },

    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    pub fn unavailable(sink: &'static str, reason: impl ToString) -> Self {
        TransportError::Unavailable {
            sink,
            reason: reason.to_string(),
        }
    }
}
