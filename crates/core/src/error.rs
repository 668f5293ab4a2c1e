use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeredityError {
    #[error("Invalid pedigree: {0}")]
    InvalidPedigree(String),

    #[error("Invalid hypothesis: {0}")]
    InvalidHypothesis(String),

    #[error("Probability model error: {0}")]
    Model(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, HeredityError>;
