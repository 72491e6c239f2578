use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadSetError {
    #[error("Can't read file: {0}")]
    FileReadError(String),

    #[error("Missing required column `{column}` in header of {file}")]
    MissingColumn { column: String, file: String },

    #[error("Error parsing line {line}: {reason}")]
    ParseError { line: usize, reason: String },

    #[error("Corrupted file. 0 records found in the file: {0}")]
    EmptyReadSet(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
