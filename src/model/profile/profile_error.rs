#[derive(thiserror::Error, Debug)]
pub enum ProfileError {
    #[error("failure reading profile factor table: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },
    #[error("edge profile id {0} not found in factor table of size {1}")]
    EdgeProfileNotFound(u16, usize),
    #[error("profile table row is malformed: {0}")]
    InvalidRow(String),
}
