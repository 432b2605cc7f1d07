#[derive(thiserror::Error, Debug)]
pub enum RestrictionError {
    #[error("failure reading restrictions table: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },
    #[error("restriction row malformed: sequence '{0}' has fewer than 2 vertices")]
    SequenceTooShort(String),
    #[error("restriction row malformed: vertex id '{0}' is not a valid integer")]
    InvalidVertexId(String),
}
