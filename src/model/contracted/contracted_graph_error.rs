use crate::model::network::VertexId;

#[derive(thiserror::Error, Debug)]
pub enum ContractedGraphError {
    #[error("failure reading contracted graph table: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },
    #[error("vertex {0} has no assigned contraction level")]
    MissingLevel(VertexId),
    #[error("shortcut {contracted_vertex} references vertex with no assigned level")]
    MissingShortcutVertexLevel { contracted_vertex: VertexId },
    #[error("hierarchy edge {from}->{to} violates level monotonicity: level({from})={from_level} >= level({to})={to_level}")]
    LevelViolation {
        from: VertexId,
        to: VertexId,
        from_level: u32,
        to_level: u32,
    },
}
