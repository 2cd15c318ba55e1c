use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("unexpected character '{0}' in dot-bracket string")]
    InvalidToken(char),

    #[error("unmatched '{0}' at position {1}")]
    UnmatchedBracket(char, usize),

    #[error("partner array is not symmetric at position {0}")]
    Asymmetric(usize),

    #[error("index {0} out of range for a structure of length {1}")]
    OutOfRange(usize, usize),

    #[error("pairs ({0},{1}) and ({2},{3}) cross, not representable in dot-bracket")]
    Pseudoknot(usize, usize, usize, usize),

    #[error("structure of length {0} exceeds the supported index range")]
    TooLong(usize),
}
