#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("SQL parsing error: {0}")]
    SqlParser(#[from] sqlparser::parser::ParserError),
    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),
    #[error("Invalid query structure: {0}")]
    InvalidQuery(String),
}
