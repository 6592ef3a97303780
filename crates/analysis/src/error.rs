use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("import `{specifier}` from `{importer}` escapes the repository root")]
    EscapesRoot { importer: String, specifier: String },

    #[error("Failed to set parser language: {0}")]
    ParserLanguage(String),
}
