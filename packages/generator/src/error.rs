use tessera_analyzer::StructuralParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error(transparent)]
    Parse(#[from] StructuralParseError),

    #[error("Block type name is empty")]
    EmptyName,

    #[error("Field name '{0}' is not a valid identifier")]
    InvalidFieldName(String),

    #[error("Field '{0}' already exists")]
    DuplicateField(String),

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Block type '{0}' already exists; pass overwrite to replace it")]
    TypeExists(String),
}

pub type GeneratorResult<T> = Result<T, GeneratorError>;
