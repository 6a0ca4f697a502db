use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid form JSON at {line}:{column}: {message}")]
    InvalidJson {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Form root must be of type 'root', found '{found}'")]
    InvalidRoot { found: String },

    #[error("Failed to serialize form: {0}")]
    Serialize(String),
}

impl ModelError {
    pub fn invalid_root(found: impl Into<String>) -> Self {
        Self::InvalidRoot {
            found: found.into(),
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_data() || e.is_syntax() || e.is_eof() {
            ModelError::InvalidJson {
                line: e.line(),
                column: e.column(),
                message: e.to_string(),
            }
        } else {
            ModelError::Serialize(e.to_string())
        }
    }
}
