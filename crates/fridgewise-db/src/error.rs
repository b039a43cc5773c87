use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate {entity}: {name}")]
    Duplicate { entity: &'static str, name: String },

    #[error("Document store unavailable: {0}")]
    Unavailable(String),
}
