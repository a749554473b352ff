use schemapack_envelope::SchemaRef;

/// Errors reported by a schema registry client.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The schema text is not a valid schema.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// The schema text is incompatible with prior versions under the
    /// metadata's compatibility policy.
    #[error("schema incompatible with existing versions of \"{name}\": {reason}")]
    Incompatible { name: String, reason: String },

    /// No schema metadata is registered under the given name.
    #[error("schema metadata \"{0}\" not found")]
    MetadataNotFound(String),

    /// No schema exists for the given reference.
    #[error("no schema found for reference {0}")]
    SchemaNotFound(SchemaRef),

    /// The client handle was closed.
    #[error("registry client is closed")]
    Closed,

    /// Transport-level failure talking to the registry.
    #[error("registry I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
