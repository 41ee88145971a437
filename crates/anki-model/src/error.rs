use thiserror::Error;

/// Errors raised while constructing or mutating collection domain types.
///
/// These are shape/invariant violations only — persistence and package I/O
/// errors live in their own crates and are never converted into this enum.
#[derive(Error, Debug)]
pub enum Error {
    #[error("duplicate model name: '{0}'")]
    DuplicateModelName(String),

    #[error("duplicate field name '{field}' in model '{model}'")]
    DuplicateFieldName { model: String, field: String },

    #[error("duplicate template name '{template}' in model '{model}'")]
    DuplicateTemplateName { model: String, template: String },

    #[error("model has no fields")]
    EmptyFieldList,

    #[error("field ordinals of model '{0}' are not contiguous from zero")]
    NonContiguousFieldOrdinals(String),

    #[error("note references unknown model id {0:?}")]
    UnknownModel(crate::ModelId),

    #[error("note field keys do not match model '{model}': expected {expected:?}, got {got:?}")]
    FieldKeyMismatch {
        model: String,
        expected: Vec<String>,
        got: Vec<String>,
    },

    #[error("card references unknown note id {0:?}")]
    UnknownNote(crate::NoteId),

    #[error("card references unknown deck id {0:?}")]
    UnknownDeck(crate::DeckId),

    #[error("card ordinal {ord} out of range for model '{model}' ({template_count} templates)")]
    CardOrdinalOutOfRange {
        model: String,
        ord: u16,
        template_count: usize,
    },

    #[error("field value contains the reserved separator (U+001F)")]
    ValueContainsSeparator,
}

pub type Result<T> = std::result::Result<T, Error>;
