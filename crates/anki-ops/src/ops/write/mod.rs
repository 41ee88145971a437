mod add_field;
mod add_model;
mod divide_decks;
mod migrate_notes;
mod populate_fields;
mod remove_empty_notes;
mod rename_field;
mod rename_model;
mod tag_notes;

pub use add_field::AddFieldOperation;
pub use add_model::AddModelOperation;
pub use divide_decks::DivideIntoDecksByTagsOperation;
pub use migrate_notes::MigrateNotesOperation;
pub use populate_fields::PopulateFieldsOperation;
pub use remove_empty_notes::RemoveEmptyNotesOperation;
pub use rename_field::RenameFieldOperation;
pub use rename_model::RenameModelOperation;
pub use tag_notes::TagNotesOperation;
