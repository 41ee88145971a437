use anki_model::{CardId, DeckId, Model, ModelId, Note, NoteId};
use std::collections::BTreeMap;

/// A single structural edit emitted by an operation. Mirrors the richer,
/// unified taxonomy used by the source's `commons/changelog.py` plus the
/// `NoteDeleted`/`CardDeleted` variants its write operations (e.g.
/// `remove_empty_notes.py`) construct even though that module's own
/// `ChangeType` enum as retrieved in the pack omits them — both deletion
/// variants are reproduced here since callers depend on them.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    ModelUpdated {
        models: BTreeMap<ModelId, Model>,
    },
    NoteFieldsUpdated {
        note_id: NoteId,
        model_id: ModelId,
        fields: BTreeMap<String, String>,
    },
    NoteMigrated {
        note_id: NoteId,
        source_model_id: ModelId,
        target_model_id: ModelId,
        fields: BTreeMap<String, String>,
    },
    NoteTagsUpdated {
        note_id: NoteId,
        model_id: ModelId,
        tags: Vec<String>,
    },
    CardMoved {
        card_id: CardId,
        source_deck_id: DeckId,
        target_deck_id: DeckId,
    },
    DeckCreated {
        decks: BTreeMap<DeckId, anki_model::Deck>,
    },
    NoteDeleted {
        note_id: NoteId,
    },
    CardDeleted {
        card_id: CardId,
    },
}

impl Change {
    pub fn note_fields_updated(note: &Note) -> Change {
        Change::NoteFieldsUpdated {
            note_id: note.id,
            model_id: note.model_id,
            fields: note.fields.clone(),
        }
    }

    pub fn note_tags_updated(note: &Note) -> Change {
        Change::NoteTagsUpdated {
            note_id: note.id,
            model_id: note.model_id,
            tags: note.tags.clone(),
        }
    }
}

/// Append-only ordered sequence of changes accumulated within one run.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    changes: Vec<Change>,
}

impl ChangeLog {
    pub fn new() -> Self {
        ChangeLog { changes: Vec::new() }
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn extend(&mut self, changes: impl IntoIterator<Item = Change>) {
        self.changes.extend(changes);
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }
}
