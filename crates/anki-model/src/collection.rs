use crate::card::Card;
use crate::deck::{Deck, DeckConfig};
use crate::error::{Error, Result};
use crate::ids::{CardId, DeckConfigId, DeckId, ModelId, NoteId, Usn};
use crate::model::Model;
use crate::note::Note;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// The root aggregate loaded from a single package file. Owns every entity
/// exclusively; Notes and Cards reference their Model/Note/Deck by id only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: i64,
    pub created_secs: i64,
    pub mod_time_millis: i64,
    pub schema_mod_time_millis: i64,
    pub schema_version: u32,
    pub dirty: bool,
    pub usn: Usn,
    pub last_sync_secs: i64,
    pub models: BTreeMap<ModelId, Model>,
    pub decks: BTreeMap<DeckId, Deck>,
    pub deck_configs: BTreeMap<DeckConfigId, DeckConfig>,
    pub notes: BTreeMap<NoteId, Note>,
    pub cards: BTreeMap<CardId, Card>,
    pub tags: HashSet<String>,
    pub config: serde_json::Value,
}

impl Collection {
    pub fn empty() -> Self {
        Collection {
            id: 1,
            created_secs: 0,
            mod_time_millis: 0,
            schema_mod_time_millis: 0,
            schema_version: 11,
            dirty: false,
            usn: Usn(0),
            last_sync_secs: 0,
            models: BTreeMap::new(),
            decks: BTreeMap::new(),
            deck_configs: BTreeMap::new(),
            notes: BTreeMap::new(),
            cards: BTreeMap::new(),
            tags: HashSet::new(),
            config: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn model(&self, id: ModelId) -> Result<&Model> {
        self.models.get(&id).ok_or(Error::UnknownModel(id))
    }

    pub fn model_mut(&mut self, id: ModelId) -> Result<&mut Model> {
        self.models.get_mut(&id).ok_or(Error::UnknownModel(id))
    }

    pub fn model_by_name(&self, name: &str) -> Option<&Model> {
        self.models.values().find(|m| m.name == name)
    }

    /// The unique model of the collection, used to disambiguate operations
    /// that accept an optional model name.
    pub fn sole_model(&self) -> Option<&Model> {
        if self.models.len() == 1 {
            self.models.values().next()
        } else {
            None
        }
    }

    pub fn insert_model(&mut self, model: Model) -> Result<()> {
        if self.models.values().any(|m| m.name == model.name) {
            return Err(Error::DuplicateModelName(model.name));
        }
        model.validate()?;
        self.models.insert(model.id, model);
        Ok(())
    }

    pub fn note(&self, id: NoteId) -> Result<&Note> {
        self.notes.get(&id).ok_or(Error::UnknownNote(id))
    }

    pub fn note_mut(&mut self, id: NoteId) -> Result<&mut Note> {
        self.notes.get_mut(&id).ok_or(Error::UnknownNote(id))
    }

    pub fn notes_for_model(&self, model_id: ModelId) -> impl Iterator<Item = &Note> {
        self.notes.values().filter(move |n| n.model_id == model_id)
    }

    pub fn insert_note(&mut self, note: Note) -> Result<()> {
        let model = self.model(note.model_id)?;
        note.validate_against(model)?;
        self.tags.extend(note.tags.iter().cloned());
        self.notes.insert(note.id, note);
        Ok(())
    }

    pub fn remove_note(&mut self, id: NoteId) -> Option<Note> {
        self.notes.remove(&id)
    }

    pub fn cards_for_note(&self, note_id: NoteId) -> impl Iterator<Item = &Card> {
        self.cards.values().filter(move |c| c.note_id == note_id)
    }

    pub fn deck(&self, id: DeckId) -> Result<&Deck> {
        self.decks.get(&id).ok_or(Error::UnknownDeck(id))
    }

    pub fn deck_by_name(&self, name: &str) -> Option<&Deck> {
        self.decks.values().find(|d| d.name == name)
    }

    pub fn insert_deck(&mut self, deck: Deck) {
        self.decks.insert(deck.id, deck);
    }

    pub fn insert_card(&mut self, card: Card) -> Result<()> {
        self.note(card.note_id)?;
        self.deck(card.deck_id)?;
        let note = self.notes.get(&card.note_id).unwrap();
        let model = self.model(note.model_id)?;
        if (card.ord as usize) >= model.templates.len() {
            return Err(Error::CardOrdinalOutOfRange {
                model: model.name.clone(),
                ord: card.ord,
                template_count: model.templates.len(),
            });
        }
        self.cards.insert(card.id, card);
        Ok(())
    }

    pub fn remove_card(&mut self, id: CardId) -> Option<Card> {
        self.cards.remove(&id)
    }

    /// Allocates the next unused id greater than any currently present,
    /// matching the source's "milliseconds since epoch" id convention
    /// closely enough for in-memory operation (ids here are simply
    /// monotonic increasing integers derived from the current maximum).
    pub fn next_model_id(&self) -> ModelId {
        ModelId(self.models.keys().map(|k| k.0).max().unwrap_or(0) + 1)
    }

    pub fn next_note_id(&self) -> NoteId {
        NoteId(self.notes.keys().map(|k| k.0).max().unwrap_or(0) + 1)
    }

    pub fn next_card_id(&self) -> CardId {
        CardId(self.cards.keys().map(|k| k.0).max().unwrap_or(0) + 1)
    }

    pub fn next_deck_id(&self) -> DeckId {
        DeckId(self.decks.keys().map(|k| k.0).max().unwrap_or(0) + 1)
    }

    /// Recomputes the collection-level tag set from every note's tags
    /// (invariant 5). Called after bulk tag mutation.
    pub fn recompute_tags(&mut self) {
        self.tags = self
            .notes
            .values()
            .flat_map(|n| n.tags.iter().cloned())
            .collect();
    }
}
