use crate::args::{Args, OperationArgument};
use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::result::OperationResult;
use anki_model::{Collection, Deck, DeckId};
use anki_persistence::Change;
use regex::Regex;
use serde_json::json;
use std::collections::BTreeMap;

/// Splits the cards of a deck into per-episode-range sub-decks. A note's
/// card is bucketed by the first tag of the form `{tag_prefix}_<N>` whose
/// full text also matches `tag_pattern` (searched against the whole tag,
/// not the part following the prefix — e.g. `tag_prefix="Episode"` and
/// `tag_pattern="Episode_(\d+)"` against tag `"Episode_12"`).
pub struct DivideIntoDecksByTagsOperation {
    args: Args,
    schema: Vec<OperationArgument>,
    source_deck_id: Option<DeckId>,
    tag_pattern: Option<Regex>,
}

impl DivideIntoDecksByTagsOperation {
    pub fn schema() -> Vec<OperationArgument> {
        vec![
            OperationArgument::required("source_deck", "Name of the deck to divide"),
            OperationArgument::required("tag_prefix", "Prefix identifying the episode tag"),
            OperationArgument::required("tag_pattern", "Regex with a capture group for the episode number"),
            OperationArgument::required("episodes_per_deck", "Number of episodes grouped into each sub-deck"),
            OperationArgument::optional("target_deck_prefix", "Prefix for generated sub-deck names", json!("")),
        ]
    }

    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let schema = Self::schema();
        Ok(DivideIntoDecksByTagsOperation {
            args: Args::build(&schema, supplied)?,
            schema,
            source_deck_id: None,
            tag_pattern: None,
        })
    }
}

impl Operation for DivideIntoDecksByTagsOperation {
    fn name(&self) -> &'static str {
        "divide-decks-by-tags"
    }

    fn description(&self) -> &'static str {
        "Divide a deck's cards into sub-decks by episode number tags"
    }

    fn readonly(&self) -> bool {
        false
    }

    fn arguments(&self) -> &[OperationArgument] {
        &self.schema
    }

    fn validate(&mut self, collection: &Collection) -> Result<()> {
        let deck_name = self.args.string("source_deck");
        let deck = collection
            .deck_by_name(&deck_name)
            .ok_or_else(|| Error::DeckNotFound(deck_name.clone()))?;

        let pattern_str = self.args.string("tag_pattern");
        let regex = Regex::new(&pattern_str).map_err(|_| Error::InvalidRegex(pattern_str.clone()))?;
        if regex.captures_len() < 2 {
            return Err(Error::PatternMissingCaptureGroup);
        }
        if self.args.i64("episodes_per_deck").unwrap_or(0) <= 0 {
            return Err(Error::InvalidArgument {
                name: "episodes_per_deck".to_string(),
                reason: "must be a positive integer".to_string(),
            });
        }

        self.source_deck_id = Some(deck.id);
        self.tag_pattern = Some(regex);
        Ok(())
    }

    fn execute(&mut self, collection: &mut Collection) -> Result<OperationResult> {
        let source_deck_id = self.source_deck_id.expect("validate called before execute");
        let tag_prefix = self.args.string("tag_prefix");
        let episodes_per_deck = self.args.i64("episodes_per_deck").unwrap_or(1).max(1);
        let target_prefix = self.args.string("target_deck_prefix");
        let target_prefix = if target_prefix.is_empty() {
            collection.deck(source_deck_id)?.name.clone()
        } else {
            target_prefix
        };
        let tag_filter_prefix = format!("{tag_prefix}_");
        let pattern = self.tag_pattern.take().expect("validate called before execute");

        let card_ids: Vec<_> = collection
            .cards
            .values()
            .filter(|c| c.deck_id == source_deck_id)
            .map(|c| (c.id, c.note_id))
            .collect();

        let mut changes = Vec::new();
        let mut deck_cache: BTreeMap<String, DeckId> = BTreeMap::new();
        let mut moved = 0usize;

        for (card_id, note_id) in card_ids {
            let note = collection.note(note_id)?;
            let episode = note.tags.iter().find_map(|tag| {
                if !tag.starts_with(&tag_filter_prefix) {
                    return None;
                }
                let captures = pattern.captures(tag)?;
                captures.get(1)?.as_str().parse::<i64>().ok()
            });
            let Some(episode) = episode else {
                continue;
            };

            let bucket_start = ((episode - 1) / episodes_per_deck) * episodes_per_deck + 1;
            let bucket_end = bucket_start + episodes_per_deck - 1;
            let deck_name = format!("{target_prefix} {bucket_start}-{bucket_end}");

            let target_deck_id = if let Some(id) = deck_cache.get(&deck_name) {
                *id
            } else if let Some(existing) = collection.deck_by_name(&deck_name) {
                let id = existing.id;
                deck_cache.insert(deck_name.clone(), id);
                id
            } else {
                let id = collection.next_deck_id();
                let conf_id = collection.deck(source_deck_id)?.conf_id;
                let deck = Deck::new(id, deck_name.clone(), conf_id);
                collection.insert_deck(deck);
                deck_cache.insert(deck_name.clone(), id);
                changes.push(Change::DeckCreated { decks: collection.decks.clone() });
                id
            };

            if target_deck_id != source_deck_id {
                collection.cards.get_mut(&card_id).expect("card id collected from source deck filter").deck_id = target_deck_id;
                changes.push(Change::CardMoved {
                    card_id,
                    source_deck_id,
                    target_deck_id,
                });
                moved += 1;
            }
        }

        Ok(OperationResult::ok(format!("Moved {moved} cards into {} sub-decks", deck_cache.len())).with_changes(changes))
    }
}
