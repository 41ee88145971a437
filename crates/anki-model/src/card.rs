use crate::ids::{CardId, DeckId, NoteId, Usn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i64)]
pub enum CardQueue {
    New = 0,
    Learning = 1,
    Review = 2,
    DayLearning = 3,
    Suspended = -1,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub note_id: NoteId,
    pub deck_id: DeckId,
    pub ord: u16,
    pub mod_time_secs: i64,
    pub usn: Usn,
    pub card_type: i64,
    pub queue: i64,
    pub due: i64,
    pub interval: i64,
    pub factor: i64,
    pub reps: i64,
    pub lapses: i64,
    pub left: i64,
    pub original_due: i64,
    pub original_deck_id: DeckId,
    pub flags: u32,
    pub data: String,
}

impl Card {
    pub fn new(id: CardId, note_id: NoteId, deck_id: DeckId, ord: u16) -> Self {
        Card {
            id,
            note_id,
            deck_id,
            ord,
            mod_time_secs: 0,
            usn: Usn(-1),
            card_type: 0,
            queue: 0,
            due: 0,
            interval: 0,
            factor: 0,
            reps: 0,
            lapses: 0,
            left: 0,
            original_due: 0,
            original_deck_id: DeckId(0),
            flags: 0,
            data: String::new(),
        }
    }
}
