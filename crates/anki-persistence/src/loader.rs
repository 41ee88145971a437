use crate::error::{Error, Result};
use anki_model::*;
use anki_package::DbVersion;
use rusqlite::{Connection, Row};
use serde_json::Value as Json;
use std::collections::BTreeMap;

/// Reads the three tables the collection is built from (`col`, `notes`,
/// `cards`) and materializes a [`Collection`] according to the schema-version
/// specific rules in `SPEC_FULL.md` §4.2. The two versions share everything
/// except field-ordinal derivation, deck today-counters, and tag-set source —
/// captured below by `db_version` branches rather than two parallel types,
/// since every other step is identical.
pub fn load(conn: &Connection, db_version: DbVersion) -> Result<Collection> {
    let (col_id, crt, mod_millis, scm, ver, dty, usn, ls, conf, models_json, decks_json, dconf_json, tags_json) =
        read_col_row(conn, db_version)?;

    let models = build_models(&models_json, db_version)?;
    let decks = build_decks(&decks_json, db_version)?;
    let deck_configs = build_deck_configs(&dconf_json)?;
    let notes = build_notes(conn, &models)?;
    let cards = build_cards(conn)?;

    let tags = match db_version {
        DbVersion::V21 => tags_json
            .as_object()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default(),
        DbVersion::V2 => notes
            .values()
            .flat_map(|n: &Note| n.tags.iter().cloned())
            .collect(),
    };

    Ok(Collection {
        id: col_id,
        created_secs: crt,
        mod_time_millis: mod_millis,
        schema_mod_time_millis: scm,
        schema_version: ver as u32,
        dirty: dty != 0,
        usn: Usn(usn as i32),
        last_sync_secs: ls,
        models,
        decks,
        deck_configs,
        notes,
        cards,
        tags,
        config: conf,
    })
}

#[allow(clippy::type_complexity)]
fn read_col_row(
    conn: &Connection,
    db_version: DbVersion,
) -> Result<(
    i64,
    i64,
    i64,
    i64,
    i64,
    i64,
    i64,
    i64,
    Json,
    Json,
    Json,
    Json,
    Json,
)> {
    // v2 collections have no `tags` column on `col`; v21 does. Select the
    // common columns plus, for v21 only, the extra tags blob.
    let sql = match db_version {
        DbVersion::V2 => {
            "SELECT id, crt, mod, scm, ver, dty, usn, ls, conf, models, decks, dconf FROM col LIMIT 1"
        }
        DbVersion::V21 => {
            "SELECT id, crt, mod, scm, ver, dty, usn, ls, conf, models, decks, dconf, tags FROM col LIMIT 1"
        }
    };
    conn.query_row(sql, [], |row: &Row| {
        let parse = |s: String| -> Json { serde_json::from_str(&s).unwrap_or(Json::Null) };
        let tags_json = match db_version {
            DbVersion::V2 => Json::Object(Default::default()),
            DbVersion::V21 => parse(row.get::<_, String>(12)?),
        };
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, i64>(5)?,
            row.get::<_, i64>(6)?,
            row.get::<_, i64>(7)?,
            parse(row.get::<_, String>(8)?),
            parse(row.get::<_, String>(9)?),
            parse(row.get::<_, String>(10)?),
            parse(row.get::<_, String>(11)?),
            tags_json,
        ))
    })
    .map_err(|_| Error::MissingColRow)
}

fn build_models(models_json: &Json, db_version: DbVersion) -> Result<BTreeMap<ModelId, Model>> {
    let mut out = BTreeMap::new();
    let obj = models_json.as_object().cloned().unwrap_or_default();
    for (id_str, data) in obj {
        let id = ModelId(id_str.parse().unwrap_or(0));
        let name = data["name"].as_str().unwrap_or_default().to_string();
        let mut fields: Vec<Field> = Vec::new();
        let flds = data["flds"].as_array().cloned().unwrap_or_default();
        match db_version {
            DbVersion::V2 => {
                for (i, f) in flds.iter().enumerate() {
                    fields.push(field_from_json(f, i as u16));
                }
            }
            DbVersion::V21 => {
                let mut with_ord: Vec<(u16, &Json)> = flds
                    .iter()
                    .map(|f| (f["ord"].as_u64().unwrap_or(0) as u16, f))
                    .collect();
                with_ord.sort_by_key(|(ord, _)| *ord);
                for (ord, f) in with_ord {
                    fields.push(field_from_json(f, ord));
                }
            }
        }

        let mut templates: Vec<Template> = Vec::new();
        let tmpls = data["tmpls"].as_array().cloned().unwrap_or_default();
        let mut with_ord: Vec<(u16, &Json)> = tmpls
            .iter()
            .map(|t| (t["ord"].as_u64().unwrap_or(0) as u16, t))
            .collect();
        with_ord.sort_by_key(|(ord, _)| *ord);
        for (ord, t) in with_ord {
            templates.push(Template {
                name: t["name"].as_str().unwrap_or_default().to_string(),
                ord,
                question_format: t["qfmt"].as_str().unwrap_or_default().to_string(),
                answer_format: t["afmt"].as_str().unwrap_or_default().to_string(),
                browser_font_name: t["bfont"].as_str().map(String::from),
                browser_font_size: t["bsize"].as_u64().map(|v| v as u32),
            });
        }

        let model = Model {
            id,
            name,
            fields,
            templates,
            css: data["css"].as_str().unwrap_or_default().to_string(),
            default_deck_id: DeckId(data["did"].as_i64().unwrap_or(1)),
            mod_time_secs: data["mod"].as_i64().unwrap_or(0),
            kind: if data["type"].as_i64().unwrap_or(0) == 1 {
                ModelKind::Cloze
            } else {
                ModelKind::Standard
            },
            usn: Usn(data["usn"].as_i64().unwrap_or(-1) as i32),
            version: data["vers"].as_u64().unwrap_or(1) as u32,
            latex_pre: data["latexPre"].as_str().map(String::from),
            latex_post: data["latexPost"].as_str().map(String::from),
            latex_svg: data["latexsvg"].as_bool().unwrap_or(false),
            tags: data["tags"].as_array().map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            }),
        };
        out.insert(id, model);
    }
    Ok(out)
}

fn field_from_json(f: &Json, ord: u16) -> Field {
    Field {
        name: f["name"].as_str().unwrap_or_default().to_string(),
        ord,
        font: f["font"].as_str().unwrap_or("Arial").to_string(),
        font_size: f["size"].as_u64().unwrap_or(20) as u32,
        rtl: f["rtl"].as_bool().unwrap_or(false),
        sticky: f["sticky"].as_bool().unwrap_or(false),
        plain_text: f["plainText"].as_bool().unwrap_or(true),
        description: f["description"].as_str().unwrap_or_default().to_string(),
        collapsed: f["collapsed"].as_bool().unwrap_or(false),
    }
}

fn build_decks(decks_json: &Json, db_version: DbVersion) -> Result<BTreeMap<DeckId, Deck>> {
    let mut out = BTreeMap::new();
    let obj = decks_json.as_object().cloned().unwrap_or_default();
    for (id_str, data) in obj {
        let id = DeckId(id_str.parse().unwrap_or(0));
        let counter = |key: &str| -> DayCount {
            match db_version {
                DbVersion::V2 => DayCount::default(),
                DbVersion::V21 => {
                    let arr = data[key].as_array();
                    DayCount {
                        day: arr.and_then(|a| a.get(0)).and_then(Json::as_i64).unwrap_or(0),
                        count: arr.and_then(|a| a.get(1)).and_then(Json::as_i64).unwrap_or(0),
                    }
                }
            }
        };
        let deck = Deck {
            id,
            name: data["name"].as_str().unwrap_or_default().to_string(),
            description: data["desc"].as_str().unwrap_or_default().to_string(),
            mod_time_secs: data["mod"].as_i64().unwrap_or(0),
            usn: Usn(data["usn"].as_i64().unwrap_or(-1) as i32),
            collapsed: data["collapsed"].as_bool().unwrap_or(false),
            browser_collapsed: data["browserCollapsed"].as_bool().unwrap_or(false),
            dynamic: data["dyn"].as_i64().unwrap_or(0) != 0,
            new_today: counter("newToday"),
            review_today: counter("revToday"),
            learn_today: counter("lrnToday"),
            time_today: counter("timeToday"),
            conf_id: DeckConfigId(data["conf"].as_i64().unwrap_or(1)),
        };
        out.insert(id, deck);
    }
    Ok(out)
}

fn build_deck_configs(dconf_json: &Json) -> Result<BTreeMap<DeckConfigId, DeckConfig>> {
    let mut out = BTreeMap::new();
    let obj = dconf_json.as_object().cloned().unwrap_or_default();
    for (id_str, data) in obj {
        let id = DeckConfigId(id_str.parse().unwrap_or(0));
        let mut config = DeckConfig::new(id, data["name"].as_str().unwrap_or_default());
        config.mod_time_secs = data["mod"].as_i64().unwrap_or(0);
        config.usn = Usn(data["usn"].as_i64().unwrap_or(-1) as i32);
        if let Some(new) = data.get("new") {
            config.new.bury = new["bury"].as_bool().unwrap_or(false);
            config.new.order = new["order"].as_i64().unwrap_or(1);
            config.new.per_day = new["perDay"].as_i64().unwrap_or(20);
            config.new.initial_factor = new["initialFactor"].as_i64().unwrap_or(2500);
        }
        if let Some(rev) = data.get("rev") {
            config.review.per_day = rev["perDay"].as_i64().unwrap_or(200);
            config.review.max_interval = rev["maxIvl"].as_i64().unwrap_or(36500);
        }
        if let Some(lapse) = data.get("lapse") {
            config.lapse.leech_fails = lapse["leechFails"].as_i64().unwrap_or(8);
            config.lapse.min_interval = lapse["minInt"].as_i64().unwrap_or(1);
        }
        out.insert(id, config);
    }
    Ok(out)
}

fn build_notes(conn: &Connection, models: &BTreeMap<ModelId, Model>) -> Result<BTreeMap<NoteId, Note>> {
    let mut stmt = conn.prepare(
        "SELECT id, guid, mid, mod, usn, tags, flds, sfld, csum, flags FROM notes",
    )?;
    let mut out = BTreeMap::new();
    let rows = stmt.query_map([], |row: &Row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, i64>(7)?,
            row.get::<_, i64>(8)?,
            row.get::<_, i64>(9)?,
        ))
    })?;
    for row in rows {
        let (id, guid, mid, mod_time, usn, tags, flds, sfld, csum, flags) = row?;
        let model_id = ModelId(mid);
        let fields = match models.get(&model_id) {
            Some(model) => Note::unpack_fields(&flds, model),
            None => BTreeMap::new(),
        };
        let note = Note {
            id: NoteId(id),
            guid,
            model_id,
            mod_time_secs: mod_time,
            usn: Usn(usn as i32),
            tags: tags.split_whitespace().map(String::from).collect(),
            fields,
            sort_field_index: sfld as u16,
            checksum: csum,
            flags: flags as u32,
            data: String::new(),
        };
        out.insert(note.id, note);
    }
    Ok(out)
}

fn build_cards(conn: &Connection) -> Result<BTreeMap<CardId, Card>> {
    let mut stmt = conn.prepare(
        "SELECT id, nid, did, ord, mod, usn, type, queue, due, ivl, factor, reps, lapses, \
         left, odue, odid, flags FROM cards",
    )?;
    let mut out = BTreeMap::new();
    let rows = stmt.query_map([], |row: &Row| {
        Ok(Card {
            id: CardId(row.get(0)?),
            note_id: NoteId(row.get(1)?),
            deck_id: DeckId(row.get(2)?),
            ord: row.get::<_, i64>(3)? as u16,
            mod_time_secs: row.get(4)?,
            usn: Usn(row.get::<_, i64>(5)? as i32),
            card_type: row.get(6)?,
            queue: row.get(7)?,
            due: row.get(8)?,
            interval: row.get(9)?,
            factor: row.get(10)?,
            reps: row.get(11)?,
            lapses: row.get(12)?,
            left: row.get(13)?,
            original_due: row.get(14)?,
            original_deck_id: DeckId(row.get(15)?),
            flags: row.get::<_, i64>(16)? as u32,
            data: String::new(),
        })
    })?;
    for row in rows {
        let card = row?;
        out.insert(card.id, card);
    }
    Ok(out)
}
