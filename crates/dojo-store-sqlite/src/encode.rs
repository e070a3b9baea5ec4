//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs are hyphenated lowercase strings,
//! player snapshots are compact JSON, and enums use their lowercase names.

use chrono::{DateTime, Utc};
use dojo_core::{
  competitor::Competitor,
  matches::{Match, MatchStatus, MatchType, PlayerSnapshot},
  store::StoredMatch,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

/// Turn a user filter into a `LIKE ... ESCAPE '\'` pattern matching it as a
/// plain substring.
pub fn like_pattern(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len() + 2);
  escaped.push('%');
  for ch in text.chars() {
    if matches!(ch, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(ch);
  }
  escaped.push('%');
  escaped
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_match_type(s: &str) -> Result<MatchType> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown match type: {s:?}")))
}

pub fn decode_status(s: &str) -> Result<MatchStatus> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown match status: {s:?}")))
}

// ─── Snapshots ───────────────────────────────────────────────────────────────

pub fn encode_snapshot(p: &PlayerSnapshot) -> Result<String> {
  Ok(serde_json::to_string(p)?)
}

pub fn decode_snapshot(s: &str) -> Result<PlayerSnapshot> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawCompetitor`].
pub const COMPETITOR_COLUMNS: &str = "competitor_id, created_at, name, age, master, belt, \
                                      weight, district, city, email";

/// Raw values read directly from a `competitors` row.
pub struct RawCompetitor {
  pub competitor_id: String,
  pub created_at:    String,
  pub name:          String,
  pub age:           Option<u32>,
  pub master:        Option<String>,
  pub belt:          Option<String>,
  pub weight:        Option<String>,
  pub district:      Option<String>,
  pub city:          Option<String>,
  pub email:         Option<String>,
}

impl RawCompetitor {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      competitor_id: row.get(0)?,
      created_at:    row.get(1)?,
      name:          row.get(2)?,
      age:           row.get(3)?,
      master:        row.get(4)?,
      belt:          row.get(5)?,
      weight:        row.get(6)?,
      district:      row.get(7)?,
      city:          row.get(8)?,
      email:         row.get(9)?,
    })
  }

  pub fn encode(c: &Competitor) -> Self {
    Self {
      competitor_id: encode_uuid(c.id),
      created_at:    encode_dt(c.created_at),
      name:          c.name.clone(),
      age:           c.age,
      master:        c.master.clone(),
      belt:          c.belt.clone(),
      weight:        c.weight.clone(),
      district:      c.district.clone(),
      city:          c.city.clone(),
      email:         c.email.clone(),
    }
  }

  pub fn insert(&self, conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute(
      &format!(
        "INSERT INTO competitors ({COMPETITOR_COLUMNS})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
      ),
      rusqlite::params![
        self.competitor_id,
        self.created_at,
        self.name,
        self.age,
        self.master,
        self.belt,
        self.weight,
        self.district,
        self.city,
        self.email,
      ],
    )?;
    Ok(())
  }

  pub fn into_competitor(self) -> Result<Competitor> {
    Ok(Competitor {
      id:         decode_uuid(&self.competitor_id)?,
      created_at: decode_dt(&self.created_at)?,
      name:       self.name,
      age:        self.age,
      master:     self.master,
      belt:       self.belt,
      weight:     self.weight,
      district:   self.district,
      city:       self.city,
      email:      self.email,
    })
  }
}

/// Column list matching the field order of [`RawMatch`].
pub const MATCH_COLUMNS: &str = "match_id, match_number, player1, player2, player1_marks, \
                                 player2_marks, winner, match_type, status, created_at, \
                                 updated_at";

/// Raw values read directly from (or written to) a `matches` row.
pub struct RawMatch {
  pub match_id:      String,
  pub match_number:  u32,
  pub player1:       String,
  pub player2:       String,
  pub player1_marks: Option<f64>,
  pub player2_marks: Option<f64>,
  pub winner:        Option<String>,
  pub match_type:    String,
  pub status:        String,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawMatch {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      match_id:      row.get(0)?,
      match_number:  row.get(1)?,
      player1:       row.get(2)?,
      player2:       row.get(3)?,
      player1_marks: row.get(4)?,
      player2_marks: row.get(5)?,
      winner:        row.get(6)?,
      match_type:    row.get(7)?,
      status:        row.get(8)?,
      created_at:    row.get(9)?,
      updated_at:    row.get(10)?,
    })
  }

  pub fn encode(stored: &StoredMatch) -> Result<Self> {
    let record = &stored.record;
    Ok(Self {
      match_id:      encode_uuid(stored.match_id),
      match_number:  record.match_number,
      player1:       encode_snapshot(&record.player1)?,
      player2:       encode_snapshot(&record.player2)?,
      player1_marks: record.player1_marks,
      player2_marks: record.player2_marks,
      winner:        record.winner.clone(),
      match_type:    record.match_type.as_ref().to_owned(),
      status:        record.status.as_ref().to_owned(),
      created_at:    encode_dt(stored.created_at),
      updated_at:    encode_dt(stored.updated_at),
    })
  }

  pub fn insert(&self, conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute(
      &format!(
        "INSERT INTO matches ({MATCH_COLUMNS})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
      ),
      &self.params()[..],
    )?;
    Ok(())
  }

  /// Overwrite every column except `created_at` (`?10` is bound but unused).
  /// Returns the number of rows changed.
  pub fn update(&self, conn: &rusqlite::Connection) -> rusqlite::Result<usize> {
    conn.execute(
      "UPDATE matches SET
         match_number = ?2, player1 = ?3, player2 = ?4,
         player1_marks = ?5, player2_marks = ?6, winner = ?7,
         match_type = ?8, status = ?9, updated_at = ?11
       WHERE match_id = ?1",
      &self.params()[..],
    )
  }

  fn params(&self) -> [&dyn rusqlite::ToSql; 11] {
    [
      &self.match_id,
      &self.match_number,
      &self.player1,
      &self.player2,
      &self.player1_marks,
      &self.player2_marks,
      &self.winner,
      &self.match_type,
      &self.status,
      &self.created_at,
      &self.updated_at,
    ]
  }

  pub fn into_stored(self) -> Result<StoredMatch> {
    Ok(StoredMatch {
      match_id:   decode_uuid(&self.match_id)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      record:     Match {
        match_number:  self.match_number,
        player1:       decode_snapshot(&self.player1)?,
        player2:       decode_snapshot(&self.player2)?,
        player1_marks: self.player1_marks,
        player2_marks: self.player2_marks,
        winner:        self.winner,
        match_type:    decode_match_type(&self.match_type)?,
        status:        decode_status(&self.status)?,
      },
    })
  }
}
