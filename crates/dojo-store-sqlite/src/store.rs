//! [`SqliteStore`], the SQLite implementation of [`TournamentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use dojo_core::{
  competitor::{Competitor, NewCompetitor},
  matches::Match,
  store::{CompetitorQuery, MatchQuery, StoredMatch, TournamentStore},
};

use crate::{
  Error, Result,
  encode::{
    COMPETITOR_COLUMNS, MATCH_COLUMNS, RawCompetitor, RawMatch, encode_uuid, like_pattern,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A tournament store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Give each record an id and timestamps, then insert them all in one
  /// transaction.
  async fn insert_stored(&self, records: Vec<Match>) -> Result<Vec<StoredMatch>> {
    let now = Utc::now();
    let stored: Vec<StoredMatch> = records
      .into_iter()
      .map(|record| StoredMatch {
        match_id: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
        record,
      })
      .collect();

    let rows = stored
      .iter()
      .map(RawMatch::encode)
      .collect::<Result<Vec<_>>>()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for row in &rows {
          row.insert(&tx)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(stored)
  }
}

// ─── TournamentStore impl ────────────────────────────────────────────────────

impl TournamentStore for SqliteStore {
  type Error = Error;

  // ── Competitors ───────────────────────────────────────────────────────────

  async fn add_competitor(&self, input: NewCompetitor) -> Result<Competitor> {
    let competitor = Competitor::register(input)?;
    let row = RawCompetitor::encode(&competitor);

    self
      .conn
      .call(move |conn| {
        row.insert(conn)?;
        Ok(())
      })
      .await?;

    Ok(competitor)
  }

  async fn add_competitors(&self, inputs: Vec<NewCompetitor>) -> Result<Vec<Competitor>> {
    let competitors = inputs
      .into_iter()
      .map(Competitor::register)
      .collect::<dojo_core::Result<Vec<_>>>()?;
    let rows: Vec<RawCompetitor> = competitors.iter().map(RawCompetitor::encode).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for row in &rows {
          row.insert(&tx)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(competitors)
  }

  async fn list_competitors(&self, query: &CompetitorQuery) -> Result<Vec<Competitor>> {
    let name       = query.name.as_deref().map(like_pattern);
    let master     = query.master.as_deref().map(like_pattern);
    let district   = query.district.as_deref().map(like_pattern);
    let belt       = query.belt.as_deref().map(like_pattern);
    let age        = query.age;
    let weight     = query.weight.clone();
    let limit_val  = query.limit.map_or(-1, |l| l as i64);
    let offset_val = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawCompetitor> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMPETITOR_COLUMNS} FROM competitors
           WHERE (?1 IS NULL OR name     LIKE ?1 ESCAPE '\\')
             AND (?2 IS NULL OR master   LIKE ?2 ESCAPE '\\')
             AND (?3 IS NULL OR district LIKE ?3 ESCAPE '\\')
             AND (?4 IS NULL OR belt     LIKE ?4 ESCAPE '\\')
             AND (?5 IS NULL OR age    = ?5)
             AND (?6 IS NULL OR weight = ?6)
           ORDER BY rowid
           LIMIT ?7 OFFSET ?8"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![name, master, district, belt, age, weight, limit_val, offset_val],
            RawCompetitor::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCompetitor::into_competitor).collect()
  }

  async fn delete_competitor(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM competitors WHERE competitor_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn clear_competitors(&self) -> Result<usize> {
    let removed = self
      .conn
      .call(|conn| Ok(conn.execute("DELETE FROM competitors", [])?))
      .await?;
    tracing::info!(removed, "cleared competitors");
    Ok(removed)
  }

  // ── Matches ───────────────────────────────────────────────────────────────

  async fn next_match_number(&self) -> Result<u32> {
    let max: u32 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(MAX(match_number), 0) FROM matches",
          [],
          |r| r.get(0),
        )?)
      })
      .await?;
    max
      .checked_add(1)
      .ok_or(Error::Core(dojo_core::Error::MatchNumbersExhausted))
  }

  async fn insert_match(&self, record: Match) -> Result<StoredMatch> {
    let mut stored = self.insert_stored(vec![record]).await?;
    stored
      .pop()
      .ok_or_else(|| Error::Decode("insert returned no match".to_owned()))
  }

  async fn insert_matches(&self, records: Vec<Match>) -> Result<Vec<StoredMatch>> {
    let stored = self.insert_stored(records).await?;
    tracing::info!(count = stored.len(), "inserted matches");
    Ok(stored)
  }

  async fn get_match(&self, id: Uuid) -> Result<Option<StoredMatch>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawMatch> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {MATCH_COLUMNS} FROM matches WHERE match_id = ?1"),
            rusqlite::params![id_str],
            RawMatch::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawMatch::into_stored).transpose()
  }

  async fn list_matches(&self, query: &MatchQuery) -> Result<Vec<StoredMatch>> {
    let status     = query.status.map(|s| s.as_ref().to_owned());
    let match_type = query.match_type.map(|t| t.as_ref().to_owned());

    let raws: Vec<RawMatch> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MATCH_COLUMNS} FROM matches
           WHERE (?1 IS NULL OR status = ?1)
             AND (?2 IS NULL OR match_type = ?2)
           ORDER BY match_number, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![status, match_type], RawMatch::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMatch::into_stored).collect()
  }

  async fn update_match(&self, id: Uuid, record: Match) -> Result<StoredMatch> {
    let existing = self
      .get_match(id)
      .await?
      .ok_or(Error::MatchNotFound(id))?;

    let stored = StoredMatch {
      match_id: id,
      created_at: existing.created_at,
      updated_at: Utc::now(),
      record,
    };
    let row = RawMatch::encode(&stored)?;

    let changed = self
      .conn
      .call(move |conn| Ok(row.update(conn)?))
      .await?;
    if changed == 0 {
      return Err(Error::MatchNotFound(id));
    }

    Ok(stored)
  }

  async fn delete_match(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM matches WHERE match_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn clear_matches(&self) -> Result<usize> {
    let removed = self
      .conn
      .call(|conn| Ok(conn.execute("DELETE FROM matches", [])?))
      .await?;
    tracing::info!(removed, "cleared matches");
    Ok(removed)
  }
}
