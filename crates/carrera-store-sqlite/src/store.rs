//! [`SqliteStore`], the SQLite implementation of [`ParticipantStore`].

use std::path::Path;

use carrera_core::{
  participant::{NewParticipant, Participant},
  store::{ParticipantPage, ParticipantQuery, ParticipantStore},
};
use chrono::Utc;
use rusqlite::{OptionalExtension as _, functions::FunctionFlags};
use tracing::debug;

use crate::{
  Result,
  encode::{PARTICIPANT_COLUMNS, RawParticipant, encode_dt, like_pattern},
  schema::SCHEMA,
};

/// Filter shared by the page query and its count. `?1` is a case-folded `LIKE`
/// pattern or NULL for no filter.
const SEARCH_FILTER: &str = "(?1 IS NULL
   OR fold_case(name)   LIKE ?1 ESCAPE '\\'
   OR phone             LIKE ?1 ESCAPE '\\'
   OR assigned_number   LIKE ?1 ESCAPE '\\'
   OR fold_case(sector) LIKE ?1 ESCAPE '\\')";

/// Register `fold_case(text)`, Unicode lowercasing. SQLite's built-in `lower()`
/// and `LIKE` fold ASCII only.
fn register_functions(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    "fold_case",
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| {
      let text: Option<String> = ctx.get(0)?;
      Ok(text.map(|t| t.to_lowercase()))
    },
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A participant store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  ///
  /// The containing directory is created if it does not exist.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent).await?;
    }

    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    debug!(path = %path.display(), "participant store opened");
    Ok(store)
  }

  /// Open an in-memory store for tests.
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
        register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch at most one participant matching `column = value`.
  ///
  /// `column` is always a compile-time constant, never caller input.
  async fn find_one_by(
    &self,
    column: &'static str,
    value: &str,
  ) -> Result<Option<Participant>> {
    let value = value.to_owned();

    let raw: Option<RawParticipant> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE {column} = ?1"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![value], RawParticipant::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawParticipant::into_participant).transpose()
  }
}

// ─── ParticipantStore impl ───────────────────────────────────────────────────

impl ParticipantStore for SqliteStore {
  type Error = crate::Error;

  async fn count(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM participants", [], |r| r.get(0))?)
      })
      .await?;
    Ok(n.max(0) as u64)
  }

  async fn next_id(&self) -> Result<u32> {
    let next: u32 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(MAX(id), 0) + 1 FROM participants",
          [],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(next)
  }

  async fn find_by_phone(&self, phone: &str) -> Result<Option<String>> {
    let phone = phone.to_owned();

    let name: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT name FROM participants WHERE phone = ?1",
              rusqlite::params![phone],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(name)
  }

  async fn find_participant_by_phone(
    &self,
    phone: &str,
  ) -> Result<Option<Participant>> {
    self.find_one_by("phone", phone).await
  }

  async fn find_by_assigned_number(
    &self,
    number: &str,
  ) -> Result<Option<Participant>> {
    self.find_one_by("assigned_number", number).await
  }

  async fn insert(&self, input: NewParticipant) -> Result<Participant> {
    let participant = Participant {
      id:              input.id,
      name:            input.name,
      sex:             input.sex,
      phone:           input.phone,
      sector:          input.sector,
      registered_at:   Utc::now(),
      assigned_number: input.assigned_number,
    };

    let id              = participant.id;
    let name            = participant.name.clone();
    let sex             = participant.sex.as_str();
    let phone           = participant.phone.clone();
    let sector          = participant.sector.clone();
    let registered_at   = encode_dt(participant.registered_at);
    let assigned_number = participant.assigned_number.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO participants (
             id, name, sex, phone, sector, registered_at, assigned_number
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id,
            name,
            sex,
            phone,
            sector,
            registered_at,
            assigned_number,
          ],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(participant)
  }

  async fn list(&self, query: &ParticipantQuery) -> Result<ParticipantPage> {
    let pattern = query
      .search
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(like_pattern);
    let limit_val  = i64::try_from(query.limit).unwrap_or(i64::MAX);
    let offset_val = i64::try_from(query.offset).unwrap_or(i64::MAX);

    let (raws, total): (Vec<RawParticipant>, i64) = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {PARTICIPANT_COLUMNS}
           FROM participants
           WHERE {SEARCH_FILTER}
           ORDER BY registered_at DESC, id DESC
           LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![pattern.as_deref(), limit_val, offset_val],
            RawParticipant::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM participants WHERE {SEARCH_FILTER}"),
          rusqlite::params![pattern.as_deref()],
          |r| r.get(0),
        )?;

        Ok((rows, total))
      })
      .await?;

    let participants = raws
      .into_iter()
      .map(RawParticipant::into_participant)
      .collect::<Result<_>>()?;

    Ok(ParticipantPage { participants, total: total.max(0) as u64 })
  }

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
