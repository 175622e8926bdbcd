//! SQLite-based record store.
//!
//! Provides persistent storage for:
//! - The member roster
//! - Attendance and redemption logs
//! - Gift catalog, agenda segments and follow-up notes
//!
//! The store loads whole collections into the engine's in-memory views and
//! writes single records back. Two ledger rules are re-enforced here for
//! hosts running several writers: the UNIQUE `(member_id, date_str)` index
//! on attendance, and the balance re-check in [`Database::redeem`].

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

use super::{data_dir, migrations};
use crate::agenda::{Agenda, MeetingSegment};
use crate::error::{DatabaseError, LedgerError, ValidationError};
use crate::follow_up::{FollowUpLog, InteractionKind};
use crate::ledger::{AttendanceRecord, CheckInMethod, Ledger, RedemptionRecord};
use crate::rewards::{GiftCatalog, GiftItem};
use crate::roster::{Member, Roster};
use crate::time::parse_time_of_day;

// === Helper Functions ===

fn conversion_failure(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn date_col(row: &Row, idx: usize) -> Result<NaiveDate, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| conversion_failure(idx, e))
}

fn opt_date_col(row: &Row, idx: usize) -> Result<Option<NaiveDate>, rusqlite::Error> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| conversion_failure(idx, e)))
        .transpose()
}

fn time_col(row: &Row, idx: usize) -> Result<chrono::NaiveTime, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    parse_time_of_day(&raw).map_err(|e| conversion_failure(idx, e))
}

fn enum_col<T>(row: &Row, idx: usize, parse: fn(&str) -> Option<T>) -> Result<T, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| {
        conversion_failure(
            idx,
            ValidationError::InvalidValue {
                field: format!("column {idx}"),
                message: format!("unrecognized value '{raw}'"),
            },
        )
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn format_time(t: chrono::NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _) if code.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn row_to_member(row: &Row) -> Result<Member, rusqlite::Error> {
    Ok(Member {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        birth_date: opt_date_col(row, 3)?,
        address: row.get(4)?,
        college: row.get(5)?,
        year: row.get(6)?,
        confession_father: row.get(7)?,
        responsible_servant: row.get(8)?,
        has_face_id: row.get::<_, i32>(9)? != 0,
        fingerprint_count: row.get(10)?,
    })
}

fn row_to_attendance(row: &Row) -> Result<AttendanceRecord, rusqlite::Error> {
    Ok(AttendanceRecord {
        id: row.get(0)?,
        member_id: row.get(1)?,
        timestamp: row.get(2)?,
        date_str: date_col(row, 3)?,
        points: row.get(4)?,
        method: enum_col(row, 5, CheckInMethod::parse)?,
    })
}

fn row_to_redemption(row: &Row) -> Result<RedemptionRecord, rusqlite::Error> {
    Ok(RedemptionRecord {
        id: row.get(0)?,
        member_id: row.get(1)?,
        gift_name: row.get(2)?,
        points_cost: row.get(3)?,
        timestamp: row.get(4)?,
        servant_name: row.get(5)?,
    })
}

fn row_to_segment(row: &Row) -> Result<MeetingSegment, rusqlite::Error> {
    Ok(MeetingSegment {
        id: row.get(0)?,
        date_str: date_col(row, 1)?,
        title: row.get(2)?,
        start_time: time_col(row, 3)?,
        end_time: time_col(row, 4)?,
        servant_name: row.get(5)?,
        notes: row.get(6)?,
        icon: row.get(7)?,
    })
}

fn row_to_follow_up(row: &Row) -> Result<FollowUpLog, rusqlite::Error> {
    Ok(FollowUpLog {
        id: row.get(0)?,
        member_id: row.get(1)?,
        timestamp: row.get(2)?,
        note: row.get(3)?,
        servant_name: row.get(4)?,
        kind: enum_col(row, 5, InteractionKind::parse)?,
    })
}

/// SQLite database for roster, ledger and agenda storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/rollcall.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        Self::open_at(&data_dir()?.join("rollcall.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, DatabaseError> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // === Members ===

    /// All members in the order they were first added.
    pub fn load_roster(&self) -> Result<Roster, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, phone, birth_date, address, college, year,
                    confession_father, responsible_servant, has_face_id, fingerprint_count
             FROM members ORDER BY position",
        )?;
        let members = stmt
            .query_map([], row_to_member)?
            .collect::<Result<Vec<Member>, _>>()?;
        Ok(Roster::from_members(members))
    }

    pub fn get_member(&self, id: &str) -> Result<Option<Member>, DatabaseError> {
        let member = self
            .conn
            .query_row(
                "SELECT id, name, phone, birth_date, address, college, year,
                        confession_father, responsible_servant, has_face_id, fingerprint_count
                 FROM members WHERE id = ?1",
                params![id],
                row_to_member,
            )
            .optional()?;
        Ok(member)
    }

    /// Insert a member, or update the profile of an existing one in place.
    pub fn upsert_member(&self, member: &Member) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO members (id, position, name, phone, birth_date, address, college, year,
                                  confession_father, responsible_servant, has_face_id, fingerprint_count)
             VALUES (?1, (SELECT COALESCE(MAX(position), 0) + 1 FROM members),
                     ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                phone = excluded.phone,
                birth_date = excluded.birth_date,
                address = excluded.address,
                college = excluded.college,
                year = excluded.year,
                confession_father = excluded.confession_father,
                responsible_servant = excluded.responsible_servant,
                has_face_id = excluded.has_face_id,
                fingerprint_count = excluded.fingerprint_count",
            params![
                member.id,
                member.name,
                member.phone,
                member.birth_date.map(format_date),
                member.address,
                member.college,
                member.year,
                member.confession_father,
                member.responsible_servant,
                member.has_face_id as i32,
                member.fingerprint_count,
            ],
        )?;
        Ok(())
    }

    /// Delete a member. Their ledger records stay; aggregate views drop them.
    pub fn delete_member(&self, id: &str) -> Result<bool, DatabaseError> {
        let n = self
            .conn
            .execute("DELETE FROM members WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    // === Ledger ===

    /// Both logs, in append order.
    pub fn load_ledger(&self) -> Result<Ledger, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, member_id, timestamp, date_str, points, method
             FROM attendance ORDER BY seq",
        )?;
        let attendance = stmt
            .query_map([], row_to_attendance)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT id, member_id, gift_name, points_cost, timestamp, servant_name
             FROM redemptions ORDER BY seq",
        )?;
        let redemptions = stmt
            .query_map([], row_to_redemption)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Ledger::from_records(attendance, redemptions))
    }

    /// Append an attendance record.
    ///
    /// A second record for the same member and date is rejected with
    /// `DuplicateCheckIn`, even if the in-memory check raced with another
    /// writer.
    pub fn insert_attendance(&self, record: &AttendanceRecord) -> Result<(), DatabaseError> {
        let result = self.conn.execute(
            "INSERT INTO attendance (id, member_id, timestamp, date_str, points, method)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.member_id,
                record.timestamp,
                format_date(record.date_str),
                record.points,
                record.method.as_str(),
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => {
                if self.has_attendance(&record.member_id, record.date_str)? {
                    return Err(LedgerError::DuplicateCheckIn {
                        member_id: record.member_id.clone(),
                        date: record.date_str,
                    }
                    .into());
                }
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn has_attendance(&self, member_id: &str, date: NaiveDate) -> Result<bool, DatabaseError> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM attendance WHERE member_id = ?1 AND date_str = ?2",
                params![member_id, format_date(date)],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        Ok(exists)
    }

    pub fn delete_attendance(&self, id: &str) -> Result<bool, DatabaseError> {
        let n = self
            .conn
            .execute("DELETE FROM attendance WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    pub fn insert_redemption(&self, record: &RedemptionRecord) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO redemptions (id, member_id, gift_name, points_cost, timestamp, servant_name)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.member_id,
                record.gift_name,
                record.points_cost,
                record.timestamp,
                record.servant_name,
            ],
        )?;
        Ok(())
    }

    /// Append a redemption after re-checking the member's balance.
    ///
    /// The balance is recomputed from the stored logs inside an immediate
    /// transaction, so a second writer holding a stale in-memory ledger
    /// cannot overspend. Returns the balance left after the redemption.
    pub fn redeem(&self, record: &RedemptionRecord) -> Result<i64, DatabaseError> {
        if record.points_cost <= 0 {
            return Err(LedgerError::InvalidAmount {
                amount: record.points_cost,
            }
            .into());
        }

        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let balance: i64 = tx.query_row(
            "SELECT (SELECT COALESCE(SUM(points), 0) FROM attendance WHERE member_id = ?1)
                  - (SELECT COALESCE(SUM(points_cost), 0) FROM redemptions WHERE member_id = ?1)",
            params![record.member_id],
            |row| row.get(0),
        )?;
        if record.points_cost > balance {
            return Err(LedgerError::InsufficientBalance {
                member_id: record.member_id.clone(),
                balance,
                requested: record.points_cost,
            }
            .into());
        }
        self.insert_redemption(record)?;
        tx.commit()?;
        Ok(balance - record.points_cost)
    }

    pub fn delete_redemption(&self, id: &str) -> Result<bool, DatabaseError> {
        let n = self
            .conn
            .execute("DELETE FROM redemptions WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    // === Gifts ===

    pub fn load_gifts(&self) -> Result<GiftCatalog, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, cost FROM gifts ORDER BY seq")?;
        let items = stmt
            .query_map([], |row| {
                Ok(GiftItem {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    cost: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GiftCatalog::from_items(items))
    }

    pub fn insert_gift(&self, gift: &GiftItem) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO gifts (id, name, cost) VALUES (?1, ?2, ?3)",
            params![gift.id, gift.name, gift.cost],
        )?;
        Ok(())
    }

    pub fn delete_gift(&self, id: &str) -> Result<bool, DatabaseError> {
        let n = self
            .conn
            .execute("DELETE FROM gifts WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    /// Fill an empty catalog with the starter gifts. Returns how many were added.
    pub fn seed_gifts_if_empty(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM gifts", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(0);
        }
        let starter = GiftCatalog::starter();
        for gift in starter.items() {
            self.insert_gift(gift)?;
        }
        tracing::info!(count = starter.items().len(), "seeded starter gift catalog");
        Ok(starter.items().len())
    }

    // === Agenda ===

    pub fn load_agenda(&self) -> Result<Agenda, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date_str, title, start_time, end_time, servant_name, notes, icon
             FROM segments ORDER BY date_str, start_time",
        )?;
        let segments = stmt
            .query_map([], row_to_segment)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Agenda::from_segments(segments))
    }

    /// Insert or replace a segment by id.
    pub fn upsert_segment(&self, segment: &MeetingSegment) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO segments
                (id, date_str, title, start_time, end_time, servant_name, notes, icon)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                segment.id,
                format_date(segment.date_str),
                segment.title,
                format_time(segment.start_time),
                format_time(segment.end_time),
                segment.servant_name,
                segment.notes,
                segment.icon,
            ],
        )?;
        Ok(())
    }

    pub fn delete_segment(&self, id: &str) -> Result<bool, DatabaseError> {
        let n = self
            .conn
            .execute("DELETE FROM segments WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    // === Follow-ups ===

    /// All follow-up notes, oldest first.
    pub fn load_follow_ups(&self) -> Result<Vec<FollowUpLog>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, member_id, timestamp, note, servant_name, kind
             FROM follow_ups ORDER BY seq",
        )?;
        let logs = stmt
            .query_map([], row_to_follow_up)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    pub fn insert_follow_up(&self, log: &FollowUpLog) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO follow_ups (id, member_id, timestamp, note, servant_name, kind)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                log.id,
                log.member_id,
                log.timestamp,
                log.note,
                log.servant_name,
                log.kind.as_str(),
            ],
        )?;
        Ok(())
    }
}
