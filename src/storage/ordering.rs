//! Chapter Order Maintenance
//!
//! Keeps the chapter positions of every project dense: for a project with N
//! chapters the positions are exactly `1..=N`, with no gaps or duplicates.
//!
//! ## Operations
//!
//! - **append**: next free position (`max + 1`, or 1 for an empty project)
//! - **move**: minimal-disturbance shift; only chapters strictly between the
//!   old and new position move, each by exactly one
//! - **remove_and_compact**: close the gap left by a deleted chapter
//! - **normalize**: full re-sequencing following the current order
//!
//! Multi-row mutations run inside `BEGIN IMMEDIATE` transactions (see
//! [`Database::write_transaction`]). SQLite then admits a single writer at a
//! time, so concurrent moves on the same project are serialized and the
//! bound check always sees the same rows the shift updates.
//!
//! The connection-level functions at the bottom of this module carry the SQL
//! so that chapter-store transactions (insert, delete) can compose them.

use std::collections::BTreeMap;

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::database::SharedDatabase;
use crate::types::{NovelError, OrderEntry, Result};

/// Result of a chapter move
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutcome {
    pub chapter_id: String,
    pub project_id: String,
    pub from: u32,
    pub to: u32,
    /// Number of sibling chapters whose position changed
    pub shifted: usize,
}

impl MoveOutcome {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Consistency report for one project's chapter positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReport {
    pub project_id: String,
    pub count: u32,
    /// Positions in `1..=count` that no chapter holds
    pub missing: Vec<u32>,
    /// Positions held by more than one chapter
    pub duplicates: Vec<u32>,
}

impl OrderReport {
    pub fn is_contiguous(&self) -> bool {
        self.missing.is_empty() && self.duplicates.is_empty()
    }
}

/// Result of re-sequencing a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeOutcome {
    /// Positions as found, before the repair
    #[serde(flatten)]
    pub before: OrderReport,
    /// Number of chapters whose position changed
    pub renumbered: usize,
}

impl NormalizeOutcome {
    pub fn was_contiguous(&self) -> bool {
        self.before.is_contiguous()
    }
}

/// Maintains the dense `1..=N` chapter order of each project.
#[derive(Clone)]
pub struct OrderMaintainer {
    db: SharedDatabase,
}

impl OrderMaintainer {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }

    /// Position a new chapter appended to `project_id` would take.
    pub fn append(&self, project_id: &str) -> Result<u32> {
        let conn = self.db.connection()?;
        next_position(&conn, project_id)
    }

    /// Current positions in ascending order.
    pub fn orders(&self, project_id: &str) -> Result<Vec<OrderEntry>> {
        let conn = self.db.connection()?;
        list_orders(&conn, project_id)
    }

    /// Move a chapter to `new_order`, shifting the chapters in between.
    ///
    /// Fails with `InvalidOrder` unless `1 <= new_order <= N`; nothing is
    /// written in that case.
    #[instrument(skip(self))]
    pub fn move_chapter(&self, chapter_id: &str, new_order: i64) -> Result<MoveOutcome> {
        let outcome = self
            .db
            .write_transaction(|conn| move_within(conn, chapter_id, new_order))?;

        if !outcome.is_noop() {
            info!(
                "Moved chapter {} from {} to {} ({} siblings shifted)",
                outcome.chapter_id, outcome.from, outcome.to, outcome.shifted
            );
        }
        Ok(outcome)
    }

    /// Close the gap left after the chapter at `deleted_order` was removed.
    pub fn remove_and_compact(&self, project_id: &str, deleted_order: u32) -> Result<usize> {
        self.db
            .write_transaction(|conn| compact_after(conn, project_id, deleted_order))
    }

    /// Reassign positions `1..=N` following the current order.
    ///
    /// The outcome reports the gaps and duplicates found before the repair.
    pub fn normalize(&self, project_id: &str) -> Result<NormalizeOutcome> {
        let outcome = self.db.write_transaction(|conn| {
            let before = inspect(project_id, &list_orders(conn, project_id)?);
            let renumbered = resequence(conn, project_id)?;
            Ok(NormalizeOutcome { before, renumbered })
        })?;
        if outcome.renumbered > 0 {
            info!(
                "Normalized project {}: {} chapters renumbered (missing {:?}, duplicated {:?})",
                project_id, outcome.renumbered, outcome.before.missing, outcome.before.duplicates
            );
        }
        Ok(outcome)
    }

    /// Inspect a project's positions without modifying them.
    pub fn check(&self, project_id: &str) -> Result<OrderReport> {
        let entries = self.orders(project_id)?;
        Ok(inspect(project_id, &entries))
    }
}

// =============================================================================
// Connection-level operations
// =============================================================================

/// Chapters of a project in ascending position order.
///
/// Ties (only possible if the invariant was broken) fall back to creation
/// time, then id, so that re-sequencing is deterministic.
pub fn list_orders(conn: &Connection, project_id: &str) -> Result<Vec<OrderEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, position FROM chapters
         WHERE project_id = ?1
         ORDER BY position, created_at, id",
    )?;

    let entries = stmt
        .query_map(params![project_id], |row| {
            Ok(OrderEntry {
                id: row.get(0)?,
                order: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(entries)
}

pub fn chapter_count(conn: &Connection, project_id: &str) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM chapters WHERE project_id = ?1",
        params![project_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn next_position(conn: &Connection, project_id: &str) -> Result<u32> {
    let max: u32 = conn.query_row(
        "SELECT COALESCE(MAX(position), 0) FROM chapters WHERE project_id = ?1",
        params![project_id],
        |row| row.get(0),
    )?;
    Ok(max + 1)
}

/// Apply a move inside the caller's transaction.
pub fn move_within(conn: &Connection, chapter_id: &str, new_order: i64) -> Result<MoveOutcome> {
    let (project_id, old_order): (String, u32) = conn
        .query_row(
            "SELECT project_id, position FROM chapters WHERE id = ?1",
            params![chapter_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?
        .ok_or_else(|| NovelError::NotFound("Chapter".to_string()))?;

    let count = chapter_count(conn, &project_id)?;
    if new_order < 1 || new_order > i64::from(count) {
        return Err(NovelError::InvalidOrder {
            requested: new_order,
            max: count,
        });
    }
    let new_order = new_order as u32;

    let mut outcome = MoveOutcome {
        chapter_id: chapter_id.to_string(),
        project_id,
        from: old_order,
        to: new_order,
        shifted: 0,
    };

    if new_order == old_order {
        return Ok(outcome);
    }

    outcome.shifted = if new_order > old_order {
        // Moving down: the chapters it passes move up by one
        conn.execute(
            "UPDATE chapters SET position = position - 1
             WHERE project_id = ?1 AND position > ?2 AND position <= ?3",
            params![outcome.project_id, old_order, new_order],
        )?
    } else {
        // Moving up: the chapters it passes move down by one
        conn.execute(
            "UPDATE chapters SET position = position + 1
             WHERE project_id = ?1 AND position >= ?2 AND position < ?3",
            params![outcome.project_id, new_order, old_order],
        )?
    };

    conn.execute(
        "UPDATE chapters SET position = ?1 WHERE id = ?2",
        params![new_order, chapter_id],
    )?;

    debug!(
        "Shifted {} chapters in project {}",
        outcome.shifted, outcome.project_id
    );
    Ok(outcome)
}

/// Make room at `position` by moving every chapter at or after it down by one.
pub fn open_slot(conn: &Connection, project_id: &str, position: u32) -> Result<usize> {
    let shifted = conn.execute(
        "UPDATE chapters SET position = position + 1
         WHERE project_id = ?1 AND position >= ?2",
        params![project_id, position],
    )?;
    Ok(shifted)
}

/// Delete a chapter row and return `(project_id, position)` it held.
pub fn delete_returning_order(conn: &Connection, chapter_id: &str) -> Result<(String, u32)> {
    let removed: (String, u32) = conn
        .query_row(
            "DELETE FROM chapters WHERE id = ?1 RETURNING project_id, position",
            params![chapter_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?
        .ok_or_else(|| NovelError::NotFound("Chapter".to_string()))?;
    Ok(removed)
}

/// Decrement every position after `deleted_order`.
pub fn compact_after(conn: &Connection, project_id: &str, deleted_order: u32) -> Result<usize> {
    let shifted = conn.execute(
        "UPDATE chapters SET position = position - 1
         WHERE project_id = ?1 AND position > ?2",
        params![project_id, deleted_order],
    )?;
    Ok(shifted)
}

pub fn resequence(conn: &Connection, project_id: &str) -> Result<usize> {
    let entries = list_orders(conn, project_id)?;
    let mut stmt = conn.prepare("UPDATE chapters SET position = ?1 WHERE id = ?2")?;

    let mut changed = 0;
    for (index, entry) in entries.iter().enumerate() {
        let target = index as u32 + 1;
        if entry.order != target {
            stmt.execute(params![target, entry.id])?;
            changed += 1;
        }
    }
    Ok(changed)
}

/// Find missing and duplicated positions.
pub fn inspect(project_id: &str, entries: &[OrderEntry]) -> OrderReport {
    let count = entries.len() as u32;
    let mut seen: BTreeMap<u32, u32> = BTreeMap::new();
    for entry in entries {
        *seen.entry(entry.order).or_default() += 1;
    }

    OrderReport {
        project_id: project_id.to_string(),
        count,
        missing: (1..=count).filter(|p| !seen.contains_key(p)).collect(),
        duplicates: seen
            .iter()
            .filter(|(_, n)| **n > 1)
            .map(|(p, _)| *p)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use proptest::prelude::*;
    use std::sync::Arc;

    const PROJECT: &str = "p1";

    fn setup() -> (SharedDatabase, OrderMaintainer) {
        let db = Database::open_in_memory().expect("Failed to open database");
        db.initialize().expect("Failed to initialize");
        let db = Arc::new(db);
        db.connection()
            .unwrap()
            .execute(
                "INSERT INTO projects (id, owner_id, title, created_at, updated_at)
                 VALUES (?1, 'u1', 'Novel', '', '')",
                params![PROJECT],
            )
            .unwrap();
        (Arc::clone(&db), OrderMaintainer::new(db))
    }

    fn insert(db: &SharedDatabase, id: &str) -> u32 {
        db.write_transaction(|conn| {
            let position = next_position(conn, PROJECT)?;
            conn.execute(
                "INSERT INTO chapters (id, project_id, title, position, created_at, updated_at)
                 VALUES (?1, ?2, ?1, ?3, '', '')",
                params![id, PROJECT, position],
            )?;
            Ok(position)
        })
        .unwrap()
    }

    fn remove(db: &SharedDatabase, id: &str) {
        db.write_transaction(|conn| {
            let (project, order) = delete_returning_order(conn, id)?;
            compact_after(conn, &project, order)
        })
        .unwrap();
    }

    /// Chapter ids in position order
    fn sequence(maintainer: &OrderMaintainer) -> Vec<String> {
        maintainer
            .orders(PROJECT)
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect()
    }

    fn seed(db: &SharedDatabase, n: usize) {
        for i in 1..=n {
            insert(db, &format!("c{}", i));
        }
    }

    #[test]
    fn test_append_positions() {
        let (db, maintainer) = setup();
        assert_eq!(maintainer.append(PROJECT).unwrap(), 1);
        assert_eq!(insert(&db, "a"), 1);
        assert_eq!(insert(&db, "b"), 2);
        assert_eq!(maintainer.append(PROJECT).unwrap(), 3);
        assert_eq!(maintainer.append("other").unwrap(), 1);
    }

    #[test]
    fn test_move_down() {
        let (db, maintainer) = setup();
        seed(&db, 5);

        let outcome = maintainer.move_chapter("c2", 4).unwrap();
        assert_eq!(outcome.from, 2);
        assert_eq!(outcome.to, 4);
        assert_eq!(outcome.shifted, 2);
        assert_eq!(sequence(&maintainer), vec!["c1", "c3", "c4", "c2", "c5"]);
    }

    #[test]
    fn test_move_up() {
        let (db, maintainer) = setup();
        seed(&db, 5);

        let outcome = maintainer.move_chapter("c5", 1).unwrap();
        assert_eq!(outcome.shifted, 4);
        assert_eq!(sequence(&maintainer), vec!["c5", "c1", "c2", "c3", "c4"]);
        assert!(maintainer.check(PROJECT).unwrap().is_contiguous());
    }

    #[test]
    fn test_move_noop() {
        let (db, maintainer) = setup();
        seed(&db, 3);

        let before = maintainer.orders(PROJECT).unwrap();
        let outcome = maintainer.move_chapter("c2", 2).unwrap();
        assert!(outcome.is_noop());
        assert_eq!(outcome.shifted, 0);
        assert_eq!(maintainer.orders(PROJECT).unwrap(), before);
    }

    #[test]
    fn test_move_out_of_bounds() {
        let (db, maintainer) = setup();
        seed(&db, 3);
        let before = maintainer.orders(PROJECT).unwrap();

        for target in [0, 4, -1] {
            let err = maintainer.move_chapter("c1", target).unwrap_err();
            assert!(
                matches!(err, NovelError::InvalidOrder { requested, max: 3 } if requested == target)
            );
        }
        assert_eq!(maintainer.orders(PROJECT).unwrap(), before);
    }

    #[test]
    fn test_move_unknown_chapter() {
        let (_db, maintainer) = setup();
        let err = maintainer.move_chapter("missing", 1).unwrap_err();
        assert!(matches!(err, NovelError::NotFound(_)));
    }

    #[test]
    fn test_remove_and_compact() {
        let (db, maintainer) = setup();
        seed(&db, 4);

        db.connection()
            .unwrap()
            .execute("DELETE FROM chapters WHERE id = 'c2'", [])
            .unwrap();
        let shifted = maintainer.remove_and_compact(PROJECT, 2).unwrap();

        assert_eq!(shifted, 2);
        let orders: Vec<u32> = maintainer
            .orders(PROJECT)
            .unwrap()
            .into_iter()
            .map(|e| e.order)
            .collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(sequence(&maintainer), vec!["c1", "c3", "c4"]);
    }

    #[test]
    fn test_normalize_repairs_gaps_and_duplicates() {
        let (db, maintainer) = setup();
        seed(&db, 4);
        {
            let conn = db.connection().unwrap();
            conn.execute("UPDATE chapters SET position = 7 WHERE id = 'c4'", [])
                .unwrap();
            conn.execute("UPDATE chapters SET position = 1 WHERE id = 'c2'", [])
                .unwrap();
        }

        let report = maintainer.check(PROJECT).unwrap();
        assert!(!report.is_contiguous());
        assert_eq!(report.duplicates, vec![1]);
        assert_eq!(report.missing, vec![2, 4]);

        let outcome = maintainer.normalize(PROJECT).unwrap();
        assert_eq!(outcome.renumbered, 2);
        assert!(!outcome.was_contiguous());
        assert_eq!(outcome.before, report);
        assert!(maintainer.check(PROJECT).unwrap().is_contiguous());
        // c1 and c2 tie at position 1 and are ordered by creation, then id
        assert_eq!(sequence(&maintainer), vec!["c1", "c2", "c3", "c4"]);

        let again = maintainer.normalize(PROJECT).unwrap();
        assert_eq!(again.renumbered, 0);
        assert!(again.was_contiguous());
    }

    #[test]
    fn test_open_slot_then_insert() {
        let (db, maintainer) = setup();
        seed(&db, 3);

        db.write_transaction(|conn| {
            open_slot(conn, PROJECT, 2)?;
            conn.execute(
                "INSERT INTO chapters (id, project_id, title, position, created_at, updated_at)
                 VALUES ('new', ?1, 'new', 2, '', '')",
                params![PROJECT],
            )?;
            Ok(())
        })
        .unwrap();

        assert_eq!(sequence(&maintainer), vec!["c1", "new", "c2", "c3"]);
    }

    #[test]
    fn test_concurrent_moves_keep_order_dense() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_with_config(
            dir.path().join("order.db"),
            crate::storage::PoolConfig {
                max_size: 4,
                min_idle: 1,
                connection_timeout_secs: 30,
            },
        )
        .unwrap();
        db.initialize().unwrap();
        let db = Arc::new(db);
        db.connection()
            .unwrap()
            .execute(
                "INSERT INTO projects (id, owner_id, title, created_at, updated_at)
                 VALUES (?1, 'u1', 'Novel', '', '')",
                params![PROJECT],
            )
            .unwrap();
        seed(&db, 6);
        let maintainer = OrderMaintainer::new(Arc::clone(&db));

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let maintainer = maintainer.clone();
                std::thread::spawn(move || {
                    for step in 0..10 {
                        let chapter = format!("c{}", (worker + step) % 6 + 1);
                        let target = ((worker * 7 + step * 3) % 6 + 1) as i64;
                        maintainer.move_chapter(&chapter, target).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let report = maintainer.check(PROJECT).unwrap();
        assert_eq!(report.count, 6);
        assert!(report.is_contiguous(), "{:?}", report);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Append,
        Move(usize, i64),
        Remove(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Append),
            (0usize..16, -1i64..18).prop_map(|(i, p)| Op::Move(i, p)),
            (0usize..16).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_order_stays_dense(ops in prop::collection::vec(op_strategy(), 1..30)) {
            let (db, maintainer) = setup();
            let mut next_id = 0;

            for op in ops {
                let ids = sequence(&maintainer);
                match op {
                    Op::Append => {
                        next_id += 1;
                        insert(&db, &format!("x{}", next_id));
                    }
                    Op::Move(i, target) if !ids.is_empty() => {
                        let id = &ids[i % ids.len()];
                        let result = maintainer.move_chapter(id, target);
                        let valid = target >= 1 && target <= ids.len() as i64;
                        prop_assert_eq!(result.is_ok(), valid);
                        if valid {
                            // the moved chapter lands exactly on its target
                            let after = sequence(&maintainer);
                            prop_assert_eq!(&after[(target - 1) as usize], id);
                        } else {
                            prop_assert_eq!(sequence(&maintainer), ids.clone());
                        }
                    }
                    Op::Remove(i) if !ids.is_empty() => {
                        remove(&db, &ids[i % ids.len()]);
                    }
                    _ => {}
                }

                let report = maintainer.check(PROJECT).unwrap();
                prop_assert!(report.is_contiguous(), "{:?}", report);
            }
        }
    }
}
