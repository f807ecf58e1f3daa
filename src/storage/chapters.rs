//! Project and chapter persistence
//!
//! Every read or write first checks that the caller owns the project. Missing
//! rows fail with `NotFound`, rows owned by someone else with `Forbidden`.
//! Positions are maintained through the connection-level functions of
//! [`super::ordering`] so that insert and delete compose with the shift in one
//! transaction.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};
use uuid::Uuid;

use super::database::SharedDatabase;
use super::ordering::{self, MoveOutcome, NormalizeOutcome, OrderMaintainer};
use crate::types::{
    Chapter, ChapterContent, ChapterSummary, ChapterUpdate, NewChapter, NovelError, Project,
    Result, count_words,
};

const CHAPTER_COLUMNS: &str =
    "id, project_id, title, content, position, word_count, created_at, updated_at";

#[derive(Clone)]
pub struct ChapterStore {
    db: SharedDatabase,
    order: OrderMaintainer,
}

impl ChapterStore {
    pub fn new(db: SharedDatabase) -> Self {
        let order = OrderMaintainer::new(db.clone());
        Self { db, order }
    }

    pub fn order_maintainer(&self) -> &OrderMaintainer {
        &self.order
    }

    // =========================================================================
    // Projects
    // =========================================================================

    pub fn create_project(
        &self,
        owner_id: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Project> {
        let title = require_title(title)?;
        let now = Utc::now().to_rfc3339();
        let project = Project {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            title,
            description: description.map(str::to_string),
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO projects (id, owner_id, title, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                project.id,
                project.owner_id,
                project.title,
                project.description,
                project.created_at,
                project.updated_at
            ],
        )?;

        info!("Created project {} ({})", project.title, project.id);
        Ok(project)
    }

    pub fn list_projects(&self, owner_id: &str) -> Result<Vec<Project>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, title, description, created_at, updated_at
             FROM projects WHERE owner_id = ?1
             ORDER BY created_at DESC, id",
        )?;

        let projects = stmt
            .query_map(params![owner_id], row_to_project)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    pub fn find_project(&self, project_id: &str, caller_id: &str) -> Result<Project> {
        let conn = self.db.connection()?;
        owned_project(&conn, project_id, caller_id)
    }

    // =========================================================================
    // Chapters
    // =========================================================================

    /// Create a chapter, appending it unless an explicit order is given.
    ///
    /// An explicit order must lie in `1..=N+1`; chapters at or after it move
    /// down by one.
    pub fn create_chapter(
        &self,
        caller_id: &str,
        project_id: &str,
        new: NewChapter,
    ) -> Result<Chapter> {
        let title = require_title(&new.title)?;

        let chapter = self.db.write_transaction(|conn| {
            owned_project(conn, project_id, caller_id)?;

            let position = match new.order {
                None => ordering::next_position(conn, project_id)?,
                Some(requested) => {
                    let count = ordering::chapter_count(conn, project_id)?;
                    if requested < 1 || requested > count + 1 {
                        return Err(NovelError::InvalidOrder {
                            requested: i64::from(requested),
                            max: count + 1,
                        });
                    }
                    ordering::open_slot(conn, project_id, requested)?;
                    requested
                }
            };

            let now = Utc::now().to_rfc3339();
            let chapter = Chapter {
                id: Uuid::new_v4().to_string(),
                project_id: project_id.to_string(),
                title,
                word_count: count_words(&new.content),
                content: new.content,
                order: position,
                created_at: now.clone(),
                updated_at: now,
            };

            conn.execute(
                "INSERT INTO chapters (id, project_id, title, content, position, word_count, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    chapter.id,
                    chapter.project_id,
                    chapter.title,
                    chapter.content,
                    chapter.order,
                    chapter.word_count,
                    chapter.created_at,
                    chapter.updated_at
                ],
            )?;
            touch_project(conn, project_id)?;
            Ok(chapter)
        })?;

        info!(
            "Created chapter {} at position {} in project {}",
            chapter.id, chapter.order, project_id
        );
        Ok(chapter)
    }

    /// Chapters of a project in ascending order, without content.
    pub fn list_chapters(&self, caller_id: &str, project_id: &str) -> Result<Vec<ChapterSummary>> {
        let conn = self.db.connection()?;
        owned_project(&conn, project_id, caller_id)?;

        let mut stmt = conn.prepare(
            "SELECT id, title, position, word_count, updated_at
             FROM chapters WHERE project_id = ?1
             ORDER BY position, created_at, id",
        )?;
        let chapters = stmt
            .query_map(params![project_id], |row| {
                Ok(ChapterSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    order: row.get(2)?,
                    word_count: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(chapters)
    }

    pub fn find_chapter(&self, chapter_id: &str, caller_id: &str) -> Result<Chapter> {
        let conn = self.db.connection()?;
        owned_chapter(&conn, chapter_id, caller_id)
    }

    pub fn get_chapter_content(&self, chapter_id: &str, caller_id: &str) -> Result<ChapterContent> {
        self.find_chapter(chapter_id, caller_id)
            .map(ChapterContent::from)
    }

    /// Apply a partial update; the word count follows the new content.
    pub fn update_chapter(
        &self,
        chapter_id: &str,
        caller_id: &str,
        update: ChapterUpdate,
    ) -> Result<Chapter> {
        if update.is_empty() {
            return Err(NovelError::Validation(
                "nothing to update: provide a title or content".to_string(),
            ));
        }
        let title = update.title.as_deref().map(require_title).transpose()?;

        self.db.write_transaction(|conn| {
            let mut chapter = owned_chapter(conn, chapter_id, caller_id)?;
            if let Some(title) = title {
                chapter.title = title;
            }
            if let Some(content) = update.content {
                chapter.word_count = count_words(&content);
                chapter.content = content;
            }
            chapter.updated_at = Utc::now().to_rfc3339();

            conn.execute(
                "UPDATE chapters SET title = ?1, content = ?2, word_count = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    chapter.title,
                    chapter.content,
                    chapter.word_count,
                    chapter.updated_at,
                    chapter.id
                ],
            )?;
            touch_project(conn, &chapter.project_id)?;
            debug!("Updated chapter {}", chapter.id);
            Ok(chapter)
        })
    }

    /// Delete a chapter and close the gap it leaves.
    pub fn delete_chapter(&self, chapter_id: &str, caller_id: &str) -> Result<()> {
        let (project_id, order) = self.db.write_transaction(|conn| {
            owned_chapter(conn, chapter_id, caller_id)?;
            let (project_id, order) = ordering::delete_returning_order(conn, chapter_id)?;
            ordering::compact_after(conn, &project_id, order)?;
            touch_project(conn, &project_id)?;
            Ok((project_id, order))
        })?;

        info!(
            "Deleted chapter {} (position {}) from project {}",
            chapter_id, order, project_id
        );
        Ok(())
    }

    /// Move a chapter to `new_order` after checking ownership.
    pub fn reorder_chapter(
        &self,
        chapter_id: &str,
        caller_id: &str,
        new_order: i64,
    ) -> Result<MoveOutcome> {
        let outcome = self.db.write_transaction(|conn| {
            owned_chapter(conn, chapter_id, caller_id)?;
            ordering::move_within(conn, chapter_id, new_order)
        })?;

        if !outcome.is_noop() {
            info!(
                "Moved chapter {} from {} to {}",
                chapter_id, outcome.from, outcome.to
            );
        }
        Ok(outcome)
    }

    /// Re-sequence a project's chapters, reporting what was repaired.
    pub fn normalize_project(&self, project_id: &str, caller_id: &str) -> Result<NormalizeOutcome> {
        self.find_project(project_id, caller_id)?;
        self.order.normalize(project_id)
    }
}

// =============================================================================
// Row helpers
// =============================================================================

fn require_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(NovelError::Validation("title must not be empty".to_string()));
    }
    Ok(title.to_string())
}

fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn row_to_chapter(row: &Row) -> rusqlite::Result<Chapter> {
    Ok(Chapter {
        id: row.get(0)?,
        project_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        order: row.get(4)?,
        word_count: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn owned_project(conn: &Connection, project_id: &str, caller_id: &str) -> Result<Project> {
    let project = conn
        .query_row(
            "SELECT id, owner_id, title, description, created_at, updated_at
             FROM projects WHERE id = ?1",
            params![project_id],
            row_to_project,
        )
        .optional()?
        .ok_or_else(|| NovelError::NotFound("Project".to_string()))?;

    if project.owner_id != caller_id {
        return Err(NovelError::Forbidden(format!(
            "project {} belongs to another user",
            project_id
        )));
    }
    Ok(project)
}

fn owned_chapter(conn: &Connection, chapter_id: &str, caller_id: &str) -> Result<Chapter> {
    let chapter = conn
        .query_row(
            &format!("SELECT {} FROM chapters WHERE id = ?1", CHAPTER_COLUMNS),
            params![chapter_id],
            row_to_chapter,
        )
        .optional()?
        .ok_or_else(|| NovelError::NotFound("Chapter".to_string()))?;

    owned_project(conn, &chapter.project_id, caller_id).map_err(|e| match e {
        NovelError::Forbidden(_) => {
            NovelError::Forbidden(format!("chapter {} belongs to another user", chapter_id))
        }
        other => other,
    })?;
    Ok(chapter)
}

fn touch_project(conn: &Connection, project_id: &str) -> Result<()> {
    conn.execute(
        "UPDATE projects SET updated_at = ?1 WHERE id = ?2",
        params![Utc::now().to_rfc3339(), project_id],
    )?;
    Ok(())
}
