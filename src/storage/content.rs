//! Portfolio content collections: projects, experiences, skills,
//! achievements and goals.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{from_unix, to_unix, Storage, StorageError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub repo_url: Option<String>,
    pub live_url: Option<String>,
    /// Public path of an uploaded image, e.g. `/uploads/1700000000000-ab12.png`.
    pub image: Option<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceRow {
    pub id: String,
    pub company: String,
    pub role: String,
    pub description: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRow {
    pub id: String,
    pub name: String,
    pub category: String,
    /// 1..=100
    pub proficiency: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub target_date: Option<NaiveDate>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const PROJECT_COLUMNS: &str =
    "id, title, description, tech_stack, repo_url, live_url, image, featured, created_at, updated_at";
const EXPERIENCE_COLUMNS: &str =
    "id, company, role, description, location, start_date, end_date, current, created_at, updated_at";
const SKILL_COLUMNS: &str = "id, name, category, proficiency, created_at, updated_at";
const ACHIEVEMENT_COLUMNS: &str = "id, title, description, date, link, created_at, updated_at";
const GOAL_COLUMNS: &str =
    "id, title, description, target_date, completed, created_at, updated_at";

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<(ProjectRow, String)> {
    Ok((
        ProjectRow {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            tech_stack: Vec::new(),
            repo_url: row.get(4)?,
            live_url: row.get(5)?,
            image: row.get(6)?,
            featured: row.get::<_, i32>(7)? != 0,
            created_at: from_unix(row.get(8)?),
            updated_at: from_unix(row.get(9)?),
        },
        row.get(3)?,
    ))
}

/// The tech stack column holds a JSON array; decode it outside the rusqlite
/// row closure so a bad value surfaces as `StorageError::Serde`.
fn decode_project((mut project, tech_stack): (ProjectRow, String)) -> Result<ProjectRow, StorageError> {
    project.tech_stack = serde_json::from_str(&tech_stack)?;
    Ok(project)
}

fn experience_from_row(row: &Row<'_>) -> rusqlite::Result<ExperienceRow> {
    Ok(ExperienceRow {
        id: row.get(0)?,
        company: row.get(1)?,
        role: row.get(2)?,
        description: row.get(3)?,
        location: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        current: row.get::<_, i32>(7)? != 0,
        created_at: from_unix(row.get(8)?),
        updated_at: from_unix(row.get(9)?),
    })
}

fn skill_from_row(row: &Row<'_>) -> rusqlite::Result<SkillRow> {
    Ok(SkillRow {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        proficiency: row.get(3)?,
        created_at: from_unix(row.get(4)?),
        updated_at: from_unix(row.get(5)?),
    })
}

fn achievement_from_row(row: &Row<'_>) -> rusqlite::Result<AchievementRow> {
    Ok(AchievementRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        date: row.get(3)?,
        link: row.get(4)?,
        created_at: from_unix(row.get(5)?),
        updated_at: from_unix(row.get(6)?),
    })
}

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<GoalRow> {
    Ok(GoalRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        target_date: row.get(3)?,
        completed: row.get::<_, i32>(4)? != 0,
        created_at: from_unix(row.get(5)?),
        updated_at: from_unix(row.get(6)?),
    })
}

impl Storage {
    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn insert_project(&self, row: &ProjectRow) -> Result<(), StorageError> {
        self.conn.execute(
            &format!("INSERT INTO projects ({PROJECT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"),
            params![
                row.id,
                row.title,
                row.description,
                serde_json::to_string(&row.tech_stack)?,
                row.repo_url,
                row.live_url,
                row.image,
                row.featured as i32,
                to_unix(&row.created_at),
                to_unix(&row.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_project(&self, id: &str) -> Result<Option<ProjectRow>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"))?;
        stmt.query_row(params![id], project_from_row)
            .optional()?
            .map(decode_project)
            .transpose()
    }

    /// Featured projects first, then newest first.
    pub fn list_projects(&self) -> Result<Vec<ProjectRow>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY featured DESC, created_at DESC, id"
        ))?;
        let rows = stmt.query_map([], project_from_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(decode_project(row?)?);
        }
        Ok(result)
    }

    /// Overwrite the mutable fields of a project. `created_at` is left alone.
    pub fn update_project(&self, row: &ProjectRow) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "UPDATE projects SET title = ?1, description = ?2, tech_stack = ?3, repo_url = ?4,
                    live_url = ?5, image = ?6, featured = ?7, updated_at = ?8
             WHERE id = ?9",
            params![
                row.title,
                row.description,
                serde_json::to_string(&row.tech_stack)?,
                row.repo_url,
                row.live_url,
                row.image,
                row.featured as i32,
                to_unix(&row.updated_at),
                row.id,
            ],
        )?;
        Ok(affected > 0)
    }

    pub fn delete_project(&self, id: &str) -> Result<bool, StorageError> {
        let affected = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    pub fn count_projects(&self, since: Option<DateTime<Utc>>) -> Result<u64, StorageError> {
        self.count_rows("projects", since)
    }

    // -----------------------------------------------------------------------
    // Experiences
    // -----------------------------------------------------------------------

    pub fn insert_experience(&self, row: &ExperienceRow) -> Result<(), StorageError> {
        self.conn.execute(
            &format!("INSERT INTO experiences ({EXPERIENCE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"),
            params![
                row.id,
                row.company,
                row.role,
                row.description,
                row.location,
                row.start_date,
                row.end_date,
                row.current as i32,
                to_unix(&row.created_at),
                to_unix(&row.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_experience(&self, id: &str) -> Result<Option<ExperienceRow>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {EXPERIENCE_COLUMNS} FROM experiences WHERE id = ?1"))?;
        Ok(stmt.query_row(params![id], experience_from_row).optional()?)
    }

    /// Current positions first, then by most recent start date.
    pub fn list_experiences(&self) -> Result<Vec<ExperienceRow>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EXPERIENCE_COLUMNS} FROM experiences
             ORDER BY current DESC, start_date DESC, created_at DESC"
        ))?;
        let rows = stmt.query_map([], experience_from_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn update_experience(&self, row: &ExperienceRow) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "UPDATE experiences SET company = ?1, role = ?2, description = ?3, location = ?4,
                    start_date = ?5, end_date = ?6, current = ?7, updated_at = ?8
             WHERE id = ?9",
            params![
                row.company,
                row.role,
                row.description,
                row.location,
                row.start_date,
                row.end_date,
                row.current as i32,
                to_unix(&row.updated_at),
                row.id,
            ],
        )?;
        Ok(affected > 0)
    }

    pub fn delete_experience(&self, id: &str) -> Result<bool, StorageError> {
        let affected = self
            .conn
            .execute("DELETE FROM experiences WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    pub fn count_experiences(&self) -> Result<u64, StorageError> {
        self.count_rows("experiences", None)
    }

    // -----------------------------------------------------------------------
    // Skills
    // -----------------------------------------------------------------------

    pub fn insert_skill(&self, row: &SkillRow) -> Result<(), StorageError> {
        self.conn.execute(
            &format!("INSERT INTO skills ({SKILL_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                row.id,
                row.name,
                row.category,
                row.proficiency,
                to_unix(&row.created_at),
                to_unix(&row.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_skill(&self, id: &str) -> Result<Option<SkillRow>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {SKILL_COLUMNS} FROM skills WHERE id = ?1"))?;
        Ok(stmt.query_row(params![id], skill_from_row).optional()?)
    }

    /// Grouped by category, strongest first within a category.
    pub fn list_skills(&self) -> Result<Vec<SkillRow>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SKILL_COLUMNS} FROM skills ORDER BY category, proficiency DESC, name"
        ))?;
        let rows = stmt.query_map([], skill_from_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn update_skill(&self, row: &SkillRow) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "UPDATE skills SET name = ?1, category = ?2, proficiency = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                row.name,
                row.category,
                row.proficiency,
                to_unix(&row.updated_at),
                row.id,
            ],
        )?;
        Ok(affected > 0)
    }

    pub fn delete_skill(&self, id: &str) -> Result<bool, StorageError> {
        let affected = self
            .conn
            .execute("DELETE FROM skills WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    pub fn count_skills(&self) -> Result<u64, StorageError> {
        self.count_rows("skills", None)
    }

    // -----------------------------------------------------------------------
    // Achievements
    // -----------------------------------------------------------------------

    pub fn insert_achievement(&self, row: &AchievementRow) -> Result<(), StorageError> {
        self.conn.execute(
            &format!("INSERT INTO achievements ({ACHIEVEMENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                row.id,
                row.title,
                row.description,
                row.date,
                row.link,
                to_unix(&row.created_at),
                to_unix(&row.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_achievement(&self, id: &str) -> Result<Option<AchievementRow>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE id = ?1"))?;
        Ok(stmt.query_row(params![id], achievement_from_row).optional()?)
    }

    /// Dated achievements first (newest first), undated ones last.
    pub fn list_achievements(&self) -> Result<Vec<AchievementRow>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements
             ORDER BY date IS NULL, date DESC, created_at DESC"
        ))?;
        let rows = stmt.query_map([], achievement_from_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn update_achievement(&self, row: &AchievementRow) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "UPDATE achievements SET title = ?1, description = ?2, date = ?3, link = ?4,
                    updated_at = ?5
             WHERE id = ?6",
            params![
                row.title,
                row.description,
                row.date,
                row.link,
                to_unix(&row.updated_at),
                row.id,
            ],
        )?;
        Ok(affected > 0)
    }

    pub fn delete_achievement(&self, id: &str) -> Result<bool, StorageError> {
        let affected = self
            .conn
            .execute("DELETE FROM achievements WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    // -----------------------------------------------------------------------
    // Goals
    // -----------------------------------------------------------------------

    pub fn insert_goal(&self, row: &GoalRow) -> Result<(), StorageError> {
        self.conn.execute(
            &format!("INSERT INTO goals ({GOAL_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                row.id,
                row.title,
                row.description,
                row.target_date,
                row.completed as i32,
                to_unix(&row.created_at),
                to_unix(&row.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_goal(&self, id: &str) -> Result<Option<GoalRow>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1"))?;
        Ok(stmt.query_row(params![id], goal_from_row).optional()?)
    }

    /// Open goals first, ordered by nearest target date.
    pub fn list_goals(&self) -> Result<Vec<GoalRow>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals
             ORDER BY completed, target_date IS NULL, target_date, created_at DESC"
        ))?;
        let rows = stmt.query_map([], goal_from_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn update_goal(&self, row: &GoalRow) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "UPDATE goals SET title = ?1, description = ?2, target_date = ?3, completed = ?4,
                    updated_at = ?5
             WHERE id = ?6",
            params![
                row.title,
                row.description,
                row.target_date,
                row.completed as i32,
                to_unix(&row.updated_at),
                row.id,
            ],
        )?;
        Ok(affected > 0)
    }

    pub fn delete_goal(&self, id: &str) -> Result<bool, StorageError> {
        let affected = self
            .conn
            .execute("DELETE FROM goals WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
