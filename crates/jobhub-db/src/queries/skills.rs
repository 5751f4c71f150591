use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use jobhub_types::models::Skill;

use crate::Database;
use crate::models::uuid_col;

impl Database {
    pub fn create_skill(&self, name: &str, category: Option<&str>) -> Result<Skill> {
        let skill = Skill {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            category: category.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
        };
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO skills (id, name, category) VALUES (?1, ?2, ?3)",
                rusqlite::params![skill.id.to_string(), skill.name, skill.category],
            )?;
            Ok(())
        })?;
        Ok(skill)
    }

    pub fn list_skills(&self, category: Option<&str>) -> Result<Vec<Skill>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, category FROM skills
                 WHERE ?1 IS NULL OR category = ?1 COLLATE NOCASE
                 ORDER BY name COLLATE NOCASE",
            )?;
            let rows = stmt
                .query_map([category], map_skill)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns false when no such skill exists.
    pub fn delete_skill(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM skills WHERE id = ?1", [id.to_string()])?;
            Ok(deleted > 0)
        })
    }
}

/// Looks a skill up by name (case-insensitive), creating it if missing.
pub(crate) fn skill_id_for_name(conn: &Connection, name: &str) -> Result<Uuid> {
    let name = name.trim();
    let existing = conn
        .query_row("SELECT id FROM skills WHERE name = ?1", [name], |row| uuid_col(row, 0))
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO skills (id, name) VALUES (?1, ?2)",
        [id.to_string(), name.to_string()],
    )?;
    Ok(id)
}

pub(crate) fn query_user_skills(conn: &Connection, user_id: Uuid) -> Result<Vec<Skill>> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.name, s.category
         FROM user_skills us
         JOIN skills s ON s.id = us.skill_id
         WHERE us.user_id = ?1
         ORDER BY s.name COLLATE NOCASE",
    )?;
    let rows = stmt
        .query_map([user_id.to_string()], map_skill)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn query_job_skill_names(conn: &Connection, job_id: Uuid) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT s.name
         FROM job_skills js
         JOIN skills s ON s.id = js.skill_id
         WHERE js.job_id = ?1
         ORDER BY s.name COLLATE NOCASE",
    )?;
    let rows = stmt
        .query_map([job_id.to_string()], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(rows)
}

fn map_skill(row: &Row<'_>) -> rusqlite::Result<Skill> {
    Ok(Skill {
        id: uuid_col(row, 0)?,
        name: row.get(1)?,
        category: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_filters_by_category() {
        let db = Database::open_in_memory().unwrap();
        db.create_skill("Rust", Some("Programming")).unwrap();
        db.create_skill("Go", Some("programming")).unwrap();
        db.create_skill("Negotiation", Some("Soft")).unwrap();

        let all = db.list_skills(None).unwrap();
        assert_eq!(
            all.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["Go", "Negotiation", "Rust"]
        );
        assert_eq!(db.list_skills(Some("Programming")).unwrap().len(), 2);
    }

    #[test]
    fn name_lookup_reuses_existing_skill() {
        let db = Database::open_in_memory().unwrap();
        let rust = db.create_skill("Rust", None).unwrap();

        let (same, fresh) = db
            .with_conn(|conn| Ok((skill_id_for_name(conn, " rust ")?, skill_id_for_name(conn, "Kotlin")?)))
            .unwrap();
        assert_eq!(same, rust.id);
        assert_ne!(fresh, rust.id);
        assert_eq!(db.list_skills(None).unwrap().len(), 2);
    }

    #[test]
    fn delete_reports_missing() {
        let db = Database::open_in_memory().unwrap();
        let skill = db.create_skill("Rust", None).unwrap();
        assert!(db.delete_skill(skill.id).unwrap());
        assert!(!db.delete_skill(skill.id).unwrap());
    }
}
