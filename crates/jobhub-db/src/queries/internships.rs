use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use jobhub_types::api::{InternshipInput, InternshipQuery, Pagination};
use jobhub_types::models::{Internship, InternshipStatus};

use crate::Database;
use crate::models::{enum_col, now, opt_date_col, opt_u32_col, timestamp_col, u32_col, uuid_col};
use crate::queries::{Filter, fetch_page};

const INTERNSHIP_COLUMNS: &str = "id, hr_id, title, description, requirements, company_name, \
     location, duration_months, stipend, start_date, positions, status, created_at, updated_at";

impl Database {
    pub fn create_internship(&self, hr_id: Uuid, input: &InternshipInput) -> Result<Internship> {
        let id = Uuid::new_v4();
        let status = input.status.unwrap_or(InternshipStatus::Draft);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO internships (id, hr_id, title, description, requirements, company_name, location,
                                          duration_months, stipend, start_date, positions, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
                rusqlite::params![
                    id.to_string(),
                    hr_id.to_string(),
                    input.title.trim(),
                    input.description,
                    input.requirements,
                    input.company_name.trim(),
                    input.location,
                    input.duration_months,
                    input.stipend,
                    input.start_date.map(|d| d.to_string()),
                    input.positions,
                    status.as_str(),
                    now(),
                ],
            )?;
            query_internship(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("Internship vanished after insert: {}", id))
        })
    }

    pub fn get_internship(&self, id: Uuid) -> Result<Option<Internship>> {
        self.with_conn(|conn| query_internship(conn, id))
    }

    pub fn list_public_internships(
        &self,
        query: &InternshipQuery,
        page: Pagination,
    ) -> Result<(Vec<Internship>, i64)> {
        let mut filter = Filter::default();
        filter.eq("status", InternshipStatus::Active.as_str());
        filter.search(&["title", "description", "company_name"], query.search.as_deref());
        filter.search(&["location"], query.location.as_deref());
        self.with_conn(|conn| {
            fetch_page(conn, INTERNSHIP_COLUMNS, "internships", &filter, "created_at DESC, rowid DESC", page, map_internship)
        })
    }

    pub fn list_internships_by_hr(&self, hr_id: Uuid, page: Pagination) -> Result<(Vec<Internship>, i64)> {
        let mut filter = Filter::default();
        filter.eq("hr_id", hr_id.to_string());
        self.with_conn(|conn| {
            fetch_page(conn, INTERNSHIP_COLUMNS, "internships", &filter, "created_at DESC, rowid DESC", page, map_internship)
        })
    }

    pub fn update_internship(&self, id: Uuid, input: &InternshipInput) -> Result<Option<Internship>> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE internships
                 SET title = ?1, description = ?2, requirements = ?3, company_name = ?4, location = ?5,
                     duration_months = ?6, stipend = ?7, start_date = ?8, positions = ?9, updated_at = ?10
                 WHERE id = ?11",
                rusqlite::params![
                    input.title.trim(),
                    input.description,
                    input.requirements,
                    input.company_name.trim(),
                    input.location,
                    input.duration_months,
                    input.stipend,
                    input.start_date.map(|d| d.to_string()),
                    input.positions,
                    now(),
                    id.to_string(),
                ],
            )?;
            query_internship(conn, id)
        })
    }

    pub fn set_internship_status(&self, id: Uuid, status: InternshipStatus) -> Result<Option<Internship>> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE internships SET status = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![status.as_str(), now(), id.to_string()],
            )?;
            query_internship(conn, id)
        })
    }

    pub fn delete_internship(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM internships WHERE id = ?1", [id.to_string()])?;
            Ok(deleted > 0)
        })
    }
}

pub(crate) fn query_internship(conn: &Connection, id: Uuid) -> Result<Option<Internship>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM internships WHERE id = ?1", INTERNSHIP_COLUMNS),
            [id.to_string()],
            map_internship,
        )
        .optional()?;
    Ok(row)
}

fn map_internship(row: &Row<'_>) -> rusqlite::Result<Internship> {
    Ok(Internship {
        id: uuid_col(row, 0)?,
        hr_id: uuid_col(row, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        requirements: row.get(4)?,
        company_name: row.get(5)?,
        location: row.get(6)?,
        duration_months: opt_u32_col(row, 7)?,
        stipend: row.get(8)?,
        start_date: opt_date_col(row, 9)?,
        positions: u32_col(row, 10)?,
        status: enum_col(row, 11)?,
        created_at: timestamp_col(row, 12)?,
        updated_at: timestamp_col(row, 13)?,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::internship_input;
    use super::*;
    use crate::queries::test_support::user;
    use jobhub_types::models::Role;

    #[test]
    fn public_listing_only_shows_active() {
        let db = Database::open_in_memory().unwrap();
        let hr = user(&db, "hr@example.com", Role::Hr);

        let active = db
            .create_internship(hr.id, &internship_input("Data intern", Some(InternshipStatus::Active)))
            .unwrap();
        let draft = db.create_internship(hr.id, &internship_input("Ops intern", None)).unwrap();
        assert_eq!(draft.status, InternshipStatus::Draft);

        let (items, total) = db
            .list_public_internships(&InternshipQuery::default(), Pagination::default())
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].id, active.id);

        let (mine, _) = db.list_internships_by_hr(hr.id, Pagination::default()).unwrap();
        assert_eq!(mine.len(), 2);
    }

    #[test]
    fn update_and_status_change() {
        let db = Database::open_in_memory().unwrap();
        let hr = user(&db, "hr@example.com", Role::Hr);
        let internship = db.create_internship(hr.id, &internship_input("Intern", None)).unwrap();

        let mut edit = internship_input("Platform intern", None);
        edit.positions = 5;
        let updated = db.update_internship(internship.id, &edit).unwrap().unwrap();
        assert_eq!(updated.title, "Platform intern");
        assert_eq!(updated.positions, 5);

        let completed = db
            .set_internship_status(internship.id, InternshipStatus::Completed)
            .unwrap()
            .unwrap();
        assert_eq!(completed.status, InternshipStatus::Completed);

        assert!(db.delete_internship(internship.id).unwrap());
        assert!(db.get_internship(internship.id).unwrap().is_none());
    }
}
