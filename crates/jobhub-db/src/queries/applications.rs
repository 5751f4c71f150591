use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use jobhub_types::api::{ApplyRequest, Pagination};
use jobhub_types::models::{Application, ApplicationStatus};

use crate::Database;
use crate::models::{enum_col, now, opt_uuid_col, timestamp_col, uuid_col};
use crate::queries::{Filter, fetch_page};

const APPLICATION_COLUMNS: &str = "a.id, a.candidate_id, u.first_name || ' ' || u.last_name, u.email, \
     a.job_id, a.internship_id, COALESCE(j.title, i.title, ''), a.cover_letter, a.resume_url, \
     a.status, a.notes, a.created_at, a.updated_at";

const APPLICATION_FROM: &str = "applications a
     JOIN users u ON u.id = a.candidate_id
     LEFT JOIN jobs j ON j.id = a.job_id
     LEFT JOIN internships i ON i.id = a.internship_id";

/// Which set of applications to list.
#[derive(Debug, Clone, Copy)]
pub enum ApplicationFilter {
    Candidate(Uuid),
    Job(Uuid),
    Internship(Uuid),
}

impl Database {
    pub fn create_job_application(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        req: &ApplyRequest,
    ) -> Result<Application> {
        self.insert_application(candidate_id, Some(job_id), None, req)
    }

    pub fn create_internship_application(
        &self,
        candidate_id: Uuid,
        internship_id: Uuid,
        req: &ApplyRequest,
    ) -> Result<Application> {
        self.insert_application(candidate_id, None, Some(internship_id), req)
    }

    fn insert_application(
        &self,
        candidate_id: Uuid,
        job_id: Option<Uuid>,
        internship_id: Option<Uuid>,
        req: &ApplyRequest,
    ) -> Result<Application> {
        let id = Uuid::new_v4();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO applications (id, candidate_id, job_id, internship_id, cover_letter, resume_url,
                                           status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                rusqlite::params![
                    id.to_string(),
                    candidate_id.to_string(),
                    job_id.map(|j| j.to_string()),
                    internship_id.map(|i| i.to_string()),
                    req.cover_letter,
                    req.resume_url,
                    ApplicationStatus::Pending.as_str(),
                    now(),
                ],
            )?;
            query_application(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("Application vanished after insert: {}", id))
        })
    }

    pub fn get_application(&self, id: Uuid) -> Result<Option<Application>> {
        self.with_conn(|conn| query_application(conn, id))
    }

    pub fn list_applications(
        &self,
        target: ApplicationFilter,
        status: Option<ApplicationStatus>,
        page: Pagination,
    ) -> Result<(Vec<Application>, i64)> {
        let mut filter = Filter::default();
        match target {
            ApplicationFilter::Candidate(id) => filter.eq("a.candidate_id", id.to_string()),
            ApplicationFilter::Job(id) => filter.eq("a.job_id", id.to_string()),
            ApplicationFilter::Internship(id) => filter.eq("a.internship_id", id.to_string()),
        };
        filter.eq_opt("a.status", status.map(|s| s.as_str()));

        self.with_conn(|conn| {
            fetch_page(
                conn,
                APPLICATION_COLUMNS,
                APPLICATION_FROM,
                &filter,
                "a.created_at DESC, a.rowid DESC",
                page,
                map_application,
            )
        })
    }

    /// Sets any status value. `notes` replaces the stored notes only when given.
    pub fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        notes: Option<&str>,
    ) -> Result<Option<Application>> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE applications SET status = ?1, notes = COALESCE(?2, notes), updated_at = ?3 WHERE id = ?4",
                rusqlite::params![status.as_str(), notes, now(), id.to_string()],
            )?;
            query_application(conn, id)
        })
    }

    /// HR owner of the job or internship the application targets.
    pub fn application_posting_owner(&self, id: Uuid) -> Result<Option<Uuid>> {
        self.with_conn(|conn| {
            let owner = conn
                .query_row(
                    "SELECT COALESCE(j.hr_id, i.hr_id)
                     FROM applications a
                     LEFT JOIN jobs j ON j.id = a.job_id
                     LEFT JOIN internships i ON i.id = a.internship_id
                     WHERE a.id = ?1",
                    [id.to_string()],
                    |row| opt_uuid_col(row, 0),
                )
                .optional()?;
            Ok(owner.flatten())
        })
    }
}

fn query_application(conn: &Connection, id: Uuid) -> Result<Option<Application>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM {} WHERE a.id = ?1", APPLICATION_COLUMNS, APPLICATION_FROM),
            [id.to_string()],
            map_application,
        )
        .optional()?;
    Ok(row)
}

fn map_application(row: &Row<'_>) -> rusqlite::Result<Application> {
    Ok(Application {
        id: uuid_col(row, 0)?,
        candidate_id: uuid_col(row, 1)?,
        candidate_name: row.get(2)?,
        candidate_email: row.get(3)?,
        job_id: opt_uuid_col(row, 4)?,
        internship_id: opt_uuid_col(row, 5)?,
        posting_title: row.get(6)?,
        cover_letter: row.get(7)?,
        resume_url: row.get(8)?,
        status: enum_col(row, 9)?,
        notes: row.get(10)?,
        created_at: timestamp_col(row, 11)?,
        updated_at: timestamp_col(row, 12)?,
    })
}
