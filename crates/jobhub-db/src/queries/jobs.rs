use std::collections::HashMap;

use anyhow::Result;
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use jobhub_types::api::{JobInput, JobQuery, MyJobsQuery, Pagination};
use jobhub_types::models::{Job, JobStatus, ModerationStatus};

use crate::Database;
use crate::models::{enum_col, now, opt_date_col, opt_uuid_col, timestamp_col, uuid_col};
use crate::queries::{Filter, fetch_page};

const JOB_COLUMNS: &str = "id, hr_id, title, description, requirements, company_name, location, \
     job_type, experience_level, salary_min, salary_max, remote, status, moderation_status, \
     moderation_note, moderated_by, views_count, application_deadline, created_at, updated_at";

const NEWEST_FIRST: &str = "created_at DESC, rowid DESC";

impl Database {
    /// New jobs always start in moderation PENDING.
    pub fn create_job(&self, hr_id: Uuid, input: &JobInput) -> Result<Job> {
        let id = Uuid::new_v4();
        let ts = now();
        let status = input.status.unwrap_or(JobStatus::Draft);
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO jobs (id, hr_id, title, description, requirements, company_name, location,
                                   job_type, experience_level, salary_min, salary_max, remote, status,
                                   moderation_status, application_deadline, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)",
                rusqlite::params![
                    id.to_string(),
                    hr_id.to_string(),
                    input.title.trim(),
                    input.description,
                    input.requirements,
                    input.company_name.trim(),
                    input.location,
                    input.job_type.as_str(),
                    input.experience_level.as_str(),
                    input.salary_min,
                    input.salary_max,
                    input.remote,
                    status.as_str(),
                    ModerationStatus::Pending.as_str(),
                    input.application_deadline.map(|d| d.to_string()),
                    ts,
                ],
            )?;
            replace_job_skills(&tx, id, &input.skills)?;
            let job = query_job(&tx, id)?
                .ok_or_else(|| anyhow::anyhow!("Job vanished after insert: {}", id))?;
            tx.commit()?;
            Ok(job)
        })
    }

    pub fn get_job(&self, id: Uuid) -> Result<Option<Job>> {
        self.with_conn(|conn| query_job(conn, id))
    }

    /// Active, approved jobs matching the public search filters.
    pub fn list_public_jobs(&self, query: &JobQuery, page: Pagination) -> Result<(Vec<Job>, i64)> {
        let mut filter = Filter::default();
        filter
            .eq("status", JobStatus::Active.as_str())
            .eq("moderation_status", ModerationStatus::Approved.as_str())
            .eq_opt("job_type", query.job_type.map(|t| t.as_str()))
            .eq_opt("experience_level", query.experience_level.map(|l| l.as_str()))
            .eq_opt("remote", query.remote)
            .eq_opt("hr_id", query.hr_id.map(|id| id.to_string()));
        filter.search(&["title", "description", "company_name"], query.search.as_deref());
        filter.search(&["location"], query.location.as_deref());
        if let Some(min) = query.salary_min {
            filter.clause(
                "COALESCE(salary_max, salary_min) >= ?",
                vec![Box::new(min) as Box<dyn ToSql>],
            );
        }
        if let Some(skill) = query.skill.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            filter.clause(
                "id IN (SELECT js.job_id FROM job_skills js JOIN skills s ON s.id = js.skill_id
                        WHERE s.name = ? COLLATE NOCASE)",
                vec![Box::new(skill.to_string()) as Box<dyn ToSql>],
            );
        }
        self.list_jobs(&filter, page)
    }

    pub fn list_jobs_by_hr(
        &self,
        hr_id: Uuid,
        query: &MyJobsQuery,
        page: Pagination,
    ) -> Result<(Vec<Job>, i64)> {
        let mut filter = Filter::default();
        filter
            .eq("hr_id", hr_id.to_string())
            .eq_opt("status", query.status.map(|s| s.as_str()))
            .eq_opt("moderation_status", query.moderation_status.map(|s| s.as_str()));
        self.list_jobs(&filter, page)
    }

    pub fn list_jobs_by_moderation(
        &self,
        status: ModerationStatus,
        page: Pagination,
    ) -> Result<(Vec<Job>, i64)> {
        let mut filter = Filter::default();
        filter.eq("moderation_status", status.as_str());
        self.list_jobs(&filter, page)
    }

    fn list_jobs(&self, filter: &Filter, page: Pagination) -> Result<(Vec<Job>, i64)> {
        self.with_conn(|conn| {
            let (mut jobs, total) =
                fetch_page(conn, JOB_COLUMNS, "jobs", filter, NEWEST_FIRST, page, map_job)?;
            attach_skills(conn, &mut jobs)?;
            Ok((jobs, total))
        })
    }

    /// Content edits send the job back through moderation.
    pub fn update_job(&self, id: Uuid, input: &JobInput) -> Result<Option<Job>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE jobs
                 SET title = ?1, description = ?2, requirements = ?3, company_name = ?4, location = ?5,
                     job_type = ?6, experience_level = ?7, salary_min = ?8, salary_max = ?9, remote = ?10,
                     application_deadline = ?11, moderation_status = ?12, moderation_note = NULL,
                     moderated_by = NULL, updated_at = ?13
                 WHERE id = ?14",
                rusqlite::params![
                    input.title.trim(),
                    input.description,
                    input.requirements,
                    input.company_name.trim(),
                    input.location,
                    input.job_type.as_str(),
                    input.experience_level.as_str(),
                    input.salary_min,
                    input.salary_max,
                    input.remote,
                    input.application_deadline.map(|d| d.to_string()),
                    ModerationStatus::Pending.as_str(),
                    now(),
                    id.to_string(),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            replace_job_skills(&tx, id, &input.skills)?;
            let job = query_job(&tx, id)?;
            tx.commit()?;
            Ok(job)
        })
    }

    pub fn set_job_status(&self, id: Uuid, status: JobStatus) -> Result<Option<Job>> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE jobs SET status = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![status.as_str(), now(), id.to_string()],
            )?;
            query_job(conn, id)
        })
    }

    pub fn moderate_job(
        &self,
        id: Uuid,
        status: ModerationStatus,
        note: Option<&str>,
        moderator_id: Uuid,
    ) -> Result<Option<Job>> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE jobs
                 SET moderation_status = ?1, moderation_note = ?2, moderated_by = ?3, updated_at = ?4
                 WHERE id = ?5",
                rusqlite::params![
                    status.as_str(),
                    note,
                    moderator_id.to_string(),
                    now(),
                    id.to_string()
                ],
            )?;
            query_job(conn, id)
        })
    }

    pub fn delete_job(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM jobs WHERE id = ?1", [id.to_string()])?;
            Ok(deleted > 0)
        })
    }

    pub fn increment_job_views(&self, id: Uuid) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE jobs SET views_count = views_count + 1 WHERE id = ?1",
                [id.to_string()],
            )?;
            Ok(())
        })
    }
}

fn replace_job_skills(conn: &Connection, job_id: Uuid, names: &[String]) -> Result<()> {
    conn.execute("DELETE FROM job_skills WHERE job_id = ?1", [job_id.to_string()])?;
    for name in names.iter().filter(|n| !n.trim().is_empty()) {
        let skill_id = super::skills::skill_id_for_name(conn, name)?;
        conn.execute(
            "INSERT OR IGNORE INTO job_skills (job_id, skill_id) VALUES (?1, ?2)",
            [job_id.to_string(), skill_id.to_string()],
        )?;
    }
    Ok(())
}

pub(crate) fn query_job(conn: &Connection, id: Uuid) -> Result<Option<Job>> {
    let job = conn
        .query_row(
            &format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS),
            [id.to_string()],
            map_job,
        )
        .optional()?;
    match job {
        Some(mut job) => {
            job.skills = super::skills::query_job_skill_names(conn, id)?;
            Ok(Some(job))
        }
        None => Ok(None),
    }
}

/// Batch-fetch skill names for a page of jobs.
fn attach_skills(conn: &Connection, jobs: &mut [Job]) -> Result<()> {
    if jobs.is_empty() {
        return Ok(());
    }

    let ids: Vec<String> = jobs.iter().map(|j| j.id.to_string()).collect();
    let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "SELECT js.job_id, s.name FROM job_skills js
         JOIN skills s ON s.id = js.skill_id
         WHERE js.job_id IN ({})
         ORDER BY s.name COLLATE NOCASE",
        placeholders.join(", ")
    );

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn ToSql> = ids.iter().map(|id| id as &dyn ToSql).collect();
    let rows = stmt
        .query_map(params.as_slice(), |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut by_job: HashMap<String, Vec<String>> = HashMap::new();
    for (job_id, name) in rows {
        by_job.entry(job_id).or_default().push(name);
    }
    for job in jobs.iter_mut() {
        job.skills = by_job.remove(&job.id.to_string()).unwrap_or_default();
    }
    Ok(())
}

fn map_job(row: &Row<'_>) -> rusqlite::Result<Job> {
    Ok(Job {
        id: uuid_col(row, 0)?,
        hr_id: uuid_col(row, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        requirements: row.get(4)?,
        company_name: row.get(5)?,
        location: row.get(6)?,
        job_type: enum_col(row, 7)?,
        experience_level: enum_col(row, 8)?,
        salary_min: row.get(9)?,
        salary_max: row.get(10)?,
        remote: row.get(11)?,
        status: enum_col(row, 12)?,
        moderation_status: enum_col(row, 13)?,
        moderation_note: row.get(14)?,
        moderated_by: opt_uuid_col(row, 15)?,
        views_count: row.get(16)?,
        application_deadline: opt_date_col(row, 17)?,
        skills: Vec::new(),
        created_at: timestamp_col(row, 18)?,
        updated_at: timestamp_col(row, 19)?,
    })
}
