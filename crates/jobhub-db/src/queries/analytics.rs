use anyhow::Result;
use rusqlite::Connection;
use rusqlite::types::ToSql;
use uuid::Uuid;

use jobhub_types::api::{AnalyticsOverview, CountsByKey, HrAnalytics};

use crate::Database;
use crate::queries::grouped_counts;

impl Database {
    pub fn analytics_overview(&self) -> Result<AnalyticsOverview> {
        self.with_conn(|conn| {
            let users_by_role = counts(conn, "SELECT role, COUNT(*) FROM users GROUP BY role", &[])?;
            let active_users: i64 =
                conn.query_row("SELECT COUNT(*) FROM users WHERE is_active = 1", [], |r| r.get(0))?;

            Ok(AnalyticsOverview {
                total_users: users_by_role.values().sum(),
                active_users,
                users_by_role,
                jobs_by_status: counts(conn, "SELECT status, COUNT(*) FROM jobs GROUP BY status", &[])?,
                jobs_by_moderation_status: counts(
                    conn,
                    "SELECT moderation_status, COUNT(*) FROM jobs GROUP BY moderation_status",
                    &[],
                )?,
                internships_by_status: counts(
                    conn,
                    "SELECT status, COUNT(*) FROM internships GROUP BY status",
                    &[],
                )?,
                applications_by_status: counts(
                    conn,
                    "SELECT status, COUNT(*) FROM applications GROUP BY status",
                    &[],
                )?,
                internship_requests_by_status: counts(
                    conn,
                    "SELECT status, COUNT(*) FROM internship_requests GROUP BY status",
                    &[],
                )?,
            })
        })
    }

    /// Figures over one HR user's own postings.
    pub fn hr_analytics(&self, hr_id: Uuid) -> Result<HrAnalytics> {
        let hr = hr_id.to_string();
        self.with_conn(|conn| {
            let jobs_by_status = counts(
                conn,
                "SELECT status, COUNT(*) FROM jobs WHERE hr_id = ?1 GROUP BY status",
                &[&hr as &dyn ToSql],
            )?;
            let internships_total: i64 = conn.query_row(
                "SELECT COUNT(*) FROM internships WHERE hr_id = ?1",
                [&hr],
                |r| r.get(0),
            )?;
            let total_job_views: i64 = conn.query_row(
                "SELECT COALESCE(SUM(views_count), 0) FROM jobs WHERE hr_id = ?1",
                [&hr],
                |r| r.get(0),
            )?;
            let applications_by_status = counts(
                conn,
                "SELECT a.status, COUNT(*)
                 FROM applications a
                 LEFT JOIN jobs j ON j.id = a.job_id
                 LEFT JOIN internships i ON i.id = a.internship_id
                 WHERE j.hr_id = ?1 OR i.hr_id = ?1
                 GROUP BY a.status",
                &[&hr as &dyn ToSql],
            )?;

            Ok(HrAnalytics {
                jobs_total: jobs_by_status.values().sum(),
                jobs_by_status,
                internships_total,
                applications_total: applications_by_status.values().sum(),
                applications_by_status,
                total_job_views,
            })
        })
    }
}

fn counts(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Result<CountsByKey> {
    Ok(grouped_counts(conn, sql, params)?.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::jobs::fixtures::job_input;
    use crate::queries::test_support::user;
    use jobhub_types::api::ApplyRequest;
    use jobhub_types::models::{ApplicationStatus, JobStatus, Role};

    #[test]
    fn overview_groups_by_role_and_status() {
        let db = Database::open_in_memory().unwrap();
        let hr = user(&db, "hr@example.com", Role::Hr);
        let cand = user(&db, "cand@example.com", Role::Candidate);
        let other = user(&db, "other@example.com", Role::Candidate);
        db.set_user_active(other.id, false).unwrap();
        let job = db.create_job(hr.id, &job_input("Engineer")).unwrap();
        db.create_job_application(cand.id, job.id, &ApplyRequest::default()).unwrap();

        let overview = db.analytics_overview().unwrap();
        assert_eq!(overview.total_users, 3);
        assert_eq!(overview.active_users, 2);
        assert_eq!(overview.users_by_role.get("CANDIDATE"), Some(&2));
        assert_eq!(overview.jobs_by_status.get("DRAFT"), Some(&1));
        assert_eq!(overview.jobs_by_moderation_status.get("PENDING"), Some(&1));
        assert_eq!(overview.applications_by_status.get("PENDING"), Some(&1));
        assert!(overview.internship_requests_by_status.is_empty());
    }

    #[test]
    fn hr_figures_cover_only_own_postings() {
        let db = Database::open_in_memory().unwrap();
        let hr = user(&db, "hr@example.com", Role::Hr);
        let rival = user(&db, "rival@example.com", Role::Hr);
        let cand = user(&db, "cand@example.com", Role::Candidate);

        let job = db.create_job(hr.id, &job_input("Engineer")).unwrap();
        db.set_job_status(job.id, JobStatus::Active).unwrap();
        db.increment_job_views(job.id).unwrap();
        let rival_job = db.create_job(rival.id, &job_input("Analyst")).unwrap();
        let app = db.create_job_application(cand.id, job.id, &ApplyRequest::default()).unwrap();
        db.set_application_status(app.id, ApplicationStatus::Accepted, None).unwrap();
        db.create_job_application(cand.id, rival_job.id, &ApplyRequest::default()).unwrap();

        let stats = db.hr_analytics(hr.id).unwrap();
        assert_eq!(stats.jobs_total, 1);
        assert_eq!(stats.jobs_by_status.get("ACTIVE"), Some(&1));
        assert_eq!(stats.applications_total, 1);
        assert_eq!(stats.applications_by_status.get("ACCEPTED"), Some(&1));
        assert_eq!(stats.total_job_views, 1);
        assert_eq!(stats.internships_total, 0);
    }
}
