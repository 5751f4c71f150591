use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password    TEXT NOT NULL,
                first_name  TEXT NOT NULL,
                last_name   TEXT NOT NULL,
                role        TEXT NOT NULL,
                is_active   INTEGER NOT NULL DEFAULT 1,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_users_role ON users(role);

            CREATE TABLE candidate_profiles (
                user_id          TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                headline         TEXT,
                bio              TEXT,
                location         TEXT,
                phone            TEXT,
                resume_url       TEXT,
                experience_years INTEGER
            );

            CREATE TABLE hr_profiles (
                user_id             TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                company_name        TEXT,
                company_website     TEXT,
                company_description TEXT,
                position            TEXT,
                phone               TEXT
            );

            CREATE TABLE university_profiles (
                user_id         TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                university_name TEXT,
                address         TEXT,
                website         TEXT,
                contact_phone   TEXT
            );

            CREATE TABLE skills (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL UNIQUE COLLATE NOCASE,
                category    TEXT
            );

            CREATE TABLE user_skills (
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                skill_id    TEXT NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
                PRIMARY KEY (user_id, skill_id)
            );

            CREATE TABLE jobs (
                id                   TEXT PRIMARY KEY,
                hr_id                TEXT NOT NULL REFERENCES users(id),
                title                TEXT NOT NULL,
                description          TEXT NOT NULL,
                requirements         TEXT,
                company_name         TEXT NOT NULL,
                location             TEXT,
                job_type             TEXT NOT NULL,
                experience_level     TEXT NOT NULL,
                salary_min           INTEGER,
                salary_max           INTEGER,
                remote               INTEGER NOT NULL DEFAULT 0,
                status               TEXT NOT NULL,
                moderation_status    TEXT NOT NULL,
                moderation_note      TEXT,
                moderated_by         TEXT REFERENCES users(id),
                views_count          INTEGER NOT NULL DEFAULT 0,
                application_deadline TEXT,
                created_at           TEXT NOT NULL,
                updated_at           TEXT NOT NULL
            );

            CREATE INDEX idx_jobs_hr ON jobs(hr_id);
            CREATE INDEX idx_jobs_visibility ON jobs(status, moderation_status, created_at);

            CREATE TABLE job_skills (
                job_id      TEXT NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
                skill_id    TEXT NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
                PRIMARY KEY (job_id, skill_id)
            );

            CREATE TABLE internships (
                id              TEXT PRIMARY KEY,
                hr_id           TEXT NOT NULL REFERENCES users(id),
                title           TEXT NOT NULL,
                description     TEXT NOT NULL,
                requirements    TEXT,
                company_name    TEXT NOT NULL,
                location        TEXT,
                duration_months INTEGER,
                stipend         INTEGER,
                start_date      TEXT,
                positions       INTEGER NOT NULL DEFAULT 1,
                status          TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE INDEX idx_internships_hr ON internships(hr_id);
            CREATE INDEX idx_internships_status ON internships(status, created_at);

            CREATE TABLE applications (
                id              TEXT PRIMARY KEY,
                candidate_id    TEXT NOT NULL REFERENCES users(id),
                job_id          TEXT REFERENCES jobs(id) ON DELETE CASCADE,
                internship_id   TEXT REFERENCES internships(id) ON DELETE CASCADE,
                cover_letter    TEXT,
                resume_url      TEXT,
                status          TEXT NOT NULL,
                notes           TEXT,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL,
                CHECK ((job_id IS NULL) <> (internship_id IS NULL)),
                UNIQUE (candidate_id, job_id),
                UNIQUE (candidate_id, internship_id)
            );

            CREATE INDEX idx_applications_job ON applications(job_id);
            CREATE INDEX idx_applications_internship ON applications(internship_id);

            CREATE TABLE internship_requests (
                id              TEXT PRIMARY KEY,
                university_id   TEXT NOT NULL REFERENCES users(id),
                title           TEXT NOT NULL,
                description     TEXT NOT NULL,
                field_of_study  TEXT NOT NULL,
                student_count   INTEGER NOT NULL,
                start_date      TEXT NOT NULL,
                end_date        TEXT NOT NULL,
                requirements    TEXT,
                status          TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE INDEX idx_internship_requests_university ON internship_requests(university_id);

            CREATE TABLE company_responses (
                id                TEXT PRIMARY KEY,
                request_id        TEXT NOT NULL REFERENCES internship_requests(id) ON DELETE CASCADE,
                hr_id             TEXT NOT NULL REFERENCES users(id),
                message           TEXT NOT NULL,
                offered_positions INTEGER NOT NULL DEFAULT 1,
                status            TEXT NOT NULL,
                created_at        TEXT NOT NULL,
                updated_at        TEXT NOT NULL,
                UNIQUE (request_id, hr_id)
            );

            CREATE TABLE notifications (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                kind        TEXT NOT NULL,
                title       TEXT NOT NULL,
                message     TEXT NOT NULL,
                related_id  TEXT,
                is_read     INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_notifications_user ON notifications(user_id, is_read, created_at);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
