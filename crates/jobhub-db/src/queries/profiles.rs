use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use jobhub_types::api::{CandidateProfileInput, HrProfileInput, UniversityProfileInput};
use jobhub_types::models::{CandidateProfile, HrProfile, Profile, Role, UniversityProfile};

use crate::Database;
use crate::models::{opt_u32_col, uuid_col};

/// Inserts an empty profile row for roles that carry one. Idempotent.
pub(crate) fn ensure_profile(conn: &Connection, user_id: Uuid, role: Role) -> Result<()> {
    let table = match role {
        Role::Candidate => "candidate_profiles",
        Role::Hr => "hr_profiles",
        Role::University => "university_profiles",
        Role::Admin | Role::Moderator => return Ok(()),
    };
    conn.execute(
        &format!("INSERT OR IGNORE INTO {} (user_id) VALUES (?1)", table),
        [user_id.to_string()],
    )?;
    Ok(())
}

impl Database {
    /// Profile for the user's current role. Staff roles have none.
    pub fn get_profile(&self, user_id: Uuid, role: Role) -> Result<Option<Profile>> {
        self.with_conn(|conn| query_profile(conn, user_id, role))
    }

    pub fn update_candidate_profile(
        &self,
        user_id: Uuid,
        input: &CandidateProfileInput,
    ) -> Result<Option<Profile>> {
        self.with_conn(|conn| {
            ensure_profile(conn, user_id, Role::Candidate)?;
            conn.execute(
                "UPDATE candidate_profiles
                 SET headline = ?1, bio = ?2, location = ?3, phone = ?4, resume_url = ?5, experience_years = ?6
                 WHERE user_id = ?7",
                rusqlite::params![
                    input.headline,
                    input.bio,
                    input.location,
                    input.phone,
                    input.resume_url,
                    input.experience_years,
                    user_id.to_string(),
                ],
            )?;
            query_profile(conn, user_id, Role::Candidate)
        })
    }

    pub fn update_hr_profile(&self, user_id: Uuid, input: &HrProfileInput) -> Result<Option<Profile>> {
        self.with_conn(|conn| {
            ensure_profile(conn, user_id, Role::Hr)?;
            conn.execute(
                "UPDATE hr_profiles
                 SET company_name = ?1, company_website = ?2, company_description = ?3, position = ?4, phone = ?5
                 WHERE user_id = ?6",
                rusqlite::params![
                    input.company_name,
                    input.company_website,
                    input.company_description,
                    input.position,
                    input.phone,
                    user_id.to_string(),
                ],
            )?;
            query_profile(conn, user_id, Role::Hr)
        })
    }

    pub fn update_university_profile(
        &self,
        user_id: Uuid,
        input: &UniversityProfileInput,
    ) -> Result<Option<Profile>> {
        self.with_conn(|conn| {
            ensure_profile(conn, user_id, Role::University)?;
            conn.execute(
                "UPDATE university_profiles
                 SET university_name = ?1, address = ?2, website = ?3, contact_phone = ?4
                 WHERE user_id = ?5",
                rusqlite::params![
                    input.university_name,
                    input.address,
                    input.website,
                    input.contact_phone,
                    user_id.to_string(),
                ],
            )?;
            query_profile(conn, user_id, Role::University)
        })
    }

    /// Replaces the candidate's skill set. Returns false if any id is unknown.
    pub fn set_candidate_skills(&self, user_id: Uuid, skill_ids: &[Uuid]) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for skill_id in skill_ids {
                let exists: Option<i64> = tx
                    .query_row("SELECT 1 FROM skills WHERE id = ?1", [skill_id.to_string()], |r| r.get(0))
                    .optional()?;
                if exists.is_none() {
                    return Ok(false);
                }
            }
            tx.execute("DELETE FROM user_skills WHERE user_id = ?1", [user_id.to_string()])?;
            for skill_id in skill_ids {
                tx.execute(
                    "INSERT OR IGNORE INTO user_skills (user_id, skill_id) VALUES (?1, ?2)",
                    [user_id.to_string(), skill_id.to_string()],
                )?;
            }
            tx.commit()?;
            Ok(true)
        })
    }
}

fn query_profile(conn: &Connection, user_id: Uuid, role: Role) -> Result<Option<Profile>> {
    let uid = user_id.to_string();
    let profile = match role {
        Role::Candidate => {
            let profile = conn
                .query_row(
                    "SELECT user_id, headline, bio, location, phone, resume_url, experience_years
                     FROM candidate_profiles WHERE user_id = ?1",
                    [&uid],
                    |row| {
                        Ok(CandidateProfile {
                            user_id: uuid_col(row, 0)?,
                            headline: row.get(1)?,
                            bio: row.get(2)?,
                            location: row.get(3)?,
                            phone: row.get(4)?,
                            resume_url: row.get(5)?,
                            experience_years: opt_u32_col(row, 6)?,
                            skills: Vec::new(),
                        })
                    },
                )
                .optional()?;
            match profile {
                Some(mut p) => {
                    p.skills = super::skills::query_user_skills(conn, user_id)?;
                    Some(Profile::Candidate(p))
                }
                None => None,
            }
        }
        Role::Hr => conn
            .query_row(
                "SELECT user_id, company_name, company_website, company_description, position, phone
                 FROM hr_profiles WHERE user_id = ?1",
                [&uid],
                |row| {
                    Ok(Profile::Hr(HrProfile {
                        user_id: uuid_col(row, 0)?,
                        company_name: row.get(1)?,
                        company_website: row.get(2)?,
                        company_description: row.get(3)?,
                        position: row.get(4)?,
                        phone: row.get(5)?,
                    }))
                },
            )
            .optional()?,
        Role::University => conn
            .query_row(
                "SELECT user_id, university_name, address, website, contact_phone
                 FROM university_profiles WHERE user_id = ?1",
                [&uid],
                |row| {
                    Ok(Profile::University(UniversityProfile {
                        user_id: uuid_col(row, 0)?,
                        university_name: row.get(1)?,
                        address: row.get(2)?,
                        website: row.get(3)?,
                        contact_phone: row.get(4)?,
                    }))
                },
            )
            .optional()?,
        Role::Admin | Role::Moderator => None,
    };
    Ok(profile)
}
