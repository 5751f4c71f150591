use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use jobhub_types::api::{Pagination, UserQuery};
use jobhub_types::models::{Role, User};

use crate::models::{enum_col, now, timestamp_col, uuid_col};
use crate::queries::{Filter, fetch_page};
use crate::{Database, NewUser, UserCredentials};

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, role, is_active, created_at, updated_at";

impl Database {
    /// Inserts the user and an empty profile for its role.
    pub fn create_user(&self, new: &NewUser<'_>) -> Result<User> {
        let id = Uuid::new_v4();
        let ts = now();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO users (id, email, password, first_name, last_name, role, is_active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)",
                rusqlite::params![
                    id.to_string(),
                    new.email.trim(),
                    new.password_hash,
                    new.first_name.trim(),
                    new.last_name.trim(),
                    new.role.as_str(),
                    ts,
                ],
            )?;
            super::profiles::ensure_profile(&tx, id, new.role)?;
            let user = query_user(&tx, id)?
                .ok_or_else(|| anyhow::anyhow!("User vanished after insert: {}", id))?;
            tx.commit()?;
            Ok(user)
        })
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, id))
    }

    pub fn get_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {}, password FROM users WHERE email = ?1", USER_COLUMNS),
                    [email.trim()],
                    |row| {
                        Ok(UserCredentials {
                            user: map_user(row)?,
                            password_hash: row.get(8)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn email_exists(&self, email: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT 1 FROM users WHERE email = ?1", [email.trim()], |r| r.get(0))
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn list_users(&self, query: &UserQuery, page: Pagination) -> Result<(Vec<User>, i64)> {
        let mut filter = Filter::default();
        filter
            .eq_opt("role", query.role.map(|r| r.as_str()))
            .eq_opt("is_active", query.is_active);
        filter.search(&["email", "first_name", "last_name"], query.search.as_deref());

        self.with_conn(|conn| {
            fetch_page(conn, USER_COLUMNS, "users", &filter, "created_at DESC, rowid DESC", page, map_user)
        })
    }

    /// Ids of active users, optionally restricted to one role.
    pub fn active_user_ids(&self, role: Option<Role>) -> Result<Vec<Uuid>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id FROM users WHERE is_active = 1 AND (?1 IS NULL OR role = ?1)",
            )?;
            let ids = stmt
                .query_map([role.map(|r| r.as_str())], |row| uuid_col(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
    }

    /// Returns the updated user, or `None` if it does not exist.
    pub fn set_user_active(&self, id: Uuid, is_active: bool) -> Result<Option<User>> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![is_active, now(), id.to_string()],
            )?;
            query_user(conn, id)
        })
    }

    /// Changes the role and makes sure the matching profile exists.
    pub fn set_user_role(&self, id: Uuid, role: Role) -> Result<Option<User>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE users SET role = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![role.as_str(), now(), id.to_string()],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            super::profiles::ensure_profile(&tx, id, role)?;
            let user = query_user(&tx, id)?;
            tx.commit()?;
            Ok(user)
        })
    }
}

pub(crate) fn query_user(conn: &Connection, id: Uuid) -> Result<Option<User>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
            [id.to_string()],
            map_user,
        )
        .optional()?;
    Ok(row)
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_col(row, 0)?,
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        role: enum_col(row, 4)?,
        is_active: row.get(5)?,
        created_at: timestamp_col(row, 6)?,
        updated_at: timestamp_col(row, 7)?,
    })
}
