use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use jobhub_types::api::Pagination;
use jobhub_types::models::{Notification, NotificationKind};

use crate::Database;
use crate::models::{enum_col, now, opt_uuid_col, timestamp_col, uuid_col};
use crate::queries::{Filter, fetch_page};

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, kind, title, message, related_id, is_read, created_at";

impl Database {
    pub fn create_notification(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        title: &str,
        message: &str,
        related_id: Option<Uuid>,
    ) -> Result<Notification> {
        let id = Uuid::new_v4();
        self.with_conn(|conn| {
            insert_notification(conn, id, user_id, kind, title, message, related_id)?;
            conn.query_row(
                &format!("SELECT {} FROM notifications WHERE id = ?1", NOTIFICATION_COLUMNS),
                [id.to_string()],
                map_notification,
            )
            .map_err(Into::into)
        })
    }

    /// One notification per recipient, written in a single transaction.
    pub fn broadcast_notification(
        &self,
        recipients: &[Uuid],
        title: &str,
        message: &str,
    ) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for user_id in recipients {
                insert_notification(&tx, Uuid::new_v4(), *user_id, NotificationKind::System, title, message, None)?;
            }
            tx.commit()?;
            Ok(recipients.len())
        })
    }

    pub fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: Pagination,
    ) -> Result<(Vec<Notification>, i64)> {
        let mut filter = Filter::default();
        filter.eq("user_id", user_id.to_string());
        if unread_only {
            filter.eq("is_read", false);
        }
        self.with_conn(|conn| {
            fetch_page(
                conn,
                NOTIFICATION_COLUMNS,
                "notifications",
                &filter,
                "created_at DESC, rowid DESC",
                page,
                map_notification,
            )
        })
    }

    pub fn unread_notification_count(&self, user_id: Uuid) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_read = 0",
                [user_id.to_string()],
                |r| r.get(0),
            )?;
            Ok(count)
        })
    }

    /// Marks one of the user's notifications read. `None` if it is not theirs.
    pub fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notification>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND user_id = ?2",
                [id.to_string(), user_id.to_string()],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let row = conn
                .query_row(
                    &format!("SELECT {} FROM notifications WHERE id = ?1", NOTIFICATION_COLUMNS),
                    [id.to_string()],
                    map_notification,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE user_id = ?1 AND is_read = 0",
                [user_id.to_string()],
            )?;
            Ok(changed)
        })
    }
}

fn insert_notification(
    conn: &Connection,
    id: Uuid,
    user_id: Uuid,
    kind: NotificationKind,
    title: &str,
    message: &str,
    related_id: Option<Uuid>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO notifications (id, user_id, kind, title, message, related_id, is_read, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
        rusqlite::params![
            id.to_string(),
            user_id.to_string(),
            kind.as_str(),
            title,
            message,
            related_id.map(|r| r.to_string()),
            now(),
        ],
    )?;
    Ok(())
}

fn map_notification(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        kind: enum_col(row, 2)?,
        title: row.get(3)?,
        message: row.get(4)?,
        related_id: opt_uuid_col(row, 5)?,
        is_read: row.get(6)?,
        created_at: timestamp_col(row, 7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::user;
    use jobhub_types::models::Role;

    #[test]
    fn read_state_is_per_owner() {
        let db = Database::open_in_memory().unwrap();
        let alice = user(&db, "alice@example.com", Role::Candidate);
        let bob = user(&db, "bob@example.com", Role::Candidate);

        let n = db
            .create_notification(alice.id, NotificationKind::System, "Hi", "Welcome", None)
            .unwrap();
        db.create_notification(alice.id, NotificationKind::System, "Again", "Still here", None)
            .unwrap();
        assert_eq!(db.unread_notification_count(alice.id).unwrap(), 2);

        assert!(db.mark_notification_read(n.id, bob.id).unwrap().is_none());
        let read = db.mark_notification_read(n.id, alice.id).unwrap().unwrap();
        assert!(read.is_read);
        assert_eq!(db.unread_notification_count(alice.id).unwrap(), 1);

        let (unread, total) = db.list_notifications(alice.id, true, Pagination::default()).unwrap();
        assert_eq!(total, 1);
        assert_eq!(unread[0].title, "Again");

        assert_eq!(db.mark_all_notifications_read(alice.id).unwrap(), 1);
        assert_eq!(db.unread_notification_count(alice.id).unwrap(), 0);
    }

    #[test]
    fn broadcast_reaches_every_recipient() {
        let db = Database::open_in_memory().unwrap();
        let a = user(&db, "a@example.com", Role::Candidate);
        let b = user(&db, "b@example.com", Role::Hr);

        let delivered = db.broadcast_notification(&[a.id, b.id], "Maintenance", "Tonight").unwrap();
        assert_eq!(delivered, 2);

        let (items, _) = db.list_notifications(b.id, false, Pagination::default()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, NotificationKind::System);
    }
}
