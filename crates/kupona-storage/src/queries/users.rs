// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User directory operations.

use kupona_core::KuponaError;
use rusqlite::params;

use crate::database::Database;
use crate::models::UserIdentity;

/// Insert a new profile or overwrite all fields of an existing one.
///
/// Write-through log of who interacted; no read contract beyond this.
pub async fn upsert_user(db: &Database, user: &UserIdentity) -> Result<(), KuponaError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (user_id, first_name, username, number)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                     first_name = excluded.first_name,
                     username = excluded.username,
                     number = excluded.number",
                params![user.user_id, user.display_name, user.handle, user.phone],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a stored profile. Exercised by tests and the operator tooling only.
pub async fn get_user(db: &Database, user_id: i64) -> Result<Option<UserIdentity>, KuponaError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, first_name, username, number FROM users WHERE user_id = ?1",
            )?;
            let result = stmt.query_row(params![user_id], |row| {
                Ok(UserIdentity {
                    user_id: row.get(0)?,
                    display_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    handle: row.get(2)?,
                    phone: row.get(3)?,
                })
            });
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
