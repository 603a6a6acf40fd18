// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Code ledger operations.
//!
//! All mutations go through the single background writer thread, so the
//! conditional decrement cannot lose updates under concurrent redemptions.

use kupona_core::KuponaError;
use rusqlite::params;

use crate::database::Database;
use crate::models::CodeRecord;

/// Look up a code. Pure read; returns `None` if the code was never created.
pub async fn lookup(db: &Database, code: &str) -> Result<Option<CodeRecord>, KuponaError> {
    let code = code.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT code, description, quantity FROM codes WHERE code = ?1")?;
            let result = stmt.query_row(params![code], |row| {
                Ok(CodeRecord {
                    code: row.get(0)?,
                    description: row.get(1)?,
                    quantity: row.get(2)?,
                })
            });
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a new code record.
///
/// Fails with [`KuponaError::DuplicateCode`] if the code already exists; the
/// existing record is never mutated. Quantity validation (> 0) is the
/// caller's responsibility.
pub async fn create(
    db: &Database,
    code: &str,
    description: &str,
    quantity: i64,
) -> Result<(), KuponaError> {
    let code_owned = code.to_string();
    let description = description.to_string();
    let inserted = db
        .connection()
        .call(move |conn| {
            // INSERT OR IGNORE + changed-row count distinguishes a duplicate
            // from a fault without a read-then-write race.
            let changed = conn.execute(
                "INSERT OR IGNORE INTO codes (code, description, quantity) VALUES (?1, ?2, ?3)",
                params![code_owned, description, quantity],
            )?;
            Ok(changed)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if inserted == 0 {
        return Err(KuponaError::DuplicateCode {
            code: code.to_string(),
        });
    }
    Ok(())
}

/// Atomically decrement the quantity if it is strictly positive.
///
/// A single conditional UPDATE: no-op (returns `false`) when the code is
/// missing or exhausted, so the quantity can never go negative.
pub async fn decrement_if_available(db: &Database, code: &str) -> Result<bool, KuponaError> {
    let code = code.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE codes SET quantity = quantity - 1 WHERE code = ?1 AND quantity > 0",
                params![code],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Operator reset path: overwrite the remaining quantity of a code.
pub async fn set_quantity(db: &Database, code: &str, quantity: i64) -> Result<(), KuponaError> {
    let code = code.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE codes SET quantity = ?2 WHERE code = ?1",
                params![code, quantity],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
