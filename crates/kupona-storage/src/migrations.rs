// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery, plus the one-time rebuild
//! of the historical availability-flag schema.
//!
//! SQL migration files are compiled into the binary at build time via
//! `embed_migrations!`. Migrations run automatically on database open.

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
///
/// Refinery tracks applied migrations in its own `refinery_schema_history` table.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), refinery::Error> {
    embedded::migrations::runner().run(conn)?;
    Ok(())
}

/// Rebuild a legacy `codes` table that used a binary `availability` flag.
///
/// Historical databases stored availability as 1/0 instead of a quantity
/// count. A true-equivalent flag becomes `quantity = 1`, false-equivalent
/// becomes `quantity = 0`. No-op when the table is absent or already on the
/// quantity schema. Runs before refinery so V1's `IF NOT EXISTS` then
/// passes over the rebuilt table.
pub fn migrate_legacy_availability(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    let has_legacy_column: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info('codes') WHERE name = 'availability'",
        [],
        |row| row.get(0),
    )?;
    if has_legacy_column == 0 {
        return Ok(());
    }

    conn.execute_batch(
        "BEGIN;
         ALTER TABLE codes RENAME TO codes_legacy;
         CREATE TABLE codes (
             code        TEXT PRIMARY KEY,
             description TEXT NOT NULL DEFAULT '',
             quantity    INTEGER NOT NULL DEFAULT 1
         );
         INSERT INTO codes (code, description, quantity)
         SELECT code,
                COALESCE(description, ''),
                CASE WHEN availability IS NOT NULL AND availability != 0 THEN 1 ELSE 0 END
         FROM codes_legacy;
         DROP TABLE codes_legacy;
         COMMIT;",
    )?;
    tracing::info!("rebuilt legacy availability-flag codes table to quantity schema");
    Ok(())
}
