//! SQL schema for the OpenKlant SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS partijen (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid                    TEXT NOT NULL UNIQUE,
    nummer                  TEXT NOT NULL UNIQUE,
    interne_notitie         TEXT NOT NULL DEFAULT '',
    soort_partij            TEXT NOT NULL,   -- discriminant of PartijIdentificatie
    partij_identificatie    TEXT NOT NULL,   -- JSON payload (inner data only)
    indicatie_geheimhouding INTEGER,         -- NULL = unknown
    voorkeurstaal           TEXT NOT NULL DEFAULT '',
    indicatie_actief        INTEGER NOT NULL,
    created_at              TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS partij_identificatoren (
    id                          INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid                        TEXT NOT NULL UNIQUE,
    partij_uuid                 TEXT REFERENCES partijen(uuid) ON DELETE CASCADE,
    -- The protected foreign key: a parent cannot go while children point at it.
    sub_identificator_van       TEXT REFERENCES partij_identificatoren(uuid)
                                     ON DELETE RESTRICT,
    andere_partij_identificator TEXT NOT NULL DEFAULT '',
    code_objecttype             TEXT NOT NULL,
    code_soort_object_id        TEXT NOT NULL,
    object_id                   TEXT NOT NULL,
    code_register               TEXT NOT NULL,
    created_at                  TEXT NOT NULL,
    UNIQUE (partij_uuid, code_soort_object_id)
);

CREATE INDEX IF NOT EXISTS identificatoren_partij_idx
    ON partij_identificatoren(partij_uuid);
CREATE INDEX IF NOT EXISTS identificatoren_sub_idx
    ON partij_identificatoren(sub_identificator_van);
CREATE INDEX IF NOT EXISTS identificatoren_object_idx
    ON partij_identificatoren(code_soort_object_id, object_id);

PRAGMA user_version = 1;
";
