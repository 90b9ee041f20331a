//! Relational schema for the PostgreSQL backend.

pub const TABLE_EXPERIMENTS: &str = "experiments";
pub const TABLE_COMPLIANCE_TASKS: &str = "compliance_tasks";
pub const TABLE_SAFETY_REPORTS: &str = "safety_reports";

/// Idempotent DDL run by `PgStore::initialize`.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS experiments (
    id              BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
    compound_name   TEXT NOT NULL,
    concentration   TEXT NOT NULL,
    temperature     TEXT NOT NULL,
    conditions      TEXT,
    hazard_level    TEXT NOT NULL,
    ai_prediction   TEXT NOT NULL,
    recommendations TEXT,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
);

CREATE TABLE IF NOT EXISTS lab_notes (
    id          BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    tags        TEXT,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
);

CREATE TABLE IF NOT EXISTS compliance_tasks (
    id          BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    deadline    TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'pending',
    created_at  TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
);

CREATE TABLE IF NOT EXISTS safety_reports (
    id            BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
    title         TEXT NOT NULL,
    content       TEXT NOT NULL,
    incident_date TEXT NOT NULL,
    severity      TEXT NOT NULL DEFAULT 'low',
    created_at    TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
);
"#;

pub(crate) const EXPERIMENT_COLUMNS: &str =
    "id, compound_name, concentration, temperature, conditions, hazard_level, ai_prediction, recommendations, created_at";
pub(crate) const LAB_NOTE_COLUMNS: &str = "id, title, content, tags, created_at";
pub(crate) const COMPLIANCE_TASK_COLUMNS: &str = "id, title, description, deadline, status, created_at";
pub(crate) const SAFETY_REPORT_COLUMNS: &str = "id, title, content, incident_date, severity, created_at";
