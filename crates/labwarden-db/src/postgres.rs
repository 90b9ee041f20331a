//! PostgreSQL record store.
//!
//! Ids come from identity columns and `created_at` from the column default,
//! so both are assigned by the database and never by the caller.

use async_trait::async_trait;
use deadpool_postgres::{Config as PoolSettings, Pool, PoolConfig, Runtime};
use labwarden_common::{
    ComplianceTask, Experiment, LabNote, NewComplianceTask, NewExperiment, NewLabNote,
    NewSafetyReport, SafetyReport, TaskUpdate,
};
use std::str::FromStr;
use tokio_postgres::{NoTls, Row};

use crate::error::{DbError, Result};
use crate::schema::{
    COMPLIANCE_TASK_COLUMNS, CREATE_TABLES, EXPERIMENT_COLUMNS, LAB_NOTE_COLUMNS,
    SAFETY_REPORT_COLUMNS, TABLE_COMPLIANCE_TASKS, TABLE_EXPERIMENTS, TABLE_SAFETY_REPORTS,
};
use crate::store::{deadline_order, RecordStore, StoreKind, StoreStats};

/// Store backed by a pooled PostgreSQL connection.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    /// Build a connection pool for `url`. Connections are opened lazily.
    pub fn connect(url: &str, max_connections: usize) -> Result<Self> {
        let mut settings = PoolSettings::new();
        settings.url = Some(url.to_string());
        settings.pool = Some(PoolConfig::new(max_connections));
        let pool = settings.create_pool(Some(Runtime::Tokio1), NoTls)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create the four tables if they don't exist.
    pub async fn initialize(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client.batch_execute(CREATE_TABLES).await?;
        tracing::info!("PostgreSQL schema ready");
        Ok(())
    }
}

// ── Row mapping ─────────────────────────────────────────────────────────────

fn parse_column<T: FromStr>(table: &'static str, column: &str, raw: String) -> Result<T> {
    raw.parse::<T>().map_err(|_| DbError::CorruptRow {
        table,
        message: format!("unexpected {column} value {raw:?}"),
    })
}

fn row_to_experiment(row: &Row) -> Result<Experiment> {
    Ok(Experiment {
        id: row.try_get("id")?,
        compound_name: row.try_get("compound_name")?,
        concentration: row.try_get("concentration")?,
        temperature: row.try_get("temperature")?,
        conditions: row.try_get("conditions")?,
        hazard_level: parse_column(TABLE_EXPERIMENTS, "hazard_level", row.try_get("hazard_level")?)?,
        ai_prediction: row.try_get("ai_prediction")?,
        recommendations: row.try_get("recommendations")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_lab_note(row: &Row) -> Result<LabNote> {
    Ok(LabNote {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        tags: row.try_get("tags")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_compliance_task(row: &Row) -> Result<ComplianceTask> {
    Ok(ComplianceTask {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        deadline: row.try_get("deadline")?,
        status: parse_column(TABLE_COMPLIANCE_TASKS, "status", row.try_get("status")?)?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_safety_report(row: &Row) -> Result<SafetyReport> {
    Ok(SafetyReport {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        incident_date: row.try_get("incident_date")?,
        severity: parse_column(TABLE_SAFETY_REPORTS, "severity", row.try_get("severity")?)?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl RecordStore for PgStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Postgres
    }

    // ── Experiments ─────────────────────────────────────────────────────────

    async fn list_experiments(&self) -> Result<Vec<Experiment>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {EXPERIMENT_COLUMNS} FROM experiments ORDER BY created_at DESC, id DESC");
        let rows = client.query(sql.as_str(), &[]).await?;
        rows.iter().map(row_to_experiment).collect()
    }

    async fn get_experiment(&self, id: i64) -> Result<Option<Experiment>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {EXPERIMENT_COLUMNS} FROM experiments WHERE id = $1");
        let row = client.query_opt(sql.as_str(), &[&id]).await?;
        row.as_ref().map(row_to_experiment).transpose()
    }

    async fn create_experiment(&self, new: NewExperiment) -> Result<Experiment> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO experiments \
                (compound_name, concentration, temperature, conditions, hazard_level, ai_prediction, recommendations) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {EXPERIMENT_COLUMNS}"
        );
        let hazard_level = new.hazard_level.as_str();
        let row = client
            .query_one(
                sql.as_str(),
                &[
                    &new.compound_name,
                    &new.concentration,
                    &new.temperature,
                    &new.conditions,
                    &hazard_level,
                    &new.ai_prediction,
                    &new.recommendations,
                ],
            )
            .await?;
        let exp = row_to_experiment(&row)?;
        tracing::debug!(id = exp.id, compound = %exp.compound_name, "experiment stored");
        Ok(exp)
    }

    // ── Lab notes ───────────────────────────────────────────────────────────

    async fn list_lab_notes(&self) -> Result<Vec<LabNote>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {LAB_NOTE_COLUMNS} FROM lab_notes ORDER BY created_at DESC, id DESC");
        let rows = client.query(sql.as_str(), &[]).await?;
        rows.iter().map(row_to_lab_note).collect()
    }

    async fn get_lab_note(&self, id: i64) -> Result<Option<LabNote>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {LAB_NOTE_COLUMNS} FROM lab_notes WHERE id = $1");
        let row = client.query_opt(sql.as_str(), &[&id]).await?;
        row.as_ref().map(row_to_lab_note).transpose()
    }

    async fn create_lab_note(&self, new: NewLabNote) -> Result<LabNote> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO lab_notes (title, content, tags) VALUES ($1, $2, $3) RETURNING {LAB_NOTE_COLUMNS}"
        );
        let row = client
            .query_one(sql.as_str(), &[&new.title, &new.content, &new.tags])
            .await?;
        row_to_lab_note(&row)
    }

    // ── Compliance tasks ────────────────────────────────────────────────────

    async fn list_compliance_tasks(&self) -> Result<Vec<ComplianceTask>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {COMPLIANCE_TASK_COLUMNS} FROM compliance_tasks ORDER BY id");
        let rows = client.query(sql.as_str(), &[]).await?;
        let mut tasks = rows.iter().map(row_to_compliance_task).collect::<Result<Vec<_>>>()?;
        // Deadlines are free text in the table; order them the same way the memory store does.
        tasks.sort_by(deadline_order);
        Ok(tasks)
    }

    async fn get_compliance_task(&self, id: i64) -> Result<Option<ComplianceTask>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {COMPLIANCE_TASK_COLUMNS} FROM compliance_tasks WHERE id = $1");
        let row = client.query_opt(sql.as_str(), &[&id]).await?;
        row.as_ref().map(row_to_compliance_task).transpose()
    }

    async fn create_compliance_task(&self, new: NewComplianceTask) -> Result<ComplianceTask> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO compliance_tasks (title, description, deadline, status) \
             VALUES ($1, $2, $3, $4) RETURNING {COMPLIANCE_TASK_COLUMNS}"
        );
        let status = new.status.as_str();
        let row = client
            .query_one(sql.as_str(), &[&new.title, &new.description, &new.deadline, &status])
            .await?;
        row_to_compliance_task(&row)
    }

    async fn update_compliance_task(&self, id: i64, update: TaskUpdate) -> Result<Option<ComplianceTask>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE compliance_tasks SET status = COALESCE($2, status) \
             WHERE id = $1 RETURNING {COMPLIANCE_TASK_COLUMNS}"
        );
        let status: Option<&str> = update.status.as_ref().map(|s| s.as_str());
        let row = client.query_opt(sql.as_str(), &[&id, &status]).await?;
        row.as_ref().map(row_to_compliance_task).transpose()
    }

    // ── Safety reports ──────────────────────────────────────────────────────

    async fn list_safety_reports(&self) -> Result<Vec<SafetyReport>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {SAFETY_REPORT_COLUMNS} FROM safety_reports ORDER BY created_at DESC, id DESC");
        let rows = client.query(sql.as_str(), &[]).await?;
        rows.iter().map(row_to_safety_report).collect()
    }

    async fn get_safety_report(&self, id: i64) -> Result<Option<SafetyReport>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {SAFETY_REPORT_COLUMNS} FROM safety_reports WHERE id = $1");
        let row = client.query_opt(sql.as_str(), &[&id]).await?;
        row.as_ref().map(row_to_safety_report).transpose()
    }

    async fn create_safety_report(&self, new: NewSafetyReport) -> Result<SafetyReport> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO safety_reports (title, content, incident_date, severity) \
             VALUES ($1, $2, $3, $4) RETURNING {SAFETY_REPORT_COLUMNS}"
        );
        let severity = new.severity.as_str();
        let row = client
            .query_one(sql.as_str(), &[&new.title, &new.content, &new.incident_date, &severity])
            .await?;
        row_to_safety_report(&row)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "SELECT \
                    (SELECT COUNT(*) FROM experiments), \
                    (SELECT COUNT(*) FROM lab_notes), \
                    (SELECT COUNT(*) FROM compliance_tasks), \
                    (SELECT COUNT(*) FROM safety_reports)",
                &[],
            )
            .await?;
        let count = |idx: usize| -> Result<u64> { Ok(row.try_get::<_, i64>(idx)?.max(0) as u64) };
        Ok(StoreStats {
            experiments: count(0)?,
            lab_notes: count(1)?,
            compliance_tasks: count(2)?,
            safety_reports: count(3)?,
        })
    }
}
