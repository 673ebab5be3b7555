//! SQLite-backed record store for company listings.
//!
//! The store is the single source of truth for deduplication. `name` carries
//! a UNIQUE constraint, so two collectors racing to insert the same company
//! end with one row and one [`ScoutError::Integrity`] that callers treat as
//! "already present".

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use uuid::Uuid;

use crate::types::{Company, CompanyDraft, ScoutError, ScoutResult};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS companies (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    location TEXT NOT NULL,
    description TEXT NOT NULL,
    link TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT
);";

const COLUMNS: &str = "id, name, location, description, link, created_at, updated_at";

/// Persistence façade over the company table.
pub trait CompanyStore: Send + Sync {
    /// Insert a new company. Fails with [`ScoutError::Integrity`] on a
    /// constraint violation.
    fn create(&self, draft: &CompanyDraft) -> ScoutResult<Company>;

    /// Look up a company by its exact name.
    fn find_by_name(&self, name: &str) -> ScoutResult<Option<Company>>;
}

/// Company store backed by a single SQLite connection.
pub struct SqliteCompanyStore {
    db: Mutex<Connection>,
}

impl SqliteCompanyStore {
    /// Open or create a store at `path`.
    pub fn open(path: &Path) -> ScoutResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Connection::open(path)?;
        Self::init(db)
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> ScoutResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(db: Connection) -> ScoutResult<Self> {
        db.busy_timeout(std::time::Duration::from_secs(5))?;
        db.execute_batch(SCHEMA)?;
        Ok(Self { db: Mutex::new(db) })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        // Each statement commits or rolls back before the guard drops.
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All companies, newest first, at most `limit` rows.
    pub fn list(&self, limit: Option<usize>) -> ScoutResult<Vec<Company>> {
        let db = self.conn();
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = db.prepare(&format!(
            "SELECT {COLUMNS} FROM companies ORDER BY created_at DESC, name LIMIT ?1"
        ))?;
        let rows = stmt
            .query_map(params![limit], company_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Number of stored companies.
    pub fn count(&self) -> ScoutResult<u64> {
        let db = self.conn();
        let n: i64 = db.query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

impl CompanyStore for SqliteCompanyStore {
    fn create(&self, draft: &CompanyDraft) -> ScoutResult<Company> {
        let company = Company {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            location: draft.location.clone(),
            description: draft.description.clone(),
            link: draft.link.clone(),
            created_at: Utc::now(),
            updated_at: None,
        };

        let mut db = self.conn();
        let tx = db.transaction()?;
        let inserted = tx.execute(
            "INSERT INTO companies (id, name, location, description, link, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL)",
            params![
                company.id.to_string(),
                company.name,
                company.location,
                company.description,
                company.link,
                company.created_at.to_rfc3339(),
            ],
        );

        match inserted {
            Ok(_) => tx.commit()?,
            Err(e) if is_constraint_violation(&e) => {
                tracing::warn!(
                    "integrity error while creating Company(name={}): {e}",
                    company.name
                );
                tx.rollback()?;
                return Err(ScoutError::Integrity {
                    entity: "Company",
                    key: company.name,
                    source: e,
                });
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            "created company: id={}; name={}; location={}; description={}; link={}",
            company.id,
            company.name,
            company.location,
            company.description,
            company.link
        );
        Ok(company)
    }

    fn find_by_name(&self, name: &str) -> ScoutResult<Option<Company>> {
        let db = self.conn();
        let mut stmt = db.prepare(&format!(
            "SELECT {COLUMNS} FROM companies WHERE name = ?1 LIMIT 1"
        ))?;
        let company = stmt
            .query_row(params![name], company_from_row)
            .optional()?;
        Ok(company)
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation
    )
}

fn company_from_row(row: &Row<'_>) -> rusqlite::Result<Company> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(5)?;
    let updated_at: Option<String> = row.get(6)?;
    Ok(Company {
        id: Uuid::parse_str(&id).map_err(|e| conversion_error(0, e))?,
        name: row.get(1)?,
        location: row.get(2)?,
        description: row.get(3)?,
        link: row.get(4)?,
        created_at: parse_timestamp(5, &created_at)?,
        updated_at: updated_at
            .map(|ts| parse_timestamp(6, &ts))
            .transpose()?,
    })
}

fn parse_timestamp(column: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e))
}

fn conversion_error<E>(column: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
}
