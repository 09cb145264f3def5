use redb::{Database as RedbDatabase, ReadTransaction, ReadableTable, WriteTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::tables::*;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Commit error: {0}")]
    Commit(Box<redb::CommitError>),
    #[error("Database error: {0}")]
    Redb(Box<redb::Error>),
    #[error("Database error: {0}")]
    RedbDatabase(Box<redb::DatabaseError>),
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),
    #[error("Storage error: {0}")]
    Storage(Box<redb::StorageError>),
    #[error("Table error: {0}")]
    Table(Box<redb::TableError>),
    #[error("Transaction error: {0}")]
    Transaction(Box<redb::TransactionError>),
}

impl From<redb::CommitError> for DatabaseError {
    fn from(e: redb::CommitError) -> Self {
        DatabaseError::Commit(Box::new(e))
    }
}

impl From<redb::DatabaseError> for DatabaseError {
    fn from(e: redb::DatabaseError) -> Self {
        DatabaseError::RedbDatabase(Box::new(e))
    }
}

impl From<redb::Error> for DatabaseError {
    fn from(e: redb::Error) -> Self {
        DatabaseError::Redb(Box::new(e))
    }
}

impl From<redb::StorageError> for DatabaseError {
    fn from(e: redb::StorageError) -> Self {
        DatabaseError::Storage(Box::new(e))
    }
}

impl From<redb::TableError> for DatabaseError {
    fn from(e: redb::TableError) -> Self {
        DatabaseError::Table(Box::new(e))
    }
}

impl From<redb::TransactionError> for DatabaseError {
    fn from(e: redb::TransactionError) -> Self {
        DatabaseError::Transaction(Box::new(e))
    }
}

pub struct Database {
    db: Arc<RedbDatabase>,
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

/// Statistics from a purge operation
#[derive(Debug, Default)]
pub struct PurgeStats {
    pub assets: u64,
    pub events: u64,
    pub resources: u64,
    pub gallery_events: u64,
    pub gallery_media: u64,
    pub council_leaders: u64,
    pub quotes: u64,
    pub awareness_months: u64,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("club-cms.redb");
        let db = Arc::new(RedbDatabase::create(db_path)?);

        // Initialize application tables
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ASSETS)?;
            let _ = write_txn.open_table(ASSET_PATHS)?;
            let _ = write_txn.open_table(EVENTS)?;
            let _ = write_txn.open_table(EVENT_SLUGS)?;
            let _ = write_txn.open_table(RESOURCES)?;
            let _ = write_txn.open_table(GALLERY_EVENTS)?;
            let _ = write_txn.open_table(GALLERY_SLUGS)?;
            let _ = write_txn.open_table(GALLERY_MEDIA)?;
            let _ = write_txn.open_table(GALLERY_EVENT_MEDIA)?;
            let _ = write_txn.open_table(COUNCIL_LEADERS)?;
            let _ = write_txn.open_table(QUOTES)?;
            let _ = write_txn.open_table(AWARENESS_MONTHS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Begin a read transaction
    pub fn begin_read(&self) -> Result<ReadTransaction, DatabaseError> {
        Ok(self.db.begin_read()?)
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> Result<WriteTransaction, DatabaseError> {
        Ok(self.db.begin_write()?)
    }

    // ========================================================================
    // Admin operations
    // ========================================================================

    /// Purge all data - for testing only
    pub fn purge_all(&self) -> Result<PurgeStats, DatabaseError> {
        let write_txn = self.begin_write()?;
        let stats = PurgeStats {
            assets: clear_record_table(&write_txn, ASSETS)?,
            events: clear_record_table(&write_txn, EVENTS)?,
            resources: clear_record_table(&write_txn, RESOURCES)?,
            gallery_events: clear_record_table(&write_txn, GALLERY_EVENTS)?,
            gallery_media: clear_record_table(&write_txn, GALLERY_MEDIA)?,
            council_leaders: clear_record_table(&write_txn, COUNCIL_LEADERS)?,
            quotes: clear_record_table(&write_txn, QUOTES)?,
            awareness_months: clear_record_table(&write_txn, AWARENESS_MONTHS)?,
        };
        clear_record_table(&write_txn, GALLERY_EVENT_MEDIA)?;
        clear_index_table(&write_txn, ASSET_PATHS)?;
        clear_index_table(&write_txn, EVENT_SLUGS)?;
        clear_index_table(&write_txn, GALLERY_SLUGS)?;
        write_txn.commit()?;
        Ok(stats)
    }
}

fn clear_record_table(
    txn: &WriteTransaction,
    def: redb::TableDefinition<'static, &'static str, &'static [u8]>,
) -> Result<u64, DatabaseError> {
    let table = txn.open_table(def)?;
    let keys: Vec<String> = table
        .iter()?
        .map(|r| r.map(|(k, _)| k.value().to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    drop(table);

    let mut table = txn.open_table(def)?;
    let mut removed = 0;
    for key in keys {
        table.remove(key.as_str())?;
        removed += 1;
    }
    Ok(removed)
}

fn clear_index_table(
    txn: &WriteTransaction,
    def: redb::TableDefinition<'static, &'static str, &'static str>,
) -> Result<u64, DatabaseError> {
    let table = txn.open_table(def)?;
    let keys: Vec<String> = table
        .iter()?
        .map(|r| r.map(|(k, _)| k.value().to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    drop(table);

    let mut table = txn.open_table(def)?;
    let mut removed = 0;
    for key in keys {
        table.remove(key.as_str())?;
        removed += 1;
    }
    Ok(removed)
}
