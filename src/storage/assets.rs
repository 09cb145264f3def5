use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::Asset;
use super::tables::*;

impl Database {
    // ========================================================================
    // Asset operations
    // ========================================================================

    /// Store an asset record and its serving-path index entry
    pub fn put_asset(&self, asset: &Asset) -> Result<(), DatabaseError> {
        debug_assert!(!asset.id.is_empty(), "asset id must not be empty");
        debug_assert!(!asset.path.is_empty(), "asset path must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(ASSETS)?;
            let data = rmp_serde::to_vec_named(asset)?;
            table.insert(asset.id.as_str(), data.as_slice())?;

            let mut path_table = write_txn.open_table(ASSET_PATHS)?;
            path_table.insert(asset.path.as_str(), asset.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get an asset by its UUID
    pub fn get_asset(&self, id: &str) -> Result<Option<Asset>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ASSETS)?;

        match table.get(id)? {
            Some(data) => {
                let asset: Asset = rmp_serde::from_slice(data.value())?;
                Ok(Some(asset))
            }
            None => Ok(None),
        }
    }

    /// Get an asset by its serving path (resolves path -> uuid -> asset)
    pub fn get_asset_by_path(&self, path: &str) -> Result<Option<Asset>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let path_table = read_txn.open_table(ASSET_PATHS)?;

        let id = match path_table.get(path)? {
            Some(data) => data.value().to_string(),
            None => return Ok(None),
        };

        let assets_table = read_txn.open_table(ASSETS)?;
        match assets_table.get(id.as_str())? {
            Some(data) => {
                let asset: Asset = rmp_serde::from_slice(data.value())?;
                Ok(Some(asset))
            }
            None => Ok(None),
        }
    }

    /// Delete an asset by its UUID and clean up the path index
    pub fn delete_asset(&self, id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let path: Option<String> = {
            let table = write_txn.open_table(ASSETS)?;
            let record = match table.get(id)? {
                Some(data) => {
                    let asset: Asset = rmp_serde::from_slice(data.value())?;
                    Some(asset.path)
                }
                None => None,
            };
            record
        };

        let deleted = match path {
            Some(path) => {
                {
                    let mut table = write_txn.open_table(ASSETS)?;
                    table.remove(id)?;
                }
                {
                    let mut path_table = write_txn.open_table(ASSET_PATHS)?;
                    path_table.remove(path.as_str())?;
                }
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(deleted)
    }

    /// Check if a serving path is already in use
    pub fn asset_path_exists(&self, path: &str) -> Result<bool, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ASSET_PATHS)?;
        Ok(table.get(path)?.is_some())
    }
}
