//! Partition and entry operations.
//!
//! A partition is a named key→response store. Entries are keyed by the
//! absolute request URL and carry the stored response plus the time it was
//! written.

use super::connection::CacheDb;
use crate::Error;
use crate::message::Response;
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, Connection, OptionalExtension};

type Row = (i64, String, Vec<u8>);

fn ensure_partition(conn: &Connection, name: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)",
        params![name, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn write_entry(conn: &Connection, partition: &str, url: &str, response: &Response) -> Result<(), Error> {
    let headers_json =
        serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(format!("headers for {url}: {e}")))?;
    conn.execute(
        "INSERT INTO entries (partition, url, status, headers_json, body, stored_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(partition, url) DO UPDATE SET
            status = excluded.status,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            partition,
            url,
            response.status as i64,
            headers_json,
            response.body.to_vec(),
            chrono::Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

fn decode_entry(url: &str, (status, headers_json, body): Row) -> Result<Response, Error> {
    let status = u16::try_from(status).map_err(|_| Error::CorruptEntry(format!("status {status} for {url}")))?;
    let headers: Vec<(String, String)> =
        serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(format!("headers for {url}: {e}")))?;
    Ok(Response { status, headers, body: Bytes::from(body) })
}

impl CacheDb {
    /// Open a partition, creating it on first use.
    pub async fn open_partition(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> { ensure_partition(conn, &name) })
            .await
            .map_err(Error::from)
    }

    /// List partition names in creation order.
    pub async fn partition_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM partitions ORDER BY rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, rusqlite::Error>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a partition and every entry in it.
    ///
    /// Returns false if the partition did not exist.
    pub async fn delete_partition(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM partitions WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the response stored under `url` in `partition`.
    ///
    /// Returns None if either the partition or the entry doesn't exist.
    pub async fn match_entry(&self, partition: &str, url: &str) -> Result<Option<Response>, Error> {
        let partition = partition.to_string();
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let row: Option<Row> = conn
                    .query_row(
                        "SELECT status, headers_json, body FROM entries WHERE partition = ?1 AND url = ?2",
                        params![partition, url],
                        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                    )
                    .optional()?;
                row.map(|row| decode_entry(&url, row)).transpose()
            })
            .await
            .map_err(Error::from)
    }

    /// Store a response under `url`, replacing any previous entry.
    ///
    /// Opens the partition if it doesn't exist yet.
    pub async fn put_entry(&self, partition: &str, url: &str, response: Response) -> Result<(), Error> {
        let partition = partition.to_string();
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                ensure_partition(conn, &partition)?;
                write_entry(conn, &partition, &url, &response)
            })
            .await
            .map_err(Error::from)
    }

    /// Store several responses in one transaction.
    ///
    /// Either every entry is written or none is.
    pub async fn put_entries(&self, partition: &str, entries: Vec<(String, Response)>) -> Result<(), Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_partition(&tx, &partition)?;
                for (url, response) in &entries {
                    write_entry(&tx, &partition, url, response)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Keys stored in a partition, oldest write first.
    pub async fn entry_keys(&self, partition: &str) -> Result<Vec<String>, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt =
                    conn.prepare("SELECT url FROM entries WHERE partition = ?1 ORDER BY stored_at ASC, rowid ASC")?;
                let keys = stmt
                    .query_map(params![partition], |row| row.get(0))?
                    .collect::<Result<Vec<String>, rusqlite::Error>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }
}
