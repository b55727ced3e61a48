//! Connection provider.
//!
//! File-backed stores open a fresh connection for every operation and drop it
//! when the operation finishes, whatever the outcome. In-memory stores cannot
//! do that (a new connection would see an empty database), so they share one
//! connection for the life of the store.

use std::{path::PathBuf, sync::Arc, time::Duration};

use rusqlite::functions::FunctionFlags;
use tokio_rusqlite::Connection;

use crate::{Error, Result, encode::fold_case};

/// SQL name of the Unicode case-folding function used by search.
pub(crate) const FOLD_FUNCTION: &str = "nsos_fold";

#[derive(Clone)]
enum Source {
  File(Arc<PathBuf>),
  Memory(Connection),
}

#[derive(Clone)]
pub(crate) struct ConnectionProvider {
  source:  Source,
  timeout: Duration,
}

impl ConnectionProvider {
  pub(crate) fn file(path: PathBuf, timeout: Duration) -> Self {
    Self { source: Source::File(Arc::new(path)), timeout }
  }

  pub(crate) async fn memory(timeout: Duration) -> Result<Self> {
    let conn = Connection::open_in_memory().await?;
    configure(&conn, timeout).await?;
    Ok(Self { source: Source::Memory(conn), timeout })
  }

  /// Open (or, for in-memory stores, hand out) a configured connection.
  pub(crate) async fn acquire(&self) -> Result<Connection> {
    match &self.source {
      Source::Memory(conn) => Ok(conn.clone()),
      Source::File(path) => {
        let path = PathBuf::clone(path);
        let conn = tokio::time::timeout(self.timeout, Connection::open(path))
          .await
          .map_err(|_| Error::Timeout(self.timeout))??;
        configure(&conn, self.timeout).await?;
        Ok(conn)
      }
    }
  }

  /// Run `f` on a freshly acquired connection, bounded by the configured
  /// timeout. The connection is released when this returns.
  pub(crate) async fn call<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R>
      + Send
      + 'static,
    R: Send + 'static,
  {
    let conn = self.acquire().await?;
    Ok(
      tokio::time::timeout(self.timeout, conn.call(f))
        .await
        .map_err(|_| Error::Timeout(self.timeout))??,
    )
  }
}

/// Per-connection settings and functions; SQLite does not persist these in
/// the file.
async fn configure(conn: &Connection, timeout: Duration) -> Result<()> {
  conn
    .call(move |conn| {
      conn.busy_timeout(timeout)?;
      conn.pragma_update(None, "foreign_keys", "ON")?;
      conn.create_scalar_function(
        FOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|text| fold_case(&text))),
      )?;
      Ok(())
    })
    .await?;
  Ok(())
}
