/// Connection Resolution Module
///
/// Turns resolved credentials into a live MySQL connection: one call, one
/// attempt, one handle. No retries and no pooling; ownership of the handle
/// belongs to whoever called.
use crate::core::{MapSqlError, Result};
use crate::credentials::Credentials;
use mysql::{Conn, OptsBuilder};
use tracing::{debug, error};

/// Opens a connection with the given credentials.
///
/// The configured character set is applied through a connection init
/// statement. The connection runs in autocommit mode, so every successful
/// statement commits on its own.
///
/// # Errors
///
/// Returns `MapSqlError::Driver` if the handshake fails.
pub fn open(credentials: &Credentials) -> Result<Conn> {
    let opts = OptsBuilder::new()
        .ip_or_hostname(Some(credentials.host.clone()))
        .user(Some(credentials.user.clone()))
        .pass(Some(credentials.password.clone()))
        .db_name(Some(credentials.db.clone()))
        .init(vec![format!("SET NAMES {}", credentials.charset)]);

    let conn = Conn::new(opts).map_err(|e| {
        error!(
            "connection to {}/{} failed: {}",
            credentials.host, credentials.db, e
        );
        MapSqlError::Driver(e)
    })?;

    debug!("connected to {}/{}", credentials.host, credentials.db);
    Ok(conn)
}
