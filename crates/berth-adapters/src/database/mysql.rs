//! MySQL / MariaDB administrator sessions over the `mysql` driver.

use std::time::Duration;

use berth_core::{
    application::{
        ApplicationError,
        ports::{DatabaseConnector, DatabaseSession},
    },
    error::{BerthError, BerthResult},
};
use mysql::{Conn, OptsBuilder, Value, prelude::Queryable};
use tracing::{debug, instrument};

/// Opens blocking connections with bounded connect/read/write timeouts.
#[derive(Debug, Clone, Copy)]
pub struct MysqlConnector {
    timeout: Duration,
}

impl Default for MysqlConnector {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
        }
    }
}

impl MysqlConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl DatabaseConnector for MysqlConnector {
    #[instrument(skip(self, password))]
    fn connect(
        &self,
        host: &str,
        port: u16,
        user: &str,
        password: &str,
    ) -> BerthResult<Box<dyn DatabaseSession>> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(host))
            .tcp_port(port)
            .user(Some(user))
            .pass(Some(password))
            .tcp_connect_timeout(Some(self.timeout))
            .read_timeout(Some(self.timeout))
            .write_timeout(Some(self.timeout));

        let connection_failed = |e: mysql::Error| ApplicationError::ConnectionFailed {
            host: host.to_string(),
            port,
            reason: e.to_string(),
        };

        let mut conn = Conn::new(opts).map_err(connection_failed)?;
        let sql_mode: Option<String> = conn
            .query_first("SELECT @@SESSION.sql_mode")
            .map_err(connection_failed)?;
        let no_backslash_escapes = sql_mode.as_deref().is_some_and(backslash_escapes_disabled);

        debug!(no_backslash_escapes, "session opened");
        Ok(Box::new(MysqlSession {
            conn,
            host: host.to_string(),
            port,
            no_backslash_escapes,
        }))
    }
}

/// An open administrator connection. Closed when dropped.
pub struct MysqlSession {
    conn: Conn,
    host: String,
    port: u16,
    /// Server ignores `\` in literals, so quotes must be doubled instead.
    no_backslash_escapes: bool,
}

impl MysqlSession {
    fn query_error(&self, e: mysql::Error) -> BerthError {
        ApplicationError::ConnectionFailed {
            host: self.host.clone(),
            port: self.port,
            reason: e.to_string(),
        }
        .into()
    }
}

impl DatabaseSession for MysqlSession {
    fn execute(&mut self, statement: &str) -> BerthResult<()> {
        self.conn
            .query_drop(statement)
            .map_err(|e| self.query_error(e))
    }

    fn ping(&mut self) -> BerthResult<()> {
        self.conn
            .query_drop("SELECT 1")
            .map_err(|e| self.query_error(e))
    }

    fn quote_literal(&self, value: &str) -> String {
        escape_literal(value, self.no_backslash_escapes)
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        escape_identifier(identifier)
    }
}

/// Quoted string literal, escaped by the driver for the session's `sql_mode`.
fn escape_literal(value: &str, no_backslash_escapes: bool) -> String {
    Value::from(value).as_sql(no_backslash_escapes)
}

fn backslash_escapes_disabled(sql_mode: &str) -> bool {
    sql_mode
        .split(',')
        .any(|mode| mode.trim().eq_ignore_ascii_case("NO_BACKSLASH_ESCAPES"))
}

/// Backtick-quoted identifier with embedded backticks doubled.
fn escape_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}
