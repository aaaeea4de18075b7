//! Direct-Connection Provisioner - provisions a schema on a running server.
//!
//! Used when the service is not managed as a container. Every value that
//! ends up inside statement text goes through the session's quoting.

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{DatabaseConnector, DatabaseSession},
    },
    domain::{AdminCredentials, DomainError},
    error::BerthResult,
};

/// Host the created user may connect from.
const USER_HOST: &str = "localhost";

/// Issues provisioning statements against a relational server.
pub struct DirectConnectionProvisioner {
    connector: Box<dyn DatabaseConnector>,
}

impl DirectConnectionProvisioner {
    pub fn new(connector: Box<dyn DatabaseConnector>) -> Self {
        Self { connector }
    }

    /// Whether `user` can open a session and run a trivial query.
    ///
    /// Unreachable hosts, wrong ports and rejected credentials all yield
    /// `false`.
    #[instrument(skip(self, password))]
    pub fn check_connection(&self, host: &str, port: u16, user: &str, password: &str) -> bool {
        let mut session = match self.connector.connect(host, port, user, password) {
            Ok(session) => session,
            Err(e) => {
                debug!(error = %e, "Connection refused");
                return false;
            }
        };

        match session.ping() {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "Ping failed");
                false
            }
        }
    }

    /// Create `database` and a user limited to it.
    ///
    /// Safe to repeat: every statement is conditional or idempotent. The
    /// first rejected statement aborts the sequence with
    /// [`ApplicationError::StatementFailed`]; later statements never run.
    #[instrument(skip(self, admin, password), fields(admin = %admin.username))]
    pub fn create_database_and_user(
        &self,
        host: &str,
        port: u16,
        admin: &AdminCredentials,
        database: &str,
        user: &str,
        password: &str,
    ) -> BerthResult<()> {
        if database.trim().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "database" }.into());
        }
        if user.trim().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "username" }.into());
        }

        let mut session = self
            .connector
            .connect(host, port, &admin.username, &admin.password)?;

        let statements = provisioning_statements(session.as_ref(), database, user, password);
        let total = statements.len();

        for (index, statement) in statements.iter().enumerate() {
            let step = index + 1;
            if let Err(e) = session.execute(statement) {
                warn!(step, total, error = %e, "Provisioning aborted");
                return Err(ApplicationError::StatementFailed {
                    step,
                    total,
                    reason: e.to_string(),
                }
                .into());
            }
            debug!(step, total, "Statement applied");
        }

        info!(database, user, "Database and user ready");
        Ok(())
    }
}

/// Schema, user, schema-scoped grant, reload; in that order.
fn provisioning_statements(
    session: &dyn DatabaseSession,
    database: &str,
    user: &str,
    password: &str,
) -> Vec<String> {
    let schema = session.quote_identifier(database);
    let account = format!(
        "{}@{}",
        session.quote_literal(user),
        session.quote_literal(USER_HOST)
    );

    vec![
        format!(
            "CREATE DATABASE IF NOT EXISTS {schema} CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci"
        ),
        format!(
            "CREATE USER IF NOT EXISTS {account} IDENTIFIED BY {}",
            session.quote_literal(password)
        ),
        format!("GRANT ALL PRIVILEGES ON {schema}.* TO {account}"),
        "FLUSH PRIVILEGES".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::domain::FailureStage;

    /// In-memory server: tracks schemas and users, records statements.
    #[derive(Default)]
    struct ServerState {
        statements: Vec<String>,
        schemas: BTreeSet<String>,
        users: BTreeSet<String>,
        open_sessions: usize,
        fail_on: Option<&'static str>,
    }

    #[derive(Clone)]
    struct FakeServer {
        state: Arc<Mutex<ServerState>>,
        reachable_port: u16,
        admin_password: &'static str,
    }

    impl FakeServer {
        fn new() -> Self {
            Self {
                state: Arc::default(),
                reachable_port: 3306,
                admin_password: "root",
            }
        }

        fn failing_on(self, keyword: &'static str) -> Self {
            self.state.lock().unwrap().fail_on = Some(keyword);
            self
        }
    }

    struct FakeSession {
        state: Arc<Mutex<ServerState>>,
    }

    impl Drop for FakeSession {
        fn drop(&mut self) {
            self.state.lock().unwrap().open_sessions -= 1;
        }
    }

    impl DatabaseConnector for FakeServer {
        fn connect(
            &self,
            host: &str,
            port: u16,
            _user: &str,
            password: &str,
        ) -> BerthResult<Box<dyn DatabaseSession>> {
            let refuse = |reason: &str| -> BerthResult<Box<dyn DatabaseSession>> {
                Err(ApplicationError::ConnectionFailed {
                    host: host.into(),
                    port,
                    reason: reason.into(),
                }
                .into())
            };
            if host != "127.0.0.1" {
                return refuse("unknown host");
            }
            if port != self.reachable_port {
                return refuse("connection refused");
            }
            if password != self.admin_password {
                return refuse("access denied");
            }

            self.state.lock().unwrap().open_sessions += 1;
            Ok(Box::new(FakeSession {
                state: Arc::clone(&self.state),
            }))
        }
    }

    impl DatabaseSession for FakeSession {
        fn execute(&mut self, statement: &str) -> BerthResult<()> {
            let mut state = self.state.lock().unwrap();
            if state.fail_on.is_some_and(|k| statement.starts_with(k)) {
                return Err(ApplicationError::ConnectionFailed {
                    host: "127.0.0.1".into(),
                    port: 3306,
                    reason: "denied".into(),
                }
                .into());
            }
            state.statements.push(statement.to_string());
            if let Some(rest) = statement.strip_prefix("CREATE DATABASE IF NOT EXISTS ") {
                let name = rest.split_whitespace().next().unwrap_or_default().to_string();
                state.schemas.insert(name);
            }
            if let Some(rest) = statement.strip_prefix("CREATE USER IF NOT EXISTS ") {
                let name = rest.split_whitespace().next().unwrap_or_default().to_string();
                state.users.insert(name);
            }
            Ok(())
        }

        fn ping(&mut self) -> BerthResult<()> {
            Ok(())
        }

        fn quote_literal(&self, value: &str) -> String {
            format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
        }

        fn quote_identifier(&self, identifier: &str) -> String {
            format!("`{}`", identifier.replace('`', "``"))
        }
    }

    fn admin() -> AdminCredentials {
        AdminCredentials::new("root", "root")
    }

    #[test]
    fn check_connection_is_false_for_every_failure_mode() {
        let server = FakeServer::new();
        let provisioner = DirectConnectionProvisioner::new(Box::new(server.clone()));

        assert!(!provisioner.check_connection("db.invalid", 3306, "root", "root"));
        assert!(!provisioner.check_connection("127.0.0.1", 3307, "root", "root"));
        assert!(!provisioner.check_connection("127.0.0.1", 3306, "root", "wrong"));
        assert!(provisioner.check_connection("127.0.0.1", 3306, "root", "root"));

        assert_eq!(server.state.lock().unwrap().open_sessions, 0);
    }

    #[test]
    fn grant_is_scoped_to_the_schema_and_local_user() {
        let server = FakeServer::new();
        let provisioner = DirectConnectionProvisioner::new(Box::new(server.clone()));

        provisioner
            .create_database_and_user("127.0.0.1", 3306, &admin(), "shop", "shop_user", "pw")
            .unwrap();

        let state = server.state.lock().unwrap();
        let grant = state
            .statements
            .iter()
            .find(|s| s.starts_with("GRANT"))
            .unwrap();
        assert_eq!(
            grant,
            "GRANT ALL PRIVILEGES ON `shop`.* TO 'shop_user'@'localhost'"
        );
        assert!(!grant.contains("*.*"));
        assert_eq!(state.statements.last().unwrap(), "FLUSH PRIVILEGES");
    }

    #[test]
    fn provisioning_twice_succeeds_and_changes_nothing() {
        let server = FakeServer::new();
        let provisioner = DirectConnectionProvisioner::new(Box::new(server.clone()));

        provisioner
            .create_database_and_user("127.0.0.1", 3306, &admin(), "shop", "shop_user", "pw")
            .unwrap();
        let (schemas, users) = {
            let s = server.state.lock().unwrap();
            (s.schemas.clone(), s.users.clone())
        };

        provisioner
            .create_database_and_user("127.0.0.1", 3306, &admin(), "shop", "shop_user", "pw")
            .unwrap();

        let state = server.state.lock().unwrap();
        assert_eq!(state.schemas, schemas);
        assert_eq!(state.users, users);
        assert_eq!(state.statements.len(), 8);
    }

    #[test]
    fn first_failure_aborts_before_the_grant() {
        let server = FakeServer::new().failing_on("CREATE USER");
        let provisioner = DirectConnectionProvisioner::new(Box::new(server.clone()));

        let err = provisioner
            .create_database_and_user("127.0.0.1", 3306, &admin(), "shop", "shop_user", "pw")
            .unwrap_err();

        assert!(matches!(
            err,
            crate::error::BerthError::Application(ApplicationError::StatementFailed {
                step: 2,
                total: 4,
                ..
            })
        ));
        assert_eq!(err.failure_stage(), Some(FailureStage::DirectConnection));

        let state = server.state.lock().unwrap();
        assert!(state.statements.iter().all(|s| !s.starts_with("GRANT")));
        assert_eq!(state.open_sessions, 0);
    }

    #[test]
    fn values_are_escaped_before_interpolation() {
        let server = FakeServer::new();
        let provisioner = DirectConnectionProvisioner::new(Box::new(server.clone()));

        provisioner
            .create_database_and_user("127.0.0.1", 3306, &admin(), "we`ird", "o'brien", "p'w")
            .unwrap();

        let state = server.state.lock().unwrap();
        assert!(state.statements[0].contains("`we``ird`"));
        assert!(state.statements[1].contains("'o\\'brien'@'localhost'"));
        assert!(state.statements[1].ends_with("IDENTIFIED BY 'p\\'w'"));
    }

    #[test]
    fn empty_names_are_rejected_without_connecting() {
        let server = FakeServer::new();
        let provisioner = DirectConnectionProvisioner::new(Box::new(server.clone()));

        assert!(
            provisioner
                .create_database_and_user("127.0.0.1", 3306, &admin(), " ", "u", "pw")
                .is_err()
        );
        assert!(
            provisioner
                .create_database_and_user("127.0.0.1", 3306, &admin(), "shop", "", "pw")
                .is_err()
        );
        assert!(server.state.lock().unwrap().statements.is_empty());
    }

    #[test]
    fn wrong_admin_password_is_a_direct_connection_failure() {
        let provisioner = DirectConnectionProvisioner::new(Box::new(FakeServer::new()));
        let err = provisioner
            .create_database_and_user(
                "127.0.0.1",
                3306,
                &AdminCredentials::new("root", "nope"),
                "shop",
                "shop_user",
                "pw",
            )
            .unwrap_err();

        assert_eq!(err.failure_stage(), Some(FailureStage::DirectConnection));
    }
}
