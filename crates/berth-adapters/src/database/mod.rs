//! Database driver adapters.

mod mysql;

pub use self::mysql::{MysqlConnector, MysqlSession};
