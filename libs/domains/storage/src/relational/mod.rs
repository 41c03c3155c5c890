pub mod backend;
pub mod builder;
pub mod decode;
pub mod executor;
pub mod mysql;

pub use backend::{SqlBackend, SqlExecutor, SqlTransaction};
pub use builder::SqlStatement;
pub use executor::RelationalExecutor;
pub use mysql::MySqlBackend;
