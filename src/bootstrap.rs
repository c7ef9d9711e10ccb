//! Schema bootstrap and admin seeding.
//!
//! Runs once per process, triggered by the first incoming request (see
//! `middleware::bootstrap`). Optionally drops all tables first, creates
//! the schema, then seeds one administrative account. A uniqueness
//! violation on the seed insert (re-run against a populated database
//! without the drop) is not caught here; it fails the triggering request.

use diesel::connection::SimpleConnection;
use tracing::info;

use crate::auth::password::PasswordService;
use crate::config::BootstrapConfig;
use crate::datastore;
use crate::DbPool;

pub const CREATE_SCHEMA_SQL: &str = "\
CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    password VARCHAR(255) NOT NULL,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    confirmed_at TIMESTAMP
);
CREATE TABLE IF NOT EXISTS roles (
    id SERIAL PRIMARY KEY,
    name VARCHAR(80) NOT NULL UNIQUE,
    description VARCHAR(255)
);
CREATE TABLE IF NOT EXISTS roles_users (
    user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
    role_id INTEGER NOT NULL REFERENCES roles (id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, role_id)
);";

pub const DROP_SCHEMA_SQL: &str = "DROP TABLE IF EXISTS roles_users, users, roles;";

#[derive(Debug)]
pub enum BootstrapError {
    Pool(diesel::r2d2::PoolError),
    Schema(diesel::result::Error),
    Hash(argon2::password_hash::Error),
    Seed(diesel::result::Error),
}

impl std::fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BootstrapError::Pool(e) => write!(f, "Failed to get database connection: {}", e),
            BootstrapError::Schema(e) => write!(f, "Failed to create schema: {}", e),
            BootstrapError::Hash(e) => write!(f, "Failed to hash seed password: {}", e),
            BootstrapError::Seed(e) => write!(f, "Failed to seed admin user: {}", e),
        }
    }
}

impl std::error::Error for BootstrapError {}

/// Creates (or recreates) the schema and inserts the admin account.
pub fn run(
    pool: &DbPool,
    passwords: &PasswordService,
    config: &BootstrapConfig,
) -> Result<(), BootstrapError> {
    let mut conn = pool.get().map_err(BootstrapError::Pool)?;

    if config.recreate_schema {
        conn.batch_execute(DROP_SCHEMA_SQL)
            .map_err(BootstrapError::Schema)?;
        info!("Dropped existing tables");
    }

    conn.batch_execute(CREATE_SCHEMA_SQL)
        .map_err(BootstrapError::Schema)?;

    let password_hash = passwords
        .hash(&config.admin_password)
        .map_err(BootstrapError::Hash)?;

    let user = datastore::create_user(&mut conn, &config.admin_email, &password_hash, true)
        .map_err(BootstrapError::Seed)?;

    info!(user_id = %user.id, email = %user.email, "Seeded admin user");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_schema_covers_all_tables() {
        for table in ["users", "roles", "roles_users"] {
            assert!(
                CREATE_SCHEMA_SQL.contains(&format!("CREATE TABLE IF NOT EXISTS {}", table)),
                "missing table {}",
                table
            );
        }
    }

    #[test]
    fn test_association_cascades_on_delete() {
        assert_eq!(CREATE_SCHEMA_SQL.matches("ON DELETE CASCADE").count(), 2);
    }

    #[test]
    fn test_drop_covers_all_tables() {
        for table in ["roles_users", "users", "roles"] {
            assert!(DROP_SCHEMA_SQL.contains(table), "missing table {}", table);
        }
    }
}
