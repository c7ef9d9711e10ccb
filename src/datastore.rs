//! Datastore operations over users and roles.
//!
//! Thin lookup/creation layer shared by the bootstrap seed, the login
//! handler and the admin association endpoints. Column constraints
//! (email and role-name uniqueness) are enforced by the database.

use diesel::prelude::*;

use crate::models::{NewRole, NewRoleUser, NewUser, Role, User};
use crate::schema::{roles, roles_users, users};

pub fn find_user(conn: &mut PgConnection, user_id: i32) -> QueryResult<Option<User>> {
    users::table.find(user_id).first(conn).optional()
}

pub fn find_user_by_email(conn: &mut PgConnection, email: &str) -> QueryResult<Option<User>> {
    users::table
        .filter(users::email.eq(email.to_lowercase()))
        .first(conn)
        .optional()
}

/// Inserts a user with an already-hashed password. Fails with a
/// uniqueness violation if the email is taken.
pub fn create_user(
    conn: &mut PgConnection,
    email: &str,
    password_hash: &str,
    active: bool,
) -> QueryResult<User> {
    diesel::insert_into(users::table)
        .values(&NewUser {
            email: email.to_lowercase(),
            password: password_hash.to_string(),
            active,
        })
        .get_result(conn)
}

pub fn create_role(
    conn: &mut PgConnection,
    name: &str,
    description: Option<String>,
) -> QueryResult<Role> {
    diesel::insert_into(roles::table)
        .values(&NewRole {
            name: name.to_string(),
            description,
        })
        .get_result(conn)
}

pub fn find_role_by_name(conn: &mut PgConnection, name: &str) -> QueryResult<Option<Role>> {
    roles::table
        .filter(roles::name.eq(name))
        .first(conn)
        .optional()
}

/// Attaches a role to a user. Returns the number of rows inserted,
/// which is zero when the association already exists.
pub fn add_role_to_user(conn: &mut PgConnection, user_id: i32, role_id: i32) -> QueryResult<usize> {
    diesel::insert_into(roles_users::table)
        .values(&NewRoleUser { user_id, role_id })
        .on_conflict_do_nothing()
        .execute(conn)
}

pub fn remove_role_from_user(
    conn: &mut PgConnection,
    user_id: i32,
    role_id: i32,
) -> QueryResult<usize> {
    diesel::delete(
        roles_users::table
            .filter(roles_users::user_id.eq(user_id))
            .filter(roles_users::role_id.eq(role_id)),
    )
    .execute(conn)
}

pub fn roles_for_user(conn: &mut PgConnection, user_id: i32) -> QueryResult<Vec<Role>> {
    roles_users::table
        .inner_join(roles::table)
        .filter(roles_users::user_id.eq(user_id))
        .select(Role::as_select())
        .order(roles::name.asc())
        .load(conn)
}
