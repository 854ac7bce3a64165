//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for account records.
//! - Resolve building/room names for customer listings by query-time
//!   join.
//!
//! # Invariants
//! - Write paths call `User::validate()` before SQL mutations.
//! - Deleting a missing user is not an error; the operation reports
//!   whether a row was removed.
//! - Customer listing is deterministic: `username ASC`.

use crate::model::estate::{BuildingId, RoomId};
use crate::model::user::{Role, User, UserId};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    username,
    password_hash,
    password_salt,
    role,
    building_uuid,
    room_uuid
FROM users";

/// Customer read model with resolved assignment names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRecord {
    /// Stable user id.
    pub uuid: UserId,
    /// Login name.
    pub username: String,
    /// Assigned building id, when still assigned.
    pub building_uuid: Option<BuildingId>,
    /// Assigned building display name.
    pub building_name: Option<String>,
    /// Assigned room id, when still assigned.
    pub room_uuid: Option<RoomId>,
    /// Assigned room display name.
    pub room_name: Option<String>,
}

/// Repository interface for account persistence.
pub trait UserRepository {
    /// Persists one user record.
    fn insert_user(&self, user: &User) -> RepoResult<()>;
    /// Looks a user up by login name.
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    /// Gets one user by id.
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Lists customer accounts with resolved building/room names.
    fn list_customers(&self) -> RepoResult<Vec<CustomerRecord>>;
    /// Deletes one user by id, returning whether a row existed.
    fn delete_user(&self, id: UserId) -> RepoResult<bool>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;

        self.conn.execute(
            "INSERT INTO users (
                uuid,
                username,
                password_hash,
                password_salt,
                role,
                building_uuid,
                room_uuid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                user.uuid.to_string(),
                user.username.as_str(),
                user.password_hash.as_str(),
                user.password_salt.as_str(),
                role_to_db(user.role),
                user.building_uuid.map(|id| id.to_string()),
                user.room_uuid.map(|id| id.to_string()),
            ],
        )?;

        Ok(())
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE username = ?1;"))?;
        let mut rows = stmt.query([username])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn list_customers(&self) -> RepoResult<Vec<CustomerRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                u.uuid,
                u.username,
                u.building_uuid,
                b.name AS building_name,
                u.room_uuid,
                r.name AS room_name
             FROM users u
             LEFT JOIN buildings b ON b.uuid = u.building_uuid
             LEFT JOIN rooms r ON r.uuid = u.room_uuid
             WHERE u.role = 'customer'
             ORDER BY u.username ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut customers = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            let building_uuid = match row.get::<_, Option<String>>("building_uuid")? {
                Some(text) => Some(parse_uuid(&text, "users.building_uuid")?),
                None => None,
            };
            let room_uuid = match row.get::<_, Option<String>>("room_uuid")? {
                Some(text) => Some(parse_uuid(&text, "users.room_uuid")?),
                None => None,
            };
            customers.push(CustomerRecord {
                uuid: parse_uuid(&uuid_text, "users.uuid")?,
                username: row.get("username")?,
                building_uuid,
                building_name: row.get("building_name")?,
                room_uuid,
                room_name: row.get("room_name")?,
            });
        }
        Ok(customers)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid_text: String = row.get("uuid")?;
    let role_text: String = row.get("role")?;
    let role = parse_role(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in users.role"))
    })?;
    let building_uuid = match row.get::<_, Option<String>>("building_uuid")? {
        Some(text) => Some(parse_uuid(&text, "users.building_uuid")?),
        None => None,
    };
    let room_uuid = match row.get::<_, Option<String>>("room_uuid")? {
        Some(text) => Some(parse_uuid(&text, "users.room_uuid")?),
        None => None,
    };

    let user = User {
        uuid: parse_uuid(&uuid_text, "users.uuid")?,
        username: row.get("username")?,
        password_hash: row.get("password_hash")?,
        password_salt: row.get("password_salt")?,
        role,
        building_uuid,
        room_uuid,
    };
    user.validate()?;
    Ok(user)
}

fn role_to_db(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin",
        Role::Customer => "customer",
    }
}

fn parse_role(value: &str) -> Option<Role> {
    match value {
        "admin" => Some(Role::Admin),
        "customer" => Some(Role::Customer),
        _ => None,
    }
}
