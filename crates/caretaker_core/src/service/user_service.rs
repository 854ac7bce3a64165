//! Account management and authentication use-cases.
//!
//! # Responsibility
//! - Authenticate callers against stored salted digests.
//! - Create, list and delete customer accounts, gated by admin role.
//!
//! # Invariants
//! - Authentication failures do not reveal whether the username or the
//!   password was wrong.
//! - Customer creation requires an assignment whose room belongs to the
//!   assigned building.
//! - Account deletion is idempotent.

use crate::access;
use crate::credential;
use crate::model::estate::{BuildingId, RoomId};
use crate::model::user::{Role, User, UserId};
use crate::repo::estate_repo::EstateRepository;
use crate::repo::user_repo::{CustomerRecord, UserRepository};
use crate::service::{ServiceError, ServiceResult};
use log::info;
use uuid::Uuid;

/// Request model for creating a customer account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCustomerRequest {
    /// Unique login name.
    pub username: String,
    /// Plaintext password; hashed before persistence, never stored.
    pub password: String,
    /// Assigned building.
    pub building_uuid: BuildingId,
    /// Assigned room; must belong to `building_uuid`.
    pub room_uuid: RoomId,
}

/// Authenticated caller summary handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    /// Stable user id.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Account role.
    pub role: Role,
    /// Assigned building, when any.
    pub building_uuid: Option<BuildingId>,
    /// Assigned room, when any.
    pub room_uuid: Option<RoomId>,
}

impl UserSummary {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.uuid,
            username: user.username.clone(),
            role: user.role,
            building_uuid: user.building_uuid,
            room_uuid: user.room_uuid,
        }
    }
}

/// Use-case service for accounts and authentication.
pub struct UserService<U: UserRepository, E: EstateRepository> {
    users: U,
    estate: E,
}

impl<U: UserRepository, E: EstateRepository> UserService<U, E> {
    /// Creates a service over user and estate repositories.
    pub fn new(users: U, estate: E) -> Self {
        Self { users, estate }
    }

    /// Authenticates by username/password, returning the caller summary.
    ///
    /// # Errors
    /// - `Unauthorized` on unknown username or wrong password, without
    ///   distinguishing the two.
    pub fn authenticate(&self, username: &str, password: &str) -> ServiceResult<UserSummary> {
        let Some(user) = self.users.find_by_username(username)? else {
            return Err(ServiceError::Unauthorized);
        };
        if !credential::verify_password(password, &user.password_salt, &user.password_hash) {
            return Err(ServiceError::Unauthorized);
        }

        info!(
            "event=auth module=user status=ok user={} role={:?}",
            user.uuid, user.role
        );
        Ok(UserSummary::from_user(&user))
    }

    /// Creates a customer account assigned to a building/room pair.
    ///
    /// # Errors
    /// - `Unauthorized` when `actor` is not an admin.
    /// - `Validation` on empty username/password, duplicate username, or
    ///   an assignment whose room does not belong to the building.
    pub fn create_customer(
        &self,
        actor: &User,
        request: &CreateCustomerRequest,
    ) -> ServiceResult<UserSummary> {
        if !access::can_manage_users(actor) {
            return Err(ServiceError::Unauthorized);
        }

        let username = request.username.trim();
        if username.is_empty() {
            return Err(ServiceError::Validation(
                "username must not be empty".to_string(),
            ));
        }
        if request.password.is_empty() {
            return Err(ServiceError::Validation(
                "password must not be empty".to_string(),
            ));
        }
        if self.users.find_by_username(username)?.is_some() {
            return Err(ServiceError::Validation(format!(
                "username `{username}` is already taken"
            )));
        }

        let room = self
            .estate
            .get_room(request.room_uuid)?
            .ok_or(ServiceError::NotFound {
                entity: "room",
                id: request.room_uuid,
            })?;
        if room.building_uuid != request.building_uuid {
            return Err(ServiceError::Validation(format!(
                "room `{}` does not belong to building `{}`",
                request.room_uuid, request.building_uuid
            )));
        }

        let salt = credential::generate_salt();
        let user = User {
            uuid: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: credential::hash_password(&request.password, &salt),
            password_salt: salt,
            role: Role::Customer,
            building_uuid: Some(request.building_uuid),
            room_uuid: Some(request.room_uuid),
        };
        self.users.insert_user(&user)?;

        info!(
            "event=user_create module=user status=ok user={} building={} room={}",
            user.uuid, request.building_uuid, request.room_uuid
        );
        Ok(UserSummary::from_user(&user))
    }

    /// Lists customer accounts with resolved building/room names.
    ///
    /// # Errors
    /// - `Unauthorized` when `actor` is not an admin.
    pub fn list_customers(&self, actor: &User) -> ServiceResult<Vec<CustomerRecord>> {
        if !access::can_manage_users(actor) {
            return Err(ServiceError::Unauthorized);
        }
        Ok(self.users.list_customers()?)
    }

    /// Deletes an account by id. Succeeds whether or not the account
    /// existed.
    ///
    /// # Errors
    /// - `Unauthorized` when `actor` is not an admin.
    pub fn delete_user(&self, actor: &User, id: UserId) -> ServiceResult<()> {
        if !access::can_manage_users(actor) {
            return Err(ServiceError::Unauthorized);
        }

        let existed = self.users.delete_user(id)?;
        info!(
            "event=user_delete module=user status=ok user={id} existed={existed}"
        );
        Ok(())
    }
}
