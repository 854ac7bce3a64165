//! Estate read use-cases.
//!
//! # Responsibility
//! - Expose the nested buildings/rooms/tickets view.
//! - Scope the view through the access gate for non-admin callers.

use crate::access;
use crate::model::user::User;
use crate::repo::estate_repo::{BuildingOverview, EstateRepository};
use crate::service::ServiceResult;

/// Use-case service for estate views.
pub struct EstateService<R: EstateRepository> {
    repo: R,
}

impl<R: EstateRepository> EstateService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists all buildings with nested rooms and tickets.
    pub fn list_buildings(&self) -> ServiceResult<Vec<BuildingOverview>> {
        Ok(self.repo.list_overviews()?)
    }

    /// Lists the buildings visible to `user`.
    pub fn list_buildings_for(&self, user: &User) -> ServiceResult<Vec<BuildingOverview>> {
        let estate = self.repo.list_overviews()?;
        Ok(access::scoped_view(user, &estate))
    }
}
