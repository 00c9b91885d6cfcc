// handlers/protected/utils.rs - Loaders and scoping shared by protected handlers

use crate::access::{list_scope, Actor, ListScope};
use crate::database::models::{Campaign, Content, Organization, Recommendation, User};
use crate::database::UnitOfWork;
use crate::error::ApiError;

pub async fn load_user(uow: &mut dyn UnitOfWork, id: i64) -> Result<User, ApiError> {
    uow.user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

pub async fn load_organization(uow: &mut dyn UnitOfWork, id: i64) -> Result<Organization, ApiError> {
    uow.organization_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Organization not found"))
}

pub async fn load_campaign(uow: &mut dyn UnitOfWork, id: i64) -> Result<Campaign, ApiError> {
    uow.campaign_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Campaign not found"))
}

pub async fn load_recommendation(uow: &mut dyn UnitOfWork, id: i64) -> Result<Recommendation, ApiError> {
    uow.recommendation_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recommendation not found"))
}

/// Loads and locks a recommendation for the rest of the unit of work
pub async fn lock_recommendation(uow: &mut dyn UnitOfWork, id: i64) -> Result<Recommendation, ApiError> {
    uow.recommendation_for_update(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recommendation not found"))
}

pub async fn load_content(uow: &mut dyn UnitOfWork, id: i64) -> Result<Content, ApiError> {
    uow.content_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Content not found"))
}

pub async fn lock_content(uow: &mut dyn UnitOfWork, id: i64) -> Result<Content, ApiError> {
    uow.content_for_update(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Content not found"))
}

/// Narrows a requested organization filter to the caller's tenant.
/// `None` means the listing is empty for this caller.
pub fn scoped_organization(actor: &Actor, requested: Option<i64>) -> Option<Option<i64>> {
    match list_scope(actor) {
        ListScope::All => Some(requested),
        ListScope::Organization(own) => match requested {
            Some(other) if other != own => None,
            _ => Some(Some(own)),
        },
        ListScope::Nothing => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn actor(role: Role, organization_id: Option<i64>) -> Actor {
        Actor {
            id: 1,
            role,
            organization_id,
            is_active: true,
        }
    }

    #[test]
    fn scoping_never_widens_a_tenant() {
        let admin = actor(Role::SuperAdmin, None);
        assert_eq!(scoped_organization(&admin, None), Some(None));
        assert_eq!(scoped_organization(&admin, Some(9)), Some(Some(9)));

        let member = actor(Role::Analyst, Some(7));
        assert_eq!(scoped_organization(&member, None), Some(Some(7)));
        assert_eq!(scoped_organization(&member, Some(7)), Some(Some(7)));
        assert_eq!(scoped_organization(&member, Some(9)), None);

        let stray = actor(Role::Viewer, None);
        assert_eq!(scoped_organization(&stray, None), None);
    }
}
