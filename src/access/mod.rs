//! Authorization decisions.
//!
//! Every predicate is a pure function of the actor and the fields of the
//! resource that carry ownership. Nothing here touches storage or fails;
//! handlers turn a `false` into [`AccessError::Denied`] via [`ensure`].

use serde::Serialize;

use crate::database::models::{Campaign, User};
use crate::types::Role;

/// The authenticated caller, resolved from a verified token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
    pub organization_id: Option<i64>,
    pub is_active: bool,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            organization_id: user.organization_id,
            is_active: user.is_active,
        }
    }
}

impl Actor {
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    fn member_of(&self, organization_id: i64) -> bool {
        self.organization_id == Some(organization_id)
    }
}

pub const USER_MANAGERS: &[Role] = &[Role::SuperAdmin, Role::OrgAdmin];
pub const CONTENT_APPROVERS: &[Role] = &[Role::SuperAdmin, Role::OrgAdmin, Role::Reviewer];
pub const RECOMMENDATION_REVIEWERS: &[Role] =
    &[Role::SuperAdmin, Role::OrgAdmin, Role::CampaignManager, Role::Reviewer];
pub const CONTENT_CREATORS: &[Role] =
    &[Role::SuperAdmin, Role::OrgAdmin, Role::CampaignManager, Role::ContentCreator];
pub const CONTENT_PUBLISHERS: &[Role] = &[Role::SuperAdmin, Role::OrgAdmin];
pub const METRIC_RECORDERS: &[Role] =
    &[Role::SuperAdmin, Role::OrgAdmin, Role::CampaignManager, Role::Analyst];

pub fn can_access_organization(actor: &Actor, organization_id: i64) -> bool {
    if !actor.is_active {
        return false;
    }
    actor.is_super_admin() || actor.member_of(organization_id)
}

/// Same-tenant rule: having created the campaign grants nothing by itself.
pub fn can_access_campaign(actor: &Actor, campaign: &Campaign) -> bool {
    can_access_organization(actor, campaign.organization_id)
}

pub fn can_edit_campaign(actor: &Actor, campaign: &Campaign) -> bool {
    if !actor.is_active {
        return false;
    }
    match actor.role {
        Role::SuperAdmin => true,
        Role::OrgAdmin => actor.member_of(campaign.organization_id),
        Role::CampaignManager => campaign.created_by == actor.id,
        Role::ContentCreator | Role::Analyst | Role::Reviewer | Role::Viewer => false,
    }
}

/// super_admin, or the org_admin of that organization
pub fn can_edit_organization(actor: &Actor, organization_id: i64) -> bool {
    if !actor.is_active {
        return false;
    }
    match actor.role {
        Role::SuperAdmin => true,
        Role::OrgAdmin => actor.member_of(organization_id),
        _ => false,
    }
}

pub fn can_manage_users(actor: &Actor) -> bool {
    actor.is_active && USER_MANAGERS.contains(&actor.role)
}

pub fn can_approve_content(actor: &Actor) -> bool {
    actor.is_active && CONTENT_APPROVERS.contains(&actor.role)
}

/// Coarse route gate, independent of any resource
pub fn role_required(allowed: &[Role], actor: &Actor) -> bool {
    actor.is_active && allowed.contains(&actor.role)
}

pub fn can_review_recommendation(actor: &Actor, campaign: &Campaign) -> bool {
    can_access_campaign(actor, campaign) && RECOMMENDATION_REVIEWERS.contains(&actor.role)
}

pub fn can_view_user(actor: &Actor, target: &User) -> bool {
    if !actor.is_active {
        return false;
    }
    match actor.role {
        Role::SuperAdmin => true,
        Role::OrgAdmin => actor.id == target.id || same_tenant(actor, target),
        _ => actor.id == target.id,
    }
}

pub fn can_modify_user(actor: &Actor, target: &User) -> bool {
    if !actor.is_active {
        return false;
    }
    actor.id == target.id
        || (can_manage_users(actor) && (actor.is_super_admin() || same_tenant(actor, target)))
}

/// Only a super_admin can grant super_admin
pub fn can_assign_role(actor: &Actor, role: Role) -> bool {
    match role {
        Role::SuperAdmin => actor.is_active && actor.is_super_admin(),
        _ => can_manage_users(actor),
    }
}

fn same_tenant(actor: &Actor, target: &User) -> bool {
    matches!((actor.organization_id, target.organization_id), (Some(a), Some(b)) if a == b)
}

/// Tenant pre-filter applied to every list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    Organization(i64),
    /// No tenant to list from: the result is an empty page
    Nothing,
}

pub fn list_scope(actor: &Actor) -> ListScope {
    if !actor.is_active {
        return ListScope::Nothing;
    }
    match (actor.role, actor.organization_id) {
        (Role::SuperAdmin, _) => ListScope::All,
        (_, Some(org)) => ListScope::Organization(org),
        (_, None) => ListScope::Nothing,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("{0}")]
    Denied(String),

    #[error("{0}")]
    NotFound(String),
}

impl AccessError {
    pub fn denied(message: impl Into<String>) -> Self {
        AccessError::Denied(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AccessError::NotFound(message.into())
    }
}

pub fn ensure(decision: bool, message: &str) -> Result<(), AccessError> {
    if decision {
        Ok(())
    } else {
        Err(AccessError::denied(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CampaignStatus, CampaignType};
    use chrono::Utc;
    use proptest::prelude::*;

    fn actor(id: i64, role: Role, organization_id: Option<i64>) -> Actor {
        Actor {
            id,
            role,
            organization_id,
            is_active: true,
        }
    }

    fn campaign(organization_id: i64, created_by: i64) -> Campaign {
        let now = Utc::now();
        Campaign {
            id: 1,
            name: "Turnout".into(),
            description: None,
            organization_id,
            campaign_type: CampaignType::CivicEducation,
            status: CampaignStatus::Draft,
            start_date: None,
            end_date: None,
            target_audience: None,
            objectives: None,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    fn user(id: i64, organization_id: Option<i64>) -> User {
        let now = Utc::now();
        User {
            id,
            email: format!("u{}@example.com", id),
            password_hash: String::new(),
            full_name: "U".into(),
            role: Role::Viewer,
            organization_id,
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
            last_login: None,
        }
    }

    #[test]
    fn org_admin_in_same_org_can_access_and_edit() {
        let admin = actor(1, Role::OrgAdmin, Some(7));
        let c = campaign(7, 42);
        assert!(can_access_campaign(&admin, &c));
        assert!(can_edit_campaign(&admin, &c));
    }

    #[test]
    fn campaign_manager_who_is_not_creator_cannot_edit() {
        let manager = actor(99, Role::CampaignManager, Some(7));
        let c = campaign(7, 42);
        assert!(can_access_campaign(&manager, &c));
        assert!(!can_edit_campaign(&manager, &c));
    }

    #[test]
    fn viewer_in_other_org_cannot_access() {
        let viewer = actor(5, Role::Viewer, Some(7));
        assert!(!can_access_campaign(&viewer, &campaign(8, 42)));
    }

    #[test]
    fn creator_moved_to_another_org_loses_access() {
        let manager = actor(42, Role::CampaignManager, Some(9));
        let c = campaign(7, 42);
        assert!(!can_access_campaign(&manager, &c));
        assert!(!can_review_recommendation(&manager, &c));
    }

    #[test]
    fn inactive_actor_is_denied_everything() {
        let mut root = actor(1, Role::SuperAdmin, None);
        root.is_active = false;
        let c = campaign(7, 1);
        assert!(!can_access_organization(&root, 7));
        assert!(!can_access_campaign(&root, &c));
        assert!(!can_edit_campaign(&root, &c));
        assert!(!can_manage_users(&root));
        assert!(!can_approve_content(&root));
        assert!(!role_required(&[Role::SuperAdmin], &root));
        assert_eq!(list_scope(&root), ListScope::Nothing);
    }

    #[test]
    fn reviewer_roles() {
        let c = campaign(7, 1);
        assert!(can_review_recommendation(&actor(2, Role::Reviewer, Some(7)), &c));
        assert!(!can_review_recommendation(&actor(3, Role::Analyst, Some(7)), &c));
        assert!(!can_review_recommendation(&actor(4, Role::ContentCreator, Some(7)), &c));
    }

    #[test]
    fn user_visibility() {
        let admin = actor(1, Role::OrgAdmin, Some(7));
        assert!(can_view_user(&admin, &user(2, Some(7))));
        assert!(!can_view_user(&admin, &user(3, Some(8))));
        assert!(!can_view_user(&admin, &user(4, None)));

        let viewer = actor(5, Role::Viewer, Some(7));
        assert!(can_view_user(&viewer, &user(5, Some(7))));
        assert!(!can_view_user(&viewer, &user(2, Some(7))));
    }

    #[test]
    fn user_modification() {
        let admin = actor(1, Role::OrgAdmin, Some(7));
        assert!(can_modify_user(&admin, &user(2, Some(7))));
        assert!(!can_modify_user(&admin, &user(3, Some(8))));
        assert!(can_modify_user(&actor(9, Role::Viewer, None), &user(9, None)));
        assert!(can_modify_user(&actor(1, Role::SuperAdmin, None), &user(3, Some(8))));
    }

    #[test]
    fn only_super_admin_grants_super_admin() {
        let admin = actor(1, Role::OrgAdmin, Some(7));
        assert!(!can_assign_role(&admin, Role::SuperAdmin));
        assert!(can_assign_role(&admin, Role::Reviewer));
        assert!(can_assign_role(&actor(2, Role::SuperAdmin, None), Role::SuperAdmin));
        assert!(!can_assign_role(&actor(3, Role::Viewer, Some(7)), Role::Viewer));
    }

    #[test]
    fn list_scope_by_role() {
        assert_eq!(list_scope(&actor(1, Role::SuperAdmin, Some(3))), ListScope::All);
        assert_eq!(list_scope(&actor(2, Role::Analyst, Some(3))), ListScope::Organization(3));
        assert_eq!(list_scope(&actor(3, Role::OrgAdmin, None)), ListScope::Nothing);
    }

    #[test]
    fn organization_editing() {
        assert!(can_edit_organization(&actor(1, Role::SuperAdmin, None), 7));
        assert!(can_edit_organization(&actor(2, Role::OrgAdmin, Some(7)), 7));
        assert!(!can_edit_organization(&actor(2, Role::OrgAdmin, Some(8)), 7));
        assert!(!can_edit_organization(&actor(3, Role::CampaignManager, Some(7)), 7));
    }

    #[test]
    fn ensure_maps_false_to_denied() {
        assert!(ensure(true, "nope").is_ok());
        assert_eq!(ensure(false, "nope"), Err(AccessError::Denied("nope".into())));
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn super_admin_reaches_every_tenant(
            id in 1i64..1000,
            own_org in prop::option::of(1i64..50),
            target_org in 1i64..50,
            created_by in 1i64..1000,
        ) {
            let root = actor(id, Role::SuperAdmin, own_org);
            prop_assert!(can_access_organization(&root, target_org));
            prop_assert!(can_access_campaign(&root, &campaign(target_org, created_by)));
        }

        #[test]
        fn unaffiliated_non_admins_reach_nothing(
            role in any_role(),
            id in 1i64..1000,
            target_org in 1i64..50,
            created_by in 1i64..1000,
        ) {
            prop_assume!(role != Role::SuperAdmin);
            let a = actor(id, role, None);
            prop_assert!(!can_access_organization(&a, target_org));
            prop_assert!(!can_access_campaign(&a, &campaign(target_org, created_by)));
        }

        #[test]
        fn campaign_manager_edits_only_own_campaigns(
            id in 1i64..1000,
            org in prop::option::of(1i64..50),
            campaign_org in 1i64..50,
            created_by in 1i64..1000,
        ) {
            let manager = actor(id, Role::CampaignManager, org);
            let c = campaign(campaign_org, created_by);
            prop_assert_eq!(can_edit_campaign(&manager, &c), created_by == id);
        }

        #[test]
        fn edit_implies_access_for_non_managers(
            role in any_role(),
            id in 1i64..1000,
            org in prop::option::of(1i64..50),
            campaign_org in 1i64..50,
            created_by in 1i64..1000,
        ) {
            prop_assume!(role != Role::CampaignManager);
            let a = actor(id, role, org);
            let c = campaign(campaign_org, created_by);
            if can_edit_campaign(&a, &c) {
                prop_assert!(can_access_campaign(&a, &c));
            }
        }
    }
}
