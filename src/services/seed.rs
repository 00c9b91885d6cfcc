//! Idempotent bootstrap data: one super_admin and one sample organization.

use serde::Serialize;

use crate::auth::hash_password;
use crate::database::models::{NewOrganization, NewUser};
use crate::database::Store;
use crate::error::ApiError;
use crate::types::{ComplianceStatus, OrganizationType, Role};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const SAMPLE_ORGANIZATION: &str = "Sample Civic Organization";

#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub created: bool,
    pub admin_email: String,
    pub organization_id: Option<i64>,
}

/// Creates the admin and sample organization unless the admin already exists
pub async fn seed(store: &dyn Store) -> Result<SeedReport, ApiError> {
    let mut uow = store.begin().await?;

    if uow.user_by_email(ADMIN_EMAIL).await?.is_some() {
        tracing::info!("Seed skipped: {} already exists", ADMIN_EMAIL);
        return Ok(SeedReport {
            created: false,
            admin_email: ADMIN_EMAIL.to_string(),
            organization_id: None,
        });
    }

    let organization = uow
        .insert_organization(NewOrganization {
            name: SAMPLE_ORGANIZATION.to_string(),
            org_type: OrganizationType::Ngo,
            registration_number: None,
            contact_email: Some("contact@sample-org.example".to_string()),
            contact_phone: None,
            address: None,
            is_active: true,
            compliance_status: ComplianceStatus::Approved,
        })
        .await?;

    uow.insert_user(NewUser {
        email: ADMIN_EMAIL.to_string(),
        password_hash: hash_password(ADMIN_PASSWORD)?,
        full_name: "Admin User".to_string(),
        role: Role::SuperAdmin,
        organization_id: None,
        is_active: true,
        is_verified: true,
    })
    .await?;

    uow.commit().await?;
    tracing::info!("Seeded admin user {} and organization {}", ADMIN_EMAIL, organization.id);

    Ok(SeedReport {
        created: true,
        admin_email: ADMIN_EMAIL.to_string(),
        organization_id: Some(organization.id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    #[tokio::test]
    async fn seeding_twice_is_a_no_op() {
        let store = MemoryStore::new();
        let first = seed(&store).await.unwrap();
        assert!(first.created);
        assert!(first.organization_id.is_some());

        let second = seed(&store).await.unwrap();
        assert!(!second.created);

        let mut uow = store.begin().await.unwrap();
        let admin = uow.user_by_email(ADMIN_EMAIL).await.unwrap().unwrap();
        assert_eq!(admin.role, Role::SuperAdmin);
    }
}
