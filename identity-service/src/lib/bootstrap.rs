use crate::account::models::Role;
use crate::account::ports::RoleRepository;
use crate::errors::IdentityError;

/// Make sure the role granted at registration exists.
///
/// Creates it when missing and returns the stored role either way.
pub async fn ensure_default_role<RR>(roles: &RR, name: &str) -> Result<Role, IdentityError>
where
    RR: RoleRepository + ?Sized,
{
    if let Some(role) = roles.find_by_name(name).await? {
        tracing::debug!(role = %role.name, "Default role present");
        return Ok(role);
    }

    match roles.save(Role::new(name)).await {
        Ok(role) => {
            tracing::info!(role = %role.name, "Default role created");
            Ok(role)
        }
        Err(e) => {
            // Another instance may have created it concurrently
            roles.find_by_name(name).await?.ok_or(e)
        }
    }
}
