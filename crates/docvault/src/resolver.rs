//! The access-control resolver.
//!
//! One decision function answers every authorization question in the system:
//! "does this principal hold at least this level on this document?". The
//! resolver reads the business registry and the permission table and never
//! mutates anything.
//!
//! The owner bypass comes first: the business owner satisfies every check
//! unconditionally, independent of document existence and of any stored
//! grant row. Document existence is deliberately NOT checked here; mutating
//! operations pair the resolver with their own existence check.

use docvault_core::{DocId, PermissionLevel, PrincipalId, TenantId};
use docvault_store::{Result, Store};

/// Decide whether `principal` holds at least `required` on (tenant, doc).
///
/// Unknown tenants resolve to false; this function never fails on missing
/// keys (only on substrate errors).
pub async fn authorize<S: Store>(
    store: &S,
    tenant: &TenantId,
    doc: &DocId,
    principal: &PrincipalId,
    required: PermissionLevel,
) -> Result<bool> {
    let business = match store.get_business(tenant).await? {
        Some(business) => business,
        None => return Ok(false),
    };

    if business.owner == *principal {
        return Ok(true);
    }

    match store.get_grant(tenant, doc, principal).await? {
        Some(grant) => Ok(grant.level.satisfies(required)),
        None => Ok(false),
    }
}

/// The effective level `principal` holds on (tenant, doc).
///
/// Owner for the business owner, the stored grant level otherwise, and
/// [`PermissionLevel::None`] as the universal fallback, including for
/// unknown tenants.
pub async fn current_level<S: Store>(
    store: &S,
    tenant: &TenantId,
    doc: &DocId,
    principal: &PrincipalId,
) -> Result<PermissionLevel> {
    match store.get_business(tenant).await? {
        None => Ok(PermissionLevel::None),
        Some(business) if business.owner == *principal => Ok(PermissionLevel::Owner),
        Some(_) => Ok(store
            .get_grant(tenant, doc, principal)
            .await?
            .map(|grant| grant.level)
            .unwrap_or(PermissionLevel::None)),
    }
}
