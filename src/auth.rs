use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Authorization Guard
// ============================================================================
//
// Each endpoint declares what it needs in `Endpoint::required_access`;
// `authorize` is evaluated by the `Shop` facade before any workflow runs.
// Authentication itself (token issuance and validation) happens upstream.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Customer,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => f.write_str("CUSTOMER"),
            Role::Admin => f.write_str("ADMIN"),
        }
    }
}

/// The caller, as established by the authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

impl CurrentUser {
    pub fn customer(id: Uuid) -> Self {
        Self { id, role: Role::Customer }
    }

    pub fn admin(id: Uuid) -> Self {
        Self { id, role: Role::Admin }
    }

    pub fn has_role(&self, role: Role) -> bool {
        match role {
            Role::Customer => true,
            Role::Admin => self.role == Role::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Role(Role),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ListProducts,
    CreateProduct,
    CreateOrder,
    ListOrders,
    GetOrderDetail,
    CheckoutOrder,
    CancelOrder,
}

impl Endpoint {
    pub fn required_access(self) -> Access {
        match self {
            Endpoint::ListProducts => Access::Public,
            Endpoint::CreateProduct => Access::Role(Role::Admin),
            Endpoint::CreateOrder
            | Endpoint::ListOrders
            | Endpoint::GetOrderDetail
            | Endpoint::CheckoutOrder
            | Endpoint::CancelOrder => Access::Authenticated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Role {0} required")]
    Forbidden(Role),
}

/// Check `user` against what `endpoint` requires.
pub fn authorize(endpoint: Endpoint, user: Option<&CurrentUser>) -> Result<(), AuthError> {
    match (endpoint.required_access(), user) {
        (Access::Public, _) => Ok(()),
        (_, None) => Err(AuthError::Unauthenticated),
        (Access::Authenticated, Some(_)) => Ok(()),
        (Access::Role(role), Some(user)) if user.has_role(role) => Ok(()),
        (Access::Role(role), Some(_)) => Err(AuthError::Forbidden(role)),
    }
}

/// Like `authorize`, for endpoints that need to know who is calling.
pub fn require_user(endpoint: Endpoint, user: Option<&CurrentUser>) -> Result<CurrentUser, AuthError> {
    authorize(endpoint, user)?;
    user.copied().ok_or(AuthError::Unauthenticated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_endpoint_allows_anonymous() {
        assert_eq!(authorize(Endpoint::ListProducts, None), Ok(()));
    }

    #[test]
    fn test_anonymous_caller_is_unauthenticated() {
        for endpoint in [Endpoint::CreateOrder, Endpoint::CheckoutOrder, Endpoint::CreateProduct] {
            assert_eq!(authorize(endpoint, None), Err(AuthError::Unauthenticated));
        }
    }

    #[test]
    fn test_customer_cannot_create_products() {
        let customer = CurrentUser::customer(Uuid::new_v4());
        assert_eq!(
            authorize(Endpoint::CreateProduct, Some(&customer)),
            Err(AuthError::Forbidden(Role::Admin))
        );
        assert_eq!(authorize(Endpoint::CheckoutOrder, Some(&customer)), Ok(()));
    }

    #[test]
    fn test_admin_passes_every_guard() {
        let admin = CurrentUser::admin(Uuid::new_v4());
        for endpoint in [
            Endpoint::ListProducts,
            Endpoint::CreateProduct,
            Endpoint::CreateOrder,
            Endpoint::ListOrders,
            Endpoint::GetOrderDetail,
            Endpoint::CheckoutOrder,
            Endpoint::CancelOrder,
        ] {
            assert_eq!(authorize(endpoint, Some(&admin)), Ok(()));
        }
    }

    #[test]
    fn test_require_user_returns_caller() {
        let customer = CurrentUser::customer(Uuid::new_v4());
        assert_eq!(require_user(Endpoint::ListOrders, Some(&customer)), Ok(customer));
        assert_eq!(require_user(Endpoint::ListOrders, None), Err(AuthError::Unauthenticated));
    }
}
