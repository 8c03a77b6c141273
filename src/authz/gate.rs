use std::fmt;
use std::marker::PhantomData;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::principal::Caller;
use super::{roles_with, Capability, Role};
use crate::app::AppState;
use crate::errors::AppError;
use crate::jwt::resolve_caller;

/// Reason a request was turned away by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    Forbidden {
        capability: Capability,
        required: Vec<Role>,
    },
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::Unauthenticated => f.write_str("Unauthenticated"),
            Denial::Forbidden { required, .. } => {
                let names: Vec<&str> = required.iter().map(Role::as_str).collect();
                write!(f, "Unauthorized. Required role: {}", names.join(" or "))
            }
        }
    }
}

impl std::error::Error for Denial {}

/// Checks `caller` against `capability`. Pure; no side effects on allow.
pub fn authorize(caller: Option<&Caller>, capability: Capability) -> Result<&Caller, Denial> {
    let caller = caller.ok_or(Denial::Unauthenticated)?;
    if caller.can(capability) {
        Ok(caller)
    } else {
        Err(Denial::Forbidden {
            capability,
            required: roles_with(capability),
        })
    }
}

/// Type-level capability requirement for [`Authorized`].
pub trait Requirement: Send + Sync + 'static {
    const CAPABILITY: Capability;
}

pub struct CanCreate;
pub struct CanEdit;
pub struct CanDelete;
pub struct CanManageUsers;

impl Requirement for CanCreate {
    const CAPABILITY: Capability = Capability::Create;
}

impl Requirement for CanEdit {
    const CAPABILITY: Capability = Capability::Edit;
}

impl Requirement for CanDelete {
    const CAPABILITY: Capability = Capability::Delete;
}

impl Requirement for CanManageUsers {
    const CAPABILITY: Capability = Capability::ManageUsers;
}

/// Extractor that only yields when the caller holds `R::CAPABILITY`.
///
/// Runs from request parts, so a denied request never has its body parsed.
pub struct Authorized<R: Requirement> {
    pub caller: Caller,
    requirement: PhantomData<fn() -> R>,
}

#[async_trait]
impl<R: Requirement> FromRequestParts<AppState> for Authorized<R> {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let caller = resolve_caller(parts, state).await?;

        match authorize(caller.as_ref(), R::CAPABILITY) {
            Ok(caller) => {
                tracing::debug!(
                    user_id = caller.user_id,
                    role = caller.role.as_str(),
                    capability = R::CAPABILITY.as_str(),
                    "gate allowed"
                );
                Ok(Self {
                    caller: caller.clone(),
                    requirement: PhantomData,
                })
            }
            Err(denial) => {
                tracing::warn!(
                    path = %parts.uri.path(),
                    capability = R::CAPABILITY.as_str(),
                    role = caller.as_ref().map(|c| c.role.as_str()),
                    "gate denied: {denial}"
                );
                Err(denial.into())
            }
        }
    }
}
