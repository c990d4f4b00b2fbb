use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::workforce::{EmployeeId, OrganizationId};

pub const ORGANIZATION_HEADER: &str = "x-organization-id";
pub const ROLE_HEADER: &str = "x-principal-role";
pub const EMPLOYEE_HEADER: &str = "x-employee-id";

/// Authenticated caller, tagged with what it may do. Issued by the upstream
/// gateway; this service only reads the forwarded identity headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Admin {
        organization_id: OrganizationId,
    },
    Employee {
        organization_id: OrganizationId,
        employee_id: EmployeeId,
    },
}

impl Principal {
    pub fn admin(organization_id: impl Into<String>) -> Self {
        Self::Admin {
            organization_id: OrganizationId(organization_id.into()),
        }
    }

    pub fn employee(organization_id: impl Into<String>, employee_id: impl Into<String>) -> Self {
        Self::Employee {
            organization_id: OrganizationId(organization_id.into()),
            employee_id: EmployeeId(employee_id.into()),
        }
    }

    pub fn organization_id(&self) -> &OrganizationId {
        match self {
            Principal::Admin { organization_id } | Principal::Employee { organization_id, .. } => {
                organization_id
            }
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Principal::Admin { .. })
    }

    /// Admins see everyone in their organization; employees only themselves.
    pub fn can_view_employee(&self, employee: &EmployeeId) -> bool {
        match self {
            Principal::Admin { .. } => true,
            Principal::Employee { employee_id, .. } => employee_id == employee,
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Result<Self, PrincipalRejection> {
        let organization_id = header_value(headers, ORGANIZATION_HEADER)?;
        let role = header_value(headers, ROLE_HEADER)?;

        match role.to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::admin(organization_id)),
            "employee" => {
                let employee_id = header_value(headers, EMPLOYEE_HEADER)?;
                Ok(Self::employee(organization_id, employee_id))
            }
            _ => Err(PrincipalRejection::UnknownRole(role)),
        }
    }
}

fn header_value(headers: &HeaderMap, name: &'static str) -> Result<String, PrincipalRejection> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(PrincipalRejection::MissingHeader(name))
}

#[derive(Debug, thiserror::Error)]
pub enum PrincipalRejection {
    #[error("missing or invalid {0} header")]
    MissingHeader(&'static str),
    #[error("unknown principal role '{0}'")]
    UnknownRole(String),
}

impl IntoResponse for PrincipalRejection {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = PrincipalRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Principal::from_headers(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn admin_headers_produce_admin_principal() {
        let principal =
            Principal::from_headers(&headers(&[(ORGANIZATION_HEADER, "acme"), (ROLE_HEADER, "Admin")]))
                .expect("admin parses");
        assert_eq!(principal, Principal::admin("acme"));
        assert!(principal.can_view_employee(&EmployeeId("anyone".to_string())));
    }

    #[test]
    fn employee_requires_employee_header() {
        let err = Principal::from_headers(&headers(&[
            (ORGANIZATION_HEADER, "acme"),
            (ROLE_HEADER, "employee"),
        ]))
        .expect_err("employee id required");
        assert!(matches!(err, PrincipalRejection::MissingHeader(EMPLOYEE_HEADER)));

        let principal = Principal::from_headers(&headers(&[
            (ORGANIZATION_HEADER, "acme"),
            (ROLE_HEADER, "employee"),
            (EMPLOYEE_HEADER, "ada"),
        ]))
        .expect("employee parses");
        assert!(principal.can_view_employee(&EmployeeId("ada".to_string())));
        assert!(!principal.can_view_employee(&EmployeeId("grace".to_string())));
        assert!(!principal.is_admin());
    }

    #[test]
    fn unknown_roles_are_rejected() {
        let err = Principal::from_headers(&headers(&[
            (ORGANIZATION_HEADER, "acme"),
            (ROLE_HEADER, "superuser"),
        ]))
        .expect_err("role rejected");
        assert!(matches!(err, PrincipalRejection::UnknownRole(role) if role == "superuser"));
    }
}
