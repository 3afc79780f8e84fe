//! Wire types for the authentication endpoints

use serde::{Deserialize, Serialize};

/// Account role as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Vendedor,
    Cliente,
    /// Roles added server-side after this client was built.
    #[serde(other)]
    Other,
}

/// Authenticated account (`auth/me/`, login response).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub nombre: String,
    pub apellido: String,
    #[serde(default)]
    pub full_name: String,
    pub rol: UserRole,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    /// Price list assigned to customer accounts.
    #[serde(default)]
    pub lista_precio: Option<u64>,
    #[serde(default)]
    pub lista_precio_nombre: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub date_joined: String,
}

fn default_true() -> bool {
    true
}

/// Body of `POST auth/login/`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Answer of `POST auth/login/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub access: String,
    pub refresh: String,
}

/// Body of `POST auth/refresh/`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Answer of `POST auth/refresh/`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_with_optional_fields_missing() {
        let user: User = serde_json::from_value(json!({
            "id": 4,
            "email": "ana@tetu.py",
            "nombre": "Ana",
            "apellido": "Benítez",
            "rol": "vendedor"
        }))
        .unwrap();
        assert_eq!(user.rol, UserRole::Vendedor);
        assert!(user.is_active);
        assert_eq!(user.telefono, None);
    }

    #[test]
    fn unknown_role_is_tolerated() {
        let rol: UserRole = serde_json::from_value(json!("transportista")).unwrap();
        assert_eq!(rol, UserRole::Other);
    }
}
