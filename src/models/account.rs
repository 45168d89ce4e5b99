use serde::{Deserialize, Serialize};

/// Read-only mirror of the authenticated user as the server last reported it.
///
/// Always replaced wholesale on each fetch; never patched field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub tenant_id: Option<i64>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl UserSnapshot {
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

impl std::fmt::Display for UserSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.username)
    }
}

/// Point-in-time view of the credential store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: Option<String>,
    pub user: Option<UserSnapshot>,
}

impl Credential {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() || self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(UserSnapshot::is_admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_tolerates_extra_and_missing_fields() {
        let raw = r#"{"id": 3, "username": "ada", "first_name": "Ada", "profile": {"notes": ""}}"#;
        let u: UserSnapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(u.username, "ada");
        assert_eq!(u.tenant_id, None);
        assert!(!u.is_admin());
    }

    #[test]
    fn authenticated_is_derived() {
        let mut c = Credential::default();
        assert!(!c.is_authenticated());
        c.access_token = Some("t".into());
        assert!(c.is_authenticated());
        c.access_token = None;
        c.user = Some(UserSnapshot {
            id: 1,
            username: "root".into(),
            email: String::new(),
            tenant_id: Some(1),
            is_staff: false,
            is_superuser: true,
        });
        assert!(c.is_authenticated());
        assert!(c.is_admin());
    }
}
