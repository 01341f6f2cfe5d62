//! Authenticated principal and role flags
//!
//! Identities come from a trusted front proxy. The proxy sets the username and
//! group headers; role flags are derived from the groups.

use crate::core::constants::LOCAL_USERNAME;

/// Role flags derived from proxy groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleFlags {
    pub is_admin: bool,
    pub is_encoder: bool,
    pub is_client: bool,
    pub is_superadmin: bool,
}

impl RoleFlags {
    /// Groups are matched case-insensitively. `secretariat` implies admin, encoder
    /// and superadmin.
    pub fn from_groups<S: AsRef<str>>(groups: &[S]) -> Self {
        let mut flags = Self::default();
        for group in groups {
            match group.as_ref().trim().to_ascii_lowercase().as_str() {
                "admin" => flags.is_admin = true,
                "encoder" => flags.is_encoder = true,
                "client" => flags.is_client = true,
                "superuser" => flags.is_superadmin = true,
                "secretariat" => {
                    flags.is_admin = true;
                    flags.is_encoder = true;
                    flags.is_superadmin = true;
                }
                _ => {}
            }
        }
        flags
    }

    /// Reports, catalog, filter options and saved templates
    pub fn can_view_reports(&self) -> bool {
        self.is_admin || self.is_superadmin
    }
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub groups: Vec<String>,
    pub roles: RoleFlags,
}

impl Principal {
    pub fn new(username: impl Into<String>, groups: Vec<String>) -> Self {
        let roles = RoleFlags::from_groups(&groups);
        Self {
            username: username.into(),
            groups,
            roles,
        }
    }

    /// Parse the comma-separated group header
    pub fn from_headers(username: &str, groups_header: Option<&str>) -> Self {
        let groups = groups_header
            .map(|g| {
                g.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        Self::new(username.trim(), groups)
    }

    /// Principal used when authentication is disabled
    pub fn local_superadmin() -> Self {
        Self {
            username: LOCAL_USERNAME.to_string(),
            groups: vec!["secretariat".to_string()],
            roles: RoleFlags {
                is_admin: true,
                is_encoder: true,
                is_client: false,
                is_superadmin: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_flags_from_groups() {
        let flags = RoleFlags::from_groups(&["Admin"]);
        assert!(flags.is_admin);
        assert!(!flags.is_superadmin);
        assert!(flags.can_view_reports());

        let flags = RoleFlags::from_groups(&["secretariat"]);
        assert!(flags.is_admin && flags.is_encoder && flags.is_superadmin);
        assert!(!flags.is_client);

        let flags = RoleFlags::from_groups(&["encoder", "client"]);
        assert!(flags.is_encoder && flags.is_client);
        assert!(!flags.can_view_reports());

        assert!(RoleFlags::from_groups(&["superuser"]).can_view_reports());
        assert_eq!(RoleFlags::from_groups::<&str>(&[]), RoleFlags::default());
    }

    #[test]
    fn test_principal_from_headers() {
        let principal = Principal::from_headers(" jdoe ", Some("client, ,encoder"));
        assert_eq!(principal.username, "jdoe");
        assert_eq!(principal.groups, vec!["client", "encoder"]);
        assert!(principal.roles.is_encoder);

        let principal = Principal::from_headers("jdoe", None);
        assert!(principal.groups.is_empty());
        assert!(!principal.roles.can_view_reports());
    }
}
