use std::collections::HashMap;

/// One permission grant: the action and resource a role is allowed to touch.
/// Either field may be the wildcard `"*"`.
#[derive(Debug, serde::Deserialize, serde::Serialize, Clone, PartialEq, Eq)]
pub struct GrantCfg {
    pub action: String,
    pub resource: String,
}

impl GrantCfg {
    pub fn new(action: &str, resource: &str) -> Self {
        Self {
            action: action.to_string(),
            resource: resource.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct GrantsConfig {
    pub roles: HashMap<String, Vec<GrantCfg>>, // role name -> grants
}

/// Reads the role/grant table from `ROOST_ROLE_GRANTS` (JSON object of
/// role name to grant list). Missing or malformed input yields an empty
/// table, which denies everything.
pub fn load_from_env() -> GrantsConfig {
    let roles = std::env::var("ROOST_ROLE_GRANTS")
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default();
    GrantsConfig { roles }
}

impl GrantsConfig {
    pub fn with_role(mut self, role: &str, grants: Vec<GrantCfg>) -> Self {
        self.roles.insert(role.to_string(), grants);
        self
    }

    /// Conventional superuser table: a single `root` role granted
    /// `("*", "*")`. Used by operator tooling and seeds.
    pub fn root_only() -> Self {
        Self::default().with_role("root", vec![GrantCfg::new("*", "*")])
    }
}
