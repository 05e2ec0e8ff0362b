use crate::config::GrantsConfig;

fn field_matches(granted: &str, required: &str) -> bool {
    granted == "*" || granted == required
}

/// Denial raised by [`Evaluator::enforce`] when no held role carries a
/// matching grant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no grant for action '{action}' on resource '{resource}'")]
pub struct PermissionDenied {
    pub action: String,
    pub resource: String,
}

#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    cfg: GrantsConfig,
}

impl Evaluator {
    pub fn new(cfg: GrantsConfig) -> Self {
        Self { cfg }
    }

    /// True when any grant on any of the caller's roles matches the
    /// action/resource pair. Pure check, no side effects.
    pub fn check(&self, roles: &[String], action: &str, resource: &str) -> bool {
        roles
            .iter()
            .filter_map(|role| self.cfg.roles.get(role))
            .flatten()
            .any(|g| field_matches(&g.action, action) && field_matches(&g.resource, resource))
    }

    pub fn enforce(
        &self,
        roles: &[String],
        action: &str,
        resource: &str,
    ) -> Result<(), PermissionDenied> {
        if self.check(roles, action, resource) {
            Ok(())
        } else {
            Err(PermissionDenied {
                action: action.to_string(),
                resource: resource.to_string(),
            })
        }
    }
}
