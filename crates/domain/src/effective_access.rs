//! Effective permission aggregation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Member, Organization, Role};

/// Role and permission names reachable by one member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveAccess {
    /// Role names in first-seen order.
    pub roles: Vec<String>,
    /// Permission names in first-seen order.
    pub permissions: Vec<String>,
}

impl EffectiveAccess {
    /// Unions the member's direct roles with the roles of every organization
    /// the member belongs to.
    ///
    /// Direct roles are walked first, then organizations in the given order.
    /// Names are deduplicated, keeping their first position.
    #[must_use]
    pub fn aggregate(member: &Member, organizations: &[Organization]) -> Self {
        let mut collector = NameCollector::default();

        collector.add_roles(member.roles());
        for organization in organizations {
            collector.add_roles(organization.roles());
        }

        collector.finish()
    }

    /// Returns whether `permission` is among the aggregated names.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|name| name == permission)
    }
}

#[derive(Default)]
struct NameCollector {
    roles: Vec<String>,
    permissions: Vec<String>,
    seen_roles: HashSet<String>,
    seen_permissions: HashSet<String>,
}

impl NameCollector {
    fn add_roles(&mut self, roles: &[Role]) {
        for role in roles {
            if self.seen_roles.insert(role.name().to_owned()) {
                self.roles.push(role.name().to_owned());
            }

            for permission in role.permissions() {
                if self.seen_permissions.insert(permission.name().to_owned()) {
                    self.permissions.push(permission.name().to_owned());
                }
            }
        }
    }

    fn finish(self) -> EffectiveAccess {
        EffectiveAccess {
            roles: self.roles,
            permissions: self.permissions,
        }
    }
}
