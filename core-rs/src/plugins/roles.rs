//! Role loader
//!
//! roles.yaml:
//!
//! ```yaml
//! roles:
//!   - name: owner
//!     members: [123456789, "@lordsaurus"]
//!     commands: ["*"]
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{BootError, Result};
use crate::plugins::loader::{normalize_command, PluginManifest};

/// A role member: numeric user id or `@username`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleMember {
    Id(i64),
    Username(String),
}

impl RoleMember {
    pub fn matches(&self, user_id: Option<i64>, username: Option<&str>) -> bool {
        match self {
            RoleMember::Id(id) => user_id == Some(*id),
            RoleMember::Username(name) => {
                if let Ok(id) = name.trim().parse::<i64>() {
                    return user_id == Some(id);
                }
                let wanted = name.trim().trim_start_matches('@');
                username.is_some_and(|actual| actual.eq_ignore_ascii_case(wanted))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub members: Vec<RoleMember>,
    /// Commands this role may run; empty or `*` means all
    #[serde(default)]
    pub commands: Vec<String>,
}

impl Role {
    pub fn has_member(&self, user_id: Option<i64>, username: Option<&str>) -> bool {
        self.members.iter().any(|member| member.matches(user_id, username))
    }

    pub fn permits(&self, command: &str) -> bool {
        if self.commands.is_empty() {
            return true;
        }
        let command = normalize_command(command);
        self.commands
            .iter()
            .any(|allowed| allowed.trim() == "*" || normalize_command(allowed) == command)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RoleFile {
    #[serde(default)]
    roles: Vec<Role>,
}

/// Roles loaded at boot
#[derive(Debug, Clone, Default)]
pub struct RoleBook {
    roles: Vec<Role>,
}

impl RoleBook {
    pub fn from_roles(roles: Vec<Role>) -> Result<Self> {
        let mut seen = HashSet::new();
        for role in &roles {
            if role.name.trim().is_empty() {
                return Err(BootError::Role("role name cannot be empty".to_string()));
            }
            if !seen.insert(role.name.as_str()) {
                return Err(BootError::Role(format!("duplicate role '{}'", role.name)));
            }
        }
        Ok(Self { roles })
    }

    /// Load roles.yaml. A missing file yields an empty role book.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(file = %path.display(), "role file not found, no roles loaded");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let file: RoleFile = serde_yaml::from_str(&content)
            .map_err(|e| BootError::Role(format!("{}: {}", path.display(), e)))?;
        let book = Self::from_roles(file.roles)?;
        info!(count = book.len(), "roles loaded");
        Ok(book)
    }

    pub fn role(&self, name: &str) -> Option<&Role> {
        self.roles.iter().find(|role| role.name == name)
    }

    /// Whether the user may run `plugin`. Unrestricted plugins are open to
    /// everyone; restricted ones need membership in a role that permits the
    /// command. An unknown role admits nobody.
    pub fn allows(&self, user_id: Option<i64>, username: Option<&str>, plugin: &PluginManifest) -> bool {
        let Some(required) = plugin.role.as_deref() else {
            return true;
        };
        self.role(required)
            .is_some_and(|role| role.has_member(user_id, username) && role.permits(&plugin.command))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
