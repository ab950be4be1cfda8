// crates/spinnaker-provider-core/src/core/permissions.rs
// ============================================================================
// Module: Permission Matrix
// Description: Role-indexed and action-indexed access-control documents.
// Purpose: Convert between the authored and the remote permission layouts.
// Dependencies: indexmap, serde, thiserror
// ============================================================================

//! ## Overview
//! Applications carry an access-control matrix over three actions. Authors
//! write it role-indexed (`{"role": ["READ", "WRITE"]}`) while the remote
//! service stores it action-indexed (`{"READ": ["role"]}`). Both layouts are
//! transient views of the same set of `(role, action)` grants; the codec here
//! derives one from the other.
//!
//! Encoding keeps duplicate roles as authored. Decoding collapses duplicate
//! actions per role.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::tree::ConfigTree;
use crate::core::tree::Kind;

// ============================================================================
// SECTION: Actions
// ============================================================================

/// Permission action granted to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// Read access.
    Read,
    /// Write access.
    Write,
    /// Pipeline execution access.
    Execute,
}

impl Action {
    /// All actions in canonical order.
    pub const ALL: [Self; 3] = [Self::Read, Self::Write, Self::Execute];

    /// Returns the wire label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Execute => "EXECUTE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = PermissionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "READ" => Ok(Self::Read),
            "WRITE" => Ok(Self::Write),
            "EXECUTE" => Ok(Self::Execute),
            other => Err(PermissionError::InvalidAction(other.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Permission document errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    /// An action outside READ, WRITE, EXECUTE was found.
    #[error("invalid permission action: {0}")]
    InvalidAction(String),
    /// The document does not have the expected layout.
    #[error("malformed permission document at {path}: expected {expected}, found {found}")]
    Malformed {
        /// Location of the offending node.
        path: String,
        /// Expected node kind.
        expected: Kind,
        /// Kind actually found.
        found: Kind,
    },
}

// ============================================================================
// SECTION: Role-Indexed Layout
// ============================================================================

/// Permissions keyed by role, as authored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleIndexed(IndexMap<String, Vec<Action>>);

impl RoleIndexed {
    /// Creates an empty matrix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `action` to the grants of `role`.
    pub fn grant(&mut self, role: impl Into<String>, action: Action) {
        self.0.entry(role.into()).or_default().push(action);
    }

    /// Returns the actions granted to `role`.
    #[must_use]
    pub fn actions(&self, role: &str) -> Option<&[Action]> {
        self.0.get(role).map(Vec::as_slice)
    }

    /// Iterates roles with their granted actions.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Action])> {
        self.0.iter().map(|(role, actions)| (role.as_str(), actions.as_slice()))
    }

    /// Returns true when no role is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the set of `(role, action)` grants.
    #[must_use]
    pub fn pairs(&self) -> BTreeSet<(String, Action)> {
        self.iter()
            .flat_map(|(role, actions)| actions.iter().map(move |action| (role.to_string(), *action)))
            .collect()
    }

    /// Reads a role-indexed document.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::InvalidAction`] for unknown actions and
    /// [`PermissionError::Malformed`] for layout errors.
    pub fn from_tree(tree: &ConfigTree) -> Result<Self, PermissionError> {
        let mut matrix = Self::new();
        for (role, values) in entries(tree, "permissions")? {
            let path = format!("permissions.{role}");
            let slot = matrix.0.entry(role.clone()).or_default();
            for label in strings(values, &path)? {
                slot.push(label.parse()?);
            }
        }
        Ok(matrix)
    }

    /// Renders the document layout.
    #[must_use]
    pub fn to_tree(&self) -> ConfigTree {
        ConfigTree::map(self.iter().map(|(role, actions)| {
            (role, ConfigTree::list(actions.iter().map(|action| ConfigTree::from(action.as_str()))))
        }))
    }

    /// Converts to the action-indexed layout.
    ///
    /// Each role is appended to the list of every action it holds, so roles
    /// listed twice stay listed twice.
    #[must_use]
    pub fn to_action_indexed(&self) -> ActionIndexed {
        let mut indexed = ActionIndexed::new();
        for (role, actions) in self.iter() {
            for action in actions {
                indexed.0.entry(*action).or_default().push(role.to_string());
            }
        }
        indexed
    }
}

impl<R: Into<String>> FromIterator<(R, Vec<Action>)> for RoleIndexed {
    fn from_iter<T: IntoIterator<Item = (R, Vec<Action>)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(role, actions)| (role.into(), actions)).collect())
    }
}

// ============================================================================
// SECTION: Action-Indexed Layout
// ============================================================================

/// Permissions keyed by action, as stored remotely.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionIndexed(IndexMap<Action, Vec<String>>);

impl ActionIndexed {
    /// Creates an empty matrix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the roles holding `action`.
    #[must_use]
    pub fn roles(&self, action: Action) -> Option<&[String]> {
        self.0.get(&action).map(Vec::as_slice)
    }

    /// Iterates actions with their roles.
    pub fn iter(&self) -> impl Iterator<Item = (Action, &[String])> {
        self.0.iter().map(|(action, roles)| (*action, roles.as_slice()))
    }

    /// Returns true when no action is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the set of `(role, action)` grants.
    #[must_use]
    pub fn pairs(&self) -> BTreeSet<(String, Action)> {
        self.iter().flat_map(|(action, roles)| roles.iter().map(move |role| (role.clone(), action))).collect()
    }

    /// Reads an action-indexed document.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::InvalidAction`] for unknown action keys and
    /// [`PermissionError::Malformed`] for layout errors.
    pub fn from_tree(tree: &ConfigTree) -> Result<Self, PermissionError> {
        let mut matrix = Self::new();
        for (label, values) in entries(tree, "permissions")? {
            let action: Action = label.parse()?;
            let path = format!("permissions.{label}");
            let slot = matrix.0.entry(action).or_default();
            slot.extend(strings(values, &path)?.into_iter().map(str::to_string));
        }
        Ok(matrix)
    }

    /// Renders the document layout.
    #[must_use]
    pub fn to_tree(&self) -> ConfigTree {
        ConfigTree::map(self.iter().map(|(action, roles)| {
            (action.as_str(), ConfigTree::list(roles.iter().map(|role| ConfigTree::from(role.as_str()))))
        }))
    }

    /// Converts to the role-indexed layout, collapsing duplicate actions.
    #[must_use]
    pub fn to_role_indexed(&self) -> RoleIndexed {
        let mut indexed = RoleIndexed::new();
        for (action, roles) in self.iter() {
            for role in roles {
                let slot = indexed.0.entry(role.clone()).or_default();
                if !slot.contains(&action) {
                    slot.push(action);
                }
            }
        }
        indexed
    }
}

impl<R: Into<String>> FromIterator<(Action, Vec<R>)> for ActionIndexed {
    fn from_iter<T: IntoIterator<Item = (Action, Vec<R>)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(action, roles)| (action, roles.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }
}

// ============================================================================
// SECTION: Document Helpers
// ============================================================================

/// Returns the entries of a map node or a layout error.
fn entries<'a>(
    tree: &'a ConfigTree,
    path: &str,
) -> Result<&'a IndexMap<String, ConfigTree>, PermissionError> {
    tree.as_map().ok_or_else(|| PermissionError::Malformed {
        path: path.to_string(),
        expected: Kind::Map,
        found: tree.kind(),
    })
}

/// Returns the string items of a list node or a layout error.
fn strings<'a>(tree: &'a ConfigTree, path: &str) -> Result<Vec<&'a str>, PermissionError> {
    let items = tree.as_list().ok_or_else(|| PermissionError::Malformed {
        path: path.to_string(),
        expected: Kind::List,
        found: tree.kind(),
    })?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str().ok_or_else(|| PermissionError::Malformed {
                path: format!("{path}[{index}]"),
                expected: Kind::String,
                found: item.kind(),
            })
        })
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
