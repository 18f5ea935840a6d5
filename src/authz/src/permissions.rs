//! Tenant-defined permission trees and the dotted-path evaluator
//!
//! A custom role's permissions form a nested tree: section → feature →
//! component, to arbitrary depth, with boolean leaves. Tenant admins author
//! these as JSON, so the node type deserializes directly from the stored
//! shape (`true`, `false`, or an object with optional `enabled`/`viewScope`
//! keys and arbitrary child keys).
//!
//! Evaluation is a pure recursive descent over the tree; it never mutates the
//! role and is safe to run concurrently.

use crate::error::{AccessError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node in a custom role's permission tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionNode {
    /// Terminal grant (`true`) or denial (`false`)
    Leaf(bool),

    /// Nested group of permissions (section, feature, component, ...)
    Group(PermissionGroup),
}

impl PermissionNode {
    /// Convenience constructor for a group node
    pub fn group(group: PermissionGroup) -> Self {
        PermissionNode::Group(group)
    }
}

/// A non-leaf permission node
///
/// `enabled` and `viewScope` are reserved keys; every other key is a child
/// node. A group with `enabled` absent is a pure container and is not itself
/// a grantable capability.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PermissionGroup {
    /// Explicit enable/disable flag for this subtree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Scope qualifier (e.g. "department", "all_clinic") narrowing what a
    /// granted permission exposes
    #[serde(rename = "viewScope", skip_serializing_if = "Option::is_none")]
    pub view_scope: Option<String>,

    /// Child nodes keyed by name
    #[serde(flatten)]
    pub children: BTreeMap<String, PermissionNode>,
}

/// Successful permission check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// The capability path that was checked
    pub path: String,

    /// Scope qualifier from the nearest enclosing group that sets one
    #[serde(rename = "viewScope", skip_serializing_if = "Option::is_none")]
    pub view_scope: Option<String>,
}

/// Resolve a dotted capability path against a permission tree.
///
/// The first segment selects a section; remaining segments descend through
/// child nodes. Groups with an explicit `enabled: false` short-circuit the
/// descent. A path ending on a group grants only when that group carries an
/// explicit `enabled: true`.
pub fn evaluate_path(
    permissions: &BTreeMap<String, PermissionNode>,
    path: &str,
) -> Result<PermissionGrant> {
    if path.is_empty() {
        return Err(AccessError::PermissionPathInvalid(
            "Empty permission path".to_string(),
        ));
    }

    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(AccessError::PermissionPathInvalid(format!(
            "Permission path '{path}' contains empty segments"
        )));
    }

    let section_name = segments[0];
    let section = permissions.get(section_name).ok_or_else(|| {
        AccessError::PermissionPathNotFound(format!(
            "Section '{section_name}' not found in permissions"
        ))
    })?;

    let mut view_scope = None;
    match section {
        PermissionNode::Group(group) => {
            if group.enabled == Some(false) {
                return Err(AccessError::PermissionDisabled(format!(
                    "Section '{section_name}' is not enabled"
                )));
            }
            view_scope.clone_from(&group.view_scope);
        }
        PermissionNode::Leaf(false) => {
            return Err(AccessError::PermissionDisabled(format!(
                "Section '{section_name}' is not enabled"
            )));
        }
        PermissionNode::Leaf(true) => {}
    }

    let mut node = section;
    for segment in &segments[1..] {
        let group = match node {
            PermissionNode::Group(group) => group,
            // A leaf reached before the path is exhausted: the path names
            // something the tree does not contain.
            PermissionNode::Leaf(_) => {
                return Err(AccessError::PermissionPathNotFound(format!(
                    "Permission '{path}' not found in permissions"
                )));
            }
        };

        node = group.children.get(*segment).ok_or_else(|| {
            AccessError::PermissionPathNotFound(format!(
                "Permission '{path}' not found in permissions"
            ))
        })?;

        if let PermissionNode::Group(child) = node {
            if child.enabled == Some(false) {
                return Err(AccessError::PermissionDisabled(format!(
                    "Feature '{segment}' is not enabled"
                )));
            }
            if child.view_scope.is_some() {
                view_scope.clone_from(&child.view_scope);
            }
        }
    }

    match node {
        PermissionNode::Leaf(true) => Ok(PermissionGrant {
            path: path.to_string(),
            view_scope,
        }),
        PermissionNode::Leaf(false) => Err(AccessError::PermissionDisabled(format!(
            "Permission '{path}' is disabled"
        ))),
        PermissionNode::Group(group) => {
            if group.enabled == Some(true) {
                Ok(PermissionGrant {
                    path: path.to_string(),
                    view_scope,
                })
            } else {
                Err(AccessError::PermissionPathNotFound(format!(
                    "Permission '{path}' not found in permissions"
                )))
            }
        }
    }
}
