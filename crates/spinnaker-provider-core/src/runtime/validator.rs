// crates/spinnaker-provider-core/src/runtime/validator.rs
// ============================================================================
// Module: Structural Validator
// Description: Completeness checks of configuration trees against variants.
// Purpose: Reject malformed documents before any network call.
// Dependencies: crate::core, tracing
// ============================================================================

//! ## Overview
//! A document is valid when it matches at least one [`SchemaVariant`] in
//! full. Variants are tried in declaration order; each check is depth-first
//! and fails fast on the first missing or wrong-kind node. When every variant
//! fails, the error of the last attempted variant is returned.
//!
//! Missing means absent, null, empty string, zero, `false`, or an empty map.
//! Empty lists are valid. Validation is pure and never mutates the tree.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing::debug;

use crate::core::ConfigTree;
use crate::core::SchemaCatalogue;
use crate::core::SchemaNode;
use crate::core::SchemaVariant;
use crate::core::ValidationError;
use crate::core::tree::field_path;
use crate::core::tree::index_path;

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a document against a catalogue, using its root label for paths.
///
/// # Errors
///
/// Returns the [`ValidationError`] of the last variant attempted when no
/// variant matches.
pub fn validate(
    tree: &ConfigTree,
    catalogue: &SchemaCatalogue,
) -> Result<&'static SchemaVariant, ValidationError> {
    validate_variants(tree, catalogue.variants, catalogue.root_path)
}

/// Validates a document against an ordered list of variants.
///
/// Returns the first variant that matches in full.
///
/// # Errors
///
/// Returns the [`ValidationError`] of the last variant attempted when no
/// variant matches, or [`ValidationError::NoVariants`] for an empty list.
pub fn validate_variants(
    tree: &ConfigTree,
    variants: &'static [SchemaVariant],
    root_path: &str,
) -> Result<&'static SchemaVariant, ValidationError> {
    let mut last_error = ValidationError::NoVariants { root: root_path.to_string() };
    for variant in variants {
        match check_node(variant.name, variant.root, tree, root_path) {
            Ok(()) => {
                debug!(variant = variant.name, root = root_path, "document matched schema variant");
                return Ok(variant);
            }
            Err(err) => {
                debug!(variant = variant.name, error = %err, "document rejected by schema variant");
                last_error = err;
            }
        }
    }
    Err(last_error)
}

// ============================================================================
// SECTION: Node Checks
// ============================================================================

/// Checks a present, non-missing node against its expected shape.
fn check_node(
    variant: &'static str,
    node: SchemaNode,
    tree: &ConfigTree,
    path: &str,
) -> Result<(), ValidationError> {
    match node {
        SchemaNode::Any => Ok(()),
        SchemaNode::Scalar => {
            if tree.is_scalar() {
                Ok(())
            } else {
                Err(wrong_kind(variant, node, tree, path))
            }
        }
        SchemaNode::List(element) => {
            let Some(items) = tree.as_list() else {
                return Err(wrong_kind(variant, node, tree, path));
            };
            for (index, item) in items.iter().enumerate() {
                let item_path = index_path(path, index);
                if item.is_missing() {
                    return Err(missing(variant, *element, item_path));
                }
                check_node(variant, *element, item, &item_path)?;
            }
            Ok(())
        }
        SchemaNode::Struct(fields) => {
            let Some(entries) = tree.as_map() else {
                return Err(wrong_kind(variant, node, tree, path));
            };
            for field in fields {
                let child_path = field_path(path, field.name);
                match entries.get(field.name) {
                    Some(value) if !value.is_missing() => {
                        check_node(variant, field.node, value, &child_path)?;
                    }
                    _ if field.required => return Err(missing(variant, field.node, child_path)),
                    _ => {}
                }
            }
            Ok(())
        }
    }
}

/// Builds a missing-node error.
fn missing(variant: &'static str, node: SchemaNode, path: String) -> ValidationError {
    ValidationError::Missing { variant, path, expected: node.label() }
}

/// Builds a wrong-kind error.
fn wrong_kind(
    variant: &'static str,
    node: SchemaNode,
    tree: &ConfigTree,
    path: &str,
) -> ValidationError {
    ValidationError::WrongKind {
        variant,
        path: path.to_string(),
        expected: node.label(),
        found: tree.kind(),
    }
}
