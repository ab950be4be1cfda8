// crates/spinnaker-provider-core/src/runtime/diff.rs
// ============================================================================
// Module: Configuration Drift Comparator
// Description: Superset-consistent comparison of desired and observed trees.
// Purpose: Detect drift while ignoring fields the remote adds on its own.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The remote service stores documents with extra managed fields, so drift is
//! defined as "observed is not a superset of desired". Maps check only the
//! keys present in the desired tree, in its insertion order. Lists compare
//! positionally and must have equal length. Scalars compare exactly, without
//! numeric coercion. The walk is depth-first and stops at the first mismatch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ConfigTree;
use crate::core::DriftError;
use crate::core::tree::field_path;
use crate::core::tree::index_path;

// ============================================================================
// SECTION: Comparison
// ============================================================================

/// Compares a desired tree against an observed tree.
///
/// # Errors
///
/// Returns the first [`DriftError`] found, naming both paths, both values,
/// and both kinds.
pub fn compare(
    desired: &ConfigTree,
    observed: &ConfigTree,
    path_desired: &str,
    path_observed: &str,
) -> Result<(), DriftError> {
    match (desired, observed) {
        (ConfigTree::Map(wanted), ConfigTree::Map(stored)) => {
            for (key, value) in wanted {
                let child_desired = field_path(path_desired, key);
                let child_observed = field_path(path_observed, key);
                let Some(found) = stored.get(key) else {
                    return Err(DriftError::between(&child_desired, &child_observed, value, None));
                };
                compare(value, found, &child_desired, &child_observed)?;
            }
            Ok(())
        }
        (ConfigTree::List(wanted), ConfigTree::List(stored)) => {
            if wanted.len() != stored.len() {
                return Err(DriftError::between(path_desired, path_observed, desired, Some(observed)));
            }
            for (index, (value, found)) in wanted.iter().zip(stored).enumerate() {
                compare(
                    value,
                    found,
                    &index_path(path_desired, index),
                    &index_path(path_observed, index),
                )?;
            }
            Ok(())
        }
        (ConfigTree::Map(_) | ConfigTree::List(_), _) | (_, ConfigTree::Map(_) | ConfigTree::List(_)) => {
            Err(DriftError::between(path_desired, path_observed, desired, Some(observed)))
        }
        (scalar_desired, scalar_observed) => {
            if scalar_desired == scalar_observed {
                Ok(())
            } else {
                Err(DriftError::between(path_desired, path_observed, desired, Some(observed)))
            }
        }
    }
}

/// Returns true when `observed` is a superset of `desired`.
#[must_use]
pub fn is_consistent(desired: &ConfigTree, observed: &ConfigTree) -> bool {
    compare(desired, observed, "", "").is_ok()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
