// crates/spinnaker-provider-core/src/core/attributes.rs
// ============================================================================
// Module: Attribute Validators
// Description: Scalar format checks applied before structural validation.
// Purpose: Reject malformed emails, names, providers, and tags early.
// Dependencies: lettre, regex, thiserror
// ============================================================================

//! ## Overview
//! Attribute validators check single scalar inputs. They run before any
//! structural validation or network call, so a rejected attribute never
//! reaches the remote service.
//!
//! Email addresses are parsed as RFC 5322 mailboxes, with or without a
//! display name (`Ops <ops@example.com>`, `"Ops" Team <ops@example.com>`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::LazyLock;

use lettre::message::Mailbox;
use regex::Regex;
use thiserror::Error;

// ============================================================================
// SECTION: Allowlists
// ============================================================================

/// Cloud providers an application may declare.
pub const CLOUD_PROVIDERS: &[&str] =
    &["appengine", "aws", "dcos", "gce", "kubernetes", "openstack", "titus", "tencentcloud"];

/// Tags a pipeline template version may carry.
pub const TEMPLATE_TAGS: &[&str] = &["latest", "stable", "unstable", "experimental", "test", "canary"];

/// Application name pattern.
const APPLICATION_NAME_PATTERN: &str = r"^[[:lower:][:digit:]_.\-]+$";

/// Compiled application name pattern.
static APPLICATION_NAME: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(APPLICATION_NAME_PATTERN));

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Attribute format errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// Email does not follow RFC 5322.
    #[error("the email address shall conform to the RFC 5322: {0}")]
    InvalidEmail(String),
    /// Application name uses characters outside lowercase, digits, `_.-`.
    #[error("invalid application name: {0}")]
    InvalidApplicationName(String),
    /// Cloud provider is not on the allowlist.
    #[error("unsupported cloud provider: {0}")]
    UnsupportedCloudProvider(String),
    /// Template tag is not on the allowlist.
    #[error("unsupported pipeline template tag: {0}")]
    UnsupportedTag(String),
    /// A built-in pattern failed to compile.
    #[error("attribute pattern unavailable: {0}")]
    Pattern(String),
}

// ============================================================================
// SECTION: Validators
// ============================================================================

/// Checks an application name against `^[[:lower:][:digit:]_.-]+$`.
///
/// # Errors
///
/// Returns [`AttributeError::InvalidApplicationName`] when the name does not
/// match.
pub fn validate_application_name(name: &str) -> Result<(), AttributeError> {
    let pattern = APPLICATION_NAME.as_ref().map_err(|err| AttributeError::Pattern(err.to_string()))?;
    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(AttributeError::InvalidApplicationName(name.to_string()))
    }
}

/// Checks a cloud provider against [`CLOUD_PROVIDERS`].
///
/// # Errors
///
/// Returns [`AttributeError::UnsupportedCloudProvider`] for unknown values.
pub fn validate_cloud_provider(provider: &str) -> Result<(), AttributeError> {
    if CLOUD_PROVIDERS.contains(&provider) {
        Ok(())
    } else {
        Err(AttributeError::UnsupportedCloudProvider(provider.to_string()))
    }
}

/// Checks a pipeline template tag against [`TEMPLATE_TAGS`].
///
/// # Errors
///
/// Returns [`AttributeError::UnsupportedTag`] for unknown values.
pub fn validate_template_tag(tag: &str) -> Result<(), AttributeError> {
    if TEMPLATE_TAGS.contains(&tag) {
        Ok(())
    } else {
        Err(AttributeError::UnsupportedTag(tag.to_string()))
    }
}

/// Checks an email address against the RFC 5322 address syntax.
///
/// # Errors
///
/// Returns [`AttributeError::InvalidEmail`] when the address cannot be parsed.
pub fn validate_email(email: &str) -> Result<(), AttributeError> {
    email
        .trim()
        .parse::<Mailbox>()
        .map(|_| ())
        .map_err(|_| AttributeError::InvalidEmail(email.to_string()))
}

// ============================================================================
// SECTION: Cloud Provider Lists
// ============================================================================

/// Joins cloud providers into the comma-separated remote form.
#[must_use]
pub fn join_cloud_providers<S: AsRef<str>>(providers: &[S]) -> String {
    providers.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",")
}

/// Splits the comma-separated remote form; the empty string yields no providers.
#[must_use]
pub fn split_cloud_providers(joined: &str) -> Vec<String> {
    if joined.is_empty() {
        return Vec::new();
    }
    joined.split(',').map(str::to_string).collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
