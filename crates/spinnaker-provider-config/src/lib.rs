// crates/spinnaker-provider-config/src/lib.rs
// ============================================================================
// Module: Spinnaker Provider Config Library
// Description: Canonical provider configuration model and validation.
// Purpose: Single source of truth for spinnaker-provider.toml semantics.
// Dependencies: spinnaker-provider-core, serde, toml, url
// ============================================================================

//! ## Overview
//! `spinnaker-provider-config` defines how the provider reaches Gate and how
//! long it waits for remote tasks. Loading is strict and fails closed: the
//! file is size-limited and every bound is
//! checked before a client is built.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
