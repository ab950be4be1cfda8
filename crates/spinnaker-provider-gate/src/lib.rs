// crates/spinnaker-provider-gate/src/lib.rs
// ============================================================================
// Module: Spinnaker Provider Gate Library
// Description: HTTP transport for the Spinnaker Gate API.
// Purpose: Implement task submission, polling, and document reads over HTTP.
// Dependencies: spinnaker-provider-config, spinnaker-provider-core, reqwest
// ============================================================================

//! ## Overview
//! [`GateClient`] is the production implementation of the core
//! [`TaskGateway`](spinnaker_provider_core::TaskGateway) and
//! [`ResourceReader`](spinnaker_provider_core::ResourceReader) interfaces.
//! [`connect`] wires it into a resource client using the loaded provider
//! configuration.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::GateClient;
pub use client::MAX_RESPONSE_BYTES;
pub use client::connect;
