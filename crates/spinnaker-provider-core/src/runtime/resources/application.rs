// crates/spinnaker-provider-core/src/runtime/resources/application.rs
// ============================================================================
// Module: Application Operations
// Description: Application documents and their lifecycle operations.
// Purpose: Map typed applications onto remote documents and tasks.
// Dependencies: crate::{core, interfaces, runtime}, tracing
// ============================================================================

//! ## Overview
//! Applications are authored with role-indexed permissions and a list of
//! cloud providers. The remote document stores permissions action-indexed
//! and cloud providers as one comma-separated string. Reads return the
//! document under the envelope's `attributes` key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing::info;

use super::ResourceClient;
use super::ResourceError;
use super::job;
use super::required_str;
use crate::core::APPLICATION_CATALOGUE;
use crate::core::ActionIndexed;
use crate::core::Clock;
use crate::core::ConfigTree;
use crate::core::Kind;
use crate::core::RoleIndexed;
use crate::core::TaskRequest;
use crate::core::join_cloud_providers;
use crate::core::split_cloud_providers;
use crate::core::validate_application_name;
use crate::core::validate_cloud_provider;
use crate::core::validate_email;
use crate::interfaces::ResourceKind;
use crate::interfaces::ResourceLocator;
use crate::interfaces::ResourceReader;
use crate::interfaces::TaskGateway;
use crate::runtime::validator::validate;

// ============================================================================
// SECTION: Application Model
// ============================================================================

/// Application as authored and as read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    /// Application name; also its identifier.
    pub name: String,
    /// Owner email.
    pub email: String,
    /// Declared cloud providers.
    pub cloud_providers: Vec<String>,
    /// Role-indexed permissions.
    pub permissions: RoleIndexed,
}

impl Application {
    /// Creates an application without providers or permissions.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            cloud_providers: Vec::new(),
            permissions: RoleIndexed::new(),
        }
    }

    /// Checks attributes and the document shape.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Attribute`] or [`ResourceError::Validation`].
    pub fn validate(&self) -> Result<(), ResourceError> {
        validate_application_name(&self.name)?;
        validate_email(&self.email)?;
        for provider in &self.cloud_providers {
            validate_cloud_provider(provider)?;
        }
        validate(&self.to_document(), &APPLICATION_CATALOGUE)?;
        Ok(())
    }

    /// Renders the remote document.
    ///
    /// Permissions are omitted when no role is granted any action.
    #[must_use]
    pub fn to_document(&self) -> ConfigTree {
        let mut entries = vec![
            ("name", ConfigTree::from(self.name.as_str())),
            ("email", ConfigTree::from(self.email.as_str())),
            ("cloudProviders", ConfigTree::from(join_cloud_providers(&self.cloud_providers))),
        ];
        let permissions = self.permissions.to_action_indexed();
        if !permissions.is_empty() {
            entries.push(("permissions", permissions.to_tree()));
        }
        ConfigTree::map(entries)
    }

    /// Decodes a remote document.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnexpectedDocument`] for wrongly typed fields
    /// and [`ResourceError::Permission`] for malformed permissions.
    pub fn from_document(document: &ConfigTree) -> Result<Self, ResourceError> {
        let kind = ResourceKind::Application;
        let name = required_str(kind, document, "name")?.to_string();
        let email = document.get_str("email").unwrap_or_default().to_string();
        let cloud_providers = match document.get("cloudProviders") {
            None | Some(ConfigTree::Null) => Vec::new(),
            Some(ConfigTree::String(joined)) => split_cloud_providers(joined),
            Some(other) => {
                return Err(ResourceError::unexpected(
                    kind,
                    format!("field 'cloudProviders' should be a string, found {}", other.kind()),
                ));
            }
        };
        let permissions = match document.get("permissions") {
            None | Some(ConfigTree::Null) => RoleIndexed::new(),
            Some(tree) => ActionIndexed::from_tree(tree)?.to_role_indexed(),
        };
        Ok(Self { name, email, cloud_providers, permissions })
    }
}

// ============================================================================
// SECTION: Operations
// ============================================================================

impl<G, C> ResourceClient<G, C>
where
    G: TaskGateway + ResourceReader,
    C: Clock,
{
    /// Creates an application and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] for invalid input, task failures, or reads.
    pub fn create_application(&self, application: &Application) -> Result<Application, ResourceError> {
        self.save_application(application, "Create")
    }

    /// Updates an application and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] for invalid input, task failures, or reads.
    pub fn update_application(&self, application: &Application) -> Result<Application, ResourceError> {
        self.save_application(application, "Update")
    }

    /// Reads one application.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] when the application does not
    /// exist and [`ResourceError::UnexpectedDocument`] for envelopes without
    /// an `attributes` map.
    pub fn get_application(&self, name: &str) -> Result<Application, ResourceError> {
        let locator = ResourceLocator::Application { name: name.to_string() };
        let envelope = self.fetch_required(&locator, name)?;
        match envelope.get("attributes") {
            Some(attributes @ ConfigTree::Map(_)) => Application::from_document(attributes),
            other => Err(ResourceError::unexpected(
                ResourceKind::Application,
                format!("field 'attributes' should be a map, found {}", Kind::of(other)),
            )),
        }
    }

    /// Lists the summary documents of every application.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the list cannot be read.
    pub fn list_applications(&self) -> Result<Vec<ConfigTree>, ResourceError> {
        let items = self.fetch_list(&ResourceLocator::Applications)?;
        if let Some(item) = items.iter().find(|item| item.as_map().is_none()) {
            return Err(ResourceError::unexpected(
                ResourceKind::Application,
                format!("application summary should be a map, found {}", item.kind()),
            ));
        }
        Ok(items)
    }

    /// Deletes an application after checking that it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] when the application does not
    /// exist, or the task error.
    pub fn delete_application(&self, name: &str) -> Result<(), ResourceError> {
        self.get_application(name)?;
        let request = TaskRequest::new(
            name,
            format!("Delete application {name}"),
            job("deleteApplication", [("application", ConfigTree::map([("name", ConfigTree::from(name))]))]),
        );
        self.run_task(&request)?;
        info!(application = name, "application deleted");
        Ok(())
    }

    /// Submits the application document and reads it back.
    fn save_application(&self, application: &Application, verb: &str) -> Result<Application, ResourceError> {
        application.validate()?;
        let request = TaskRequest::new(
            application.name.as_str(),
            format!("{verb} application {}", application.name),
            job("createApplication", [("application", application.to_document())]),
        );
        self.run_task(&request)?;
        info!(application = %application.name, operation = verb, "application saved");
        self.get_application(&application.name)
    }
}
