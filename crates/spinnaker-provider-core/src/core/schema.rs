// crates/spinnaker-provider-core/src/core/schema.rs
// ============================================================================
// Module: Schema Variants
// Description: Static required-field shapes for configuration documents.
// Purpose: Declare the accepted document shapes checked before submission.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`SchemaVariant`] names one accepted shape for a configuration document.
//! Shapes are built from [`SchemaNode`] values at compile time and never
//! mutated. Field order inside a struct node is significant: validation walks
//! fields in declaration order and reports the first one that fails.
//!
//! The catalogues at the bottom of this module group variants per resource
//! kind together with the root label used in reported paths.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::tree::Kind;

// ============================================================================
// SECTION: Schema Nodes
// ============================================================================

/// Expected shape of one node in a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaNode {
    /// Any non-missing scalar (bool, number, or string).
    Scalar,
    /// Any non-missing value of any kind.
    Any,
    /// List whose elements each match the inner node.
    List(&'static Self),
    /// Map carrying the listed fields.
    Struct(&'static [Field]),
}

impl SchemaNode {
    /// Returns a short label describing the expected shape.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Any => "value",
            Self::List(_) => "list",
            Self::Struct(_) => "map",
        }
    }
}

/// Named field of a struct-shaped schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Map key carrying the field.
    pub name: &'static str,
    /// Expected shape of the field value.
    pub node: SchemaNode,
    /// Whether the field must be present and non-missing.
    pub required: bool,
}

impl Field {
    /// Declares a required field.
    #[must_use]
    pub const fn required(name: &'static str, node: SchemaNode) -> Self {
        Self { name, node, required: true }
    }

    /// Declares an optional field, validated only when present.
    #[must_use]
    pub const fn optional(name: &'static str, node: SchemaNode) -> Self {
        Self { name, node, required: false }
    }
}

// ============================================================================
// SECTION: Variants
// ============================================================================

/// One accepted shape of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaVariant {
    /// Stable variant name.
    pub name: &'static str,
    /// Root node of the shape.
    pub root: SchemaNode,
}

/// Ordered set of variants accepted for one resource document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaCatalogue {
    /// Label prefixed to every reported path.
    pub root_path: &'static str,
    /// Variants in the order they are attempted.
    pub variants: &'static [SchemaVariant],
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Structural validation failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `path` uses dotted keys and bracketed indices (`a.b[2].c`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required node is absent or carries a missing value.
    #[error("missing field {path}")]
    Missing {
        /// Variant that was being checked.
        variant: &'static str,
        /// Path of the missing node.
        path: String,
        /// Expected shape label.
        expected: &'static str,
    },
    /// A node is present with the wrong kind.
    #[error("invalid field value {path}: expected {expected}, found {found}")]
    WrongKind {
        /// Variant that was being checked.
        variant: &'static str,
        /// Path of the offending node.
        path: String,
        /// Expected shape label.
        expected: &'static str,
        /// Kind actually found.
        found: Kind,
    },
    /// The catalogue declares no variants.
    #[error("no schema variants declared for {root}")]
    NoVariants {
        /// Root label of the empty catalogue.
        root: String,
    },
}

impl ValidationError {
    /// Returns the path of the failing node, if any.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Missing { path, .. } | Self::WrongKind { path, .. } => path,
            Self::NoVariants { root } => root,
        }
    }

    /// Returns the variant that produced the error, if any.
    #[must_use]
    pub const fn variant(&self) -> Option<&'static str> {
        match self {
            Self::Missing { variant, .. } | Self::WrongKind { variant, .. } => Some(*variant),
            Self::NoVariants { .. } => None,
        }
    }
}

// ============================================================================
// SECTION: Shared Shapes
// ============================================================================

/// List of scalars.
const SCALAR_LIST: SchemaNode = SchemaNode::List(&SchemaNode::Scalar);

/// Pipeline stage fields.
const STAGE_FIELDS: &[Field] = &[
    Field::required("name", SchemaNode::Scalar),
    Field::required("refId", SchemaNode::Scalar),
    Field::required("requisiteStageRefIds", SCALAR_LIST),
    Field::required("type", SchemaNode::Scalar),
];

/// Pipeline trigger fields.
const TRIGGER_FIELDS: &[Field] = &[Field::required("type", SchemaNode::Scalar)];

/// List of pipeline stages.
const STAGES: SchemaNode = SchemaNode::List(&SchemaNode::Struct(STAGE_FIELDS));

/// List of pipeline triggers.
const TRIGGERS: SchemaNode = SchemaNode::List(&SchemaNode::Struct(TRIGGER_FIELDS));

// ============================================================================
// SECTION: Application
// ============================================================================

/// Application document fields.
const APPLICATION_FIELDS: &[Field] = &[
    Field::required("name", SchemaNode::Scalar),
    Field::required("email", SchemaNode::Scalar),
    Field::optional("cloudProviders", SchemaNode::Scalar),
    Field::optional("permissions", SchemaNode::Any),
];

/// Application document variant.
pub const APPLICATION: SchemaVariant =
    SchemaVariant { name: "application", root: SchemaNode::Struct(APPLICATION_FIELDS) };

/// Application documents.
pub const APPLICATION_CATALOGUE: SchemaCatalogue =
    SchemaCatalogue { root_path: "application", variants: &[APPLICATION] };

// ============================================================================
// SECTION: Project
// ============================================================================

/// Project cluster fields.
const CLUSTER_FIELDS: &[Field] = &[
    Field::required("account", SchemaNode::Scalar),
    Field::required("applications", SCALAR_LIST),
    Field::required("detail", SchemaNode::Scalar),
    Field::required("stack", SchemaNode::Scalar),
];

/// Project pipeline reference fields.
const PIPELINE_CONFIG_FIELDS: &[Field] = &[
    Field::required("application", SchemaNode::Scalar),
    Field::required("pipelineConfigId", SchemaNode::Scalar),
];

/// Project configuration fields.
const PROJECT_CONFIG_FIELDS: &[Field] = &[
    Field::required("applications", SCALAR_LIST),
    Field::required("clusters", SchemaNode::List(&SchemaNode::Struct(CLUSTER_FIELDS))),
    Field::required("pipelineConfigs", SchemaNode::List(&SchemaNode::Struct(PIPELINE_CONFIG_FIELDS))),
];

/// Project configuration variant.
pub const PROJECT_CONFIG: SchemaVariant =
    SchemaVariant { name: "projectConfig", root: SchemaNode::Struct(PROJECT_CONFIG_FIELDS) };

/// Project configuration documents.
pub const PROJECT_CONFIG_CATALOGUE: SchemaCatalogue =
    SchemaCatalogue { root_path: "config", variants: &[PROJECT_CONFIG] };

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Standalone pipeline fields.
const STANDALONE_PIPELINE_FIELDS: &[Field] = &[
    Field::required("application", SchemaNode::Scalar),
    Field::required("name", SchemaNode::Scalar),
    Field::required("stages", STAGES),
    Field::required("triggers", TRIGGERS),
];

/// Pipeline template reference fields.
const TEMPLATE_REFERENCE_FIELDS: &[Field] = &[
    Field::required("artifactAccount", SchemaNode::Scalar),
    Field::required("reference", SchemaNode::Scalar),
    Field::required("type", SchemaNode::Scalar),
];

/// Templated pipeline metadata fields.
const PIPELINE_METADATA_FIELDS: &[Field] = &[
    Field::required("name", SchemaNode::Scalar),
    Field::required("description", SchemaNode::Scalar),
    Field::required("scopes", SCALAR_LIST),
];

/// Templated pipeline fields.
const TEMPLATED_PIPELINE_FIELDS: &[Field] = &[
    Field::required("application", SchemaNode::Scalar),
    Field::required("name", SchemaNode::Scalar),
    Field::required("stages", STAGES),
    Field::required("triggers", TRIGGERS),
    Field::required("template", SchemaNode::Struct(TEMPLATE_REFERENCE_FIELDS)),
    Field::optional("variables", SchemaNode::Any),
    Field::required("metadata", SchemaNode::Struct(PIPELINE_METADATA_FIELDS)),
];

/// Pipeline defined inline.
pub const STANDALONE_PIPELINE: SchemaVariant =
    SchemaVariant { name: "standalonePipeline", root: SchemaNode::Struct(STANDALONE_PIPELINE_FIELDS) };

/// Pipeline instantiated from a template.
pub const TEMPLATED_PIPELINE: SchemaVariant =
    SchemaVariant { name: "templatedPipeline", root: SchemaNode::Struct(TEMPLATED_PIPELINE_FIELDS) };

/// Pipeline documents, standalone first.
pub const PIPELINE_CATALOGUE: SchemaCatalogue = SchemaCatalogue {
    root_path: "pipeline.definition",
    variants: &[STANDALONE_PIPELINE, TEMPLATED_PIPELINE],
};

/// Pipeline documents carrying a template reference.
pub const TEMPLATED_PIPELINE_CATALOGUE: SchemaCatalogue =
    SchemaCatalogue { root_path: "pipeline.definition", variants: &[TEMPLATED_PIPELINE] };

// ============================================================================
// SECTION: Pipeline Template
// ============================================================================

/// Pipeline template metadata fields.
const TEMPLATE_METADATA_FIELDS: &[Field] = &[
    Field::required("name", SchemaNode::Scalar),
    Field::required("description", SchemaNode::Scalar),
    Field::required("owner", SchemaNode::Scalar),
    Field::required("scopes", SCALAR_LIST),
];

/// Pipeline template body fields.
const TEMPLATE_PIPELINE_FIELDS: &[Field] =
    &[Field::required("stages", STAGES), Field::required("triggers", TRIGGERS)];

/// Pipeline template fields.
const PIPELINE_TEMPLATE_FIELDS: &[Field] = &[
    Field::required("id", SchemaNode::Scalar),
    Field::required("metadata", SchemaNode::Struct(TEMPLATE_METADATA_FIELDS)),
    Field::required("pipeline", SchemaNode::Struct(TEMPLATE_PIPELINE_FIELDS)),
    Field::required("schema", SchemaNode::Scalar),
    Field::optional("variables", SchemaNode::Any),
];

/// Pipeline template variant.
pub const PIPELINE_TEMPLATE: SchemaVariant =
    SchemaVariant { name: "pipelineTemplate", root: SchemaNode::Struct(PIPELINE_TEMPLATE_FIELDS) };

/// Pipeline template documents.
pub const PIPELINE_TEMPLATE_CATALOGUE: SchemaCatalogue =
    SchemaCatalogue { root_path: "pipeline_template", variants: &[PIPELINE_TEMPLATE] };
