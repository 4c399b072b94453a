//! Core library for shipyard.
//!
//! Resolves a declarative release configuration into a complete, validated
//! release model: defaults are filled in place, credentials are looked up
//! through the property resolver, assembler outputs are matched on disk and
//! every problem found is collected in one pass.
//!
//! # Modules
//!
//! - [`activation`] - When a unit is enabled
//! - [`config`] - Configuration loading and discovery
//! - [`context`] - The run context and its builder
//! - [`error`] - Error types and result aliases
//! - [`errors`] - The accumulated validation outcome
//! - [`git`] - Repository facts for the run context
//! - [`listener`] - Workflow listeners
//! - [`messages`] - Localizable error and warning messages
//! - [`model`] - The release model
//! - [`platform`] - Platform tokens and selection
//! - [`property`] - Property resolution for secrets
//! - [`view`] - Frozen snapshots of a context
//!
//! # Quick Start
//!
//! ```no_run
//! use shipyard_core::{ConfigLoader, ContextBuilder, Mode};
//!
//! let loaded = ConfigLoader::new()
//!     .with_project_search(".")
//!     .load()
//!     .expect("Failed to load configuration");
//! let mut context = ContextBuilder::new(".")
//!     .mode(Mode::Config)
//!     .build(loaded.model)
//!     .expect("Failed to build context");
//! let errors = context.validate_model().expect("Failed to write report");
//! println!("errors: {}", errors.has_errors());
//! ```
#![deny(unsafe_code)]

pub mod activation;

pub mod config;

pub mod context;

pub mod error;

pub mod errors;

pub mod git;

pub mod keyword;

pub mod listener;

pub mod merge;

pub mod messages;

pub mod model;

mod outputs;

pub mod platform;

pub mod property;

mod synthesis;

pub mod template;

pub mod text;

mod validation;

pub mod view;

pub use config::{Config, ConfigLoader, LoadedConfig, LogLevel};

pub use context::{Context, ContextBuilder, Mode};

pub use error::{ConfigError, ConfigResult, ContextError, ContextResult};

pub use errors::Errors;

pub use messages::Message;

pub use model::Model;
