//! Synapse Overview
//!
//! Cross-artifact dependency resolution for XML integration projects
//! (APIs, sequences, endpoints, templates, message stores, connectors).
//!
//! ## Features
//!
//! - **Dependency Trees**: Follow every keyed reference of an artifact across files
//! - **Explicit Dispatch**: One table entry per mediator tag, no dynamic lookup
//! - **Memoized Walks**: Each file is walked once per scan, cycles terminate
//! - **Project Overview**: Entrypoints and de-duplicated connector usages as JSON or DOT
//!
//! ## Architecture
//!
//! ```text
//! OverviewAggregator        (overview::aggregator)
//!   └── ArtifactScanner     (scanner)
//!         └── ReferenceExtractor  (extract)
//!               ├── ArtifactLocator     (locator)
//!               ├── AstProvider         (ast)
//!               ├── DependencyCache     (cache)
//!               └── ConnectorRegistry   (connectors)
//! ```
//!
//! ## Project layout
//!
//! ```text
//! project/
//! ├── api/
//! │   └── Order.xml
//! ├── tasks/
//! ├── inbound-endpoints/
//! ├── sequences/
//! │   └── Validate.xml
//! ├── endpoints/
//! ├── templates/
//! ├── message-stores/
//! ├── proxy-services/
//! └── connectors/
//!     └── http-connector-0.1.8.zip
//! ```

pub mod artifact;
pub mod ast;
pub mod cache;
pub mod config;
pub mod connectors;
pub mod dependency;
pub mod error;
pub mod extract;
pub mod locator;
pub mod overview;
pub mod scanner;

pub use artifact::{ArtifactKind, EntrypointType};
pub use ast::{AstProvider, XmlAstProvider, XmlNode};
pub use cache::DependencyCache;
pub use config::OverviewConfig;
pub use connectors::ConnectorRegistry;
pub use dependency::{Dependency, DependencyTree};
pub use error::{OverviewError, Result};
pub use extract::{canonical_tag, ReferenceExtractor, Resolve};
pub use locator::ArtifactLocator;
pub use overview::{Connection, Entrypoint, OverviewAggregator, OverviewModel};
pub use scanner::ArtifactScanner;
