//! Domain triage decision pipeline.
//!
//! Input is validated without network access, the registration state is looked
//! up once, and registered domains have their landing page classified by a fixed
//! rule cascade. Every failure ends up as a [`types::Verdict`] reason.

pub mod capability;
pub mod classifier;
pub mod config;
pub mod html;
pub mod pipeline;
pub mod resolver;
pub mod types;
pub mod validator;

pub use capability::{FetchError, LookupError, PageFetcher, RegistrationLookup};
pub use config::{ClassifierConfig, StructureThresholds};
pub use pipeline::{Pipeline, DEFAULT_UPSTREAM_TIMEOUT};
pub use types::{FetchedPage, NormalizedDomain, Verdict, VerdictStatus};
