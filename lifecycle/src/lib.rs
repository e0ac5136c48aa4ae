//! Idempotent create/delete of repositories owned by the authenticated
//! principal, with explicit classification of races and missing resources.

mod config;
mod error;
mod manager;
mod resource;
pub mod telemetry;
pub mod transport;

pub use config::DEFAULT_API_BASE;
pub use config::DEFAULT_NAME_PREFIX;
pub use config::DEFAULT_TIMEOUT;
pub use config::LifecycleConfig;
pub use config::NamingPolicy;
pub use config::Secret;
pub use error::AuthError;
pub use error::LifecycleError;
pub use error::LifecycleResult;
pub use manager::ResourceLifecycleManager;
pub use resource::FailureCause;
pub use resource::OperationOutcome;
pub use resource::Principal;
pub use resource::ResourceDescriptor;
pub use resource::ResourceRef;
pub use transport::HttpRequest;
pub use transport::HttpResponse;
pub use transport::Method;
pub use transport::ReqwestTransport;
pub use transport::Transport;
pub use transport::TransportError;
