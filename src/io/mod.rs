//! I/O modules for catalog search, credential exchange and object access

pub mod annotation;
pub mod catalog;
pub mod credentials;
pub mod http;
pub mod session;

pub use annotation::Annotation;
pub use catalog::CatalogClient;
pub use credentials::CredentialClient;
pub use http::{HttpTransport, ReqwestTransport};
pub use session::ObjectSession;

#[cfg(test)]
pub(crate) mod test_server;
