//! Tower Service implementations

pub mod core;
pub mod dispatcher;
pub mod request;
pub mod response;

pub use core::ProviderService;
pub use dispatcher::TaskDispatcher;
pub use request::{ProviderPayload, ProviderRequest, RequestContext};
pub use response::{ProviderResponse, RpcReply};
