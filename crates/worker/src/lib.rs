pub mod dispatcher;
pub mod registry;
pub mod service;

pub use dispatcher::{AddressedReply, DispatchOutcome, RequestDispatcher, UNEXPECTED_ERROR};
pub use registry::TransformRegistry;
pub use service::TransformWorker;
