pub mod invoker;
pub mod stubs;

pub use invoker::{build_invoker, Invoker, InvokerMember};
pub use stubs::ForwardingStub;
