pub mod codec;
pub mod stream;
pub mod transport;
pub mod wire;

pub use codec::{CodecError, NewlineDelimitedCodec};
pub use stream::{serve_connection, StreamInvoker};
pub use transport::{HandlerRegistry, Invoke, RegistryError, TransportError};
pub use wire::{Outcome, WireMessage};
