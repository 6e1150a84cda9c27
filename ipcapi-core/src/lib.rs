// IPC API metadata
// Derives a flat list of remotely callable operations from an API object.
// The server facade (handler registration) and the client facade (invoker
// construction) are both driven from this list, so they always agree on
// channel names and on which members are exposed.

pub mod api;
pub mod channel;
pub mod classify;
pub mod config;
pub mod error;
pub mod handler;
pub mod meta;
pub mod value;

pub use api::IpcApi;
pub use channel::{channel_name, CHANNEL_SEPARATOR};
pub use classify::{classify, Member};
pub use config::{ApiConfig, ConfigOverrides};
pub use error::{ConfigError, ErrorCode, RpcError};
pub use handler::{handler_fn, Callable, FnHandler, Handler, HandlerResult};
pub use meta::{build_meta, MetaEntry};
pub use value::{ApiObject, ApiValue, Namespace};

