pub mod handler_table;
pub mod logging;
pub mod registrar;

pub use handler_table::{DuplicatePolicy, HandlerTable};
pub use logging::{init_logging, init_test_logging};
pub use registrar::{register, register_ipc_handlers, registrations};
