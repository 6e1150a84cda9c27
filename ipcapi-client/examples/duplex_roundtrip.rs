// Registers a small API on one end of an in-memory pipe and calls it
// through the generated invoker on the other end.
//
// Run with: cargo run -p ipcapi-client --example duplex_roundtrip
// Logs go to stderr and to a daily file under the system temp dir.

use ipcapi_client::build_invoker;
use ipcapi_core::{ApiConfig, ApiObject, IpcApi, Namespace, RpcError};
use ipcapi_server::{init_logging, register, HandlerTable};
use ipcapi_transport::{serve_connection, StreamInvoker};
use serde_json::{json, Value};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = init_logging(std::env::temp_dir().join("ipcapi-logs"), "duplex_roundtrip")?;

    let api = ApiObject::new()
        .value("version", json!("0.1.0"))
        .function("ping", |_| async { Ok(json!("pong")) })
        .namespace(
            "math",
            Namespace::new()
                .method("square", |n: Value| async move {
                    let n = n.as_f64().ok_or_else(|| RpcError::bad_request("expected a number"))?;
                    Ok(json!(n * n))
                }),
        );
    let config = ApiConfig::default()
        .with_base_methods(true)
        .with_base_property("version");
    let api = IpcApi::new(api, config);

    let table = Arc::new(HandlerTable::new());
    let count = register(&api, table.as_ref())?;
    println!("registered {} handlers: {:?}", count, table.channels());

    let (client_io, server_io) = tokio::io::duplex(16 * 1024);
    tokio::spawn(serve_connection(server_io, table));
    let invoker = build_invoker(&api, Arc::new(StreamInvoker::connect(client_io)));

    println!("version  = {:?}", invoker.property("version"));
    println!("ping     = {}", invoker.call(None, "ping", Value::Null).await?);
    println!("square 7 = {}", invoker.call(Some("math"), "square", json!(7)).await?);
    match invoker.call(Some("math"), "square", json!("seven")).await {
        Ok(v) => println!("unexpected result {}", v),
        Err(e) => println!("square \"seven\" failed: {}", e),
    }

    Ok(())
}
