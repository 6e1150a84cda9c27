use ipcapi_core::{ApiObject, IpcApi, MetaEntry};
use ipcapi_transport::{HandlerRegistry, RegistryError};
use tracing::{debug, info};

/// Channel name and handler for every metadata entry the registrar binds,
/// in metadata order.
///
/// Namespaced entries are always bound. Base entries are bound only when
/// they are callable and base methods are enabled; base properties never
/// have a handler.
pub fn registrations(api: &IpcApi) -> impl Iterator<Item = (String, &MetaEntry)> + '_ {
    let include_base_methods = api.config().include_base_methods;
    api.meta()
        .iter()
        .filter(move |entry| {
            entry.is_namespaced() || (entry.is_callable() && include_base_methods)
        })
        .map(|entry| (entry.channel(), entry))
}

/// Bind every eligible metadata entry of `api` into `registry`.
///
/// Makes exactly one `register_handler` call per eligible entry. The first
/// failure reported by the registry is returned as-is; entries after it are
/// not registered. Returns the number of handlers registered.
pub fn register<R>(api: &IpcApi, registry: &R) -> Result<usize, RegistryError>
where
    R: HandlerRegistry + ?Sized,
{
    let mut count = 0;
    for (channel, entry) in registrations(api) {
        let Some(handler) = entry.value.as_function() else {
            continue;
        };
        debug!(%channel, "registering handler");
        registry.register_handler(&channel, handler.clone())?;
        count += 1;
    }
    info!(count, "registered IPC handlers");
    Ok(count)
}

/// Register the namespaced operations of `api` under the default
/// configuration. Top-level functions and values are skipped.
pub fn register_ipc_handlers<R>(registry: &R, api: ApiObject) -> Result<usize, RegistryError>
where
    R: HandlerRegistry + ?Sized,
{
    register(&IpcApi::with_defaults(api), registry)
}
