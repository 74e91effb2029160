//! Global client cache for the CPU runtime

use super::client::CpuClient;
use super::device::CpuDevice;
use crate::runtime::{Device, DeviceLimits};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Devices that share an id but enforce different limits get separate
/// clients, since the client admits launches against its own device.
type ClientKey = (usize, DeviceLimits);

/// Global client cache: (device id, limits) -> cached CpuClient
///
/// The cached client is the device's default stream. Host transfers are
/// ordered against it.
static CLIENT_CACHE: OnceLock<Mutex<HashMap<ClientKey, CpuClient>>> = OnceLock::new();

fn key(device: &CpuDevice) -> ClientKey {
    (device.id(), device.limits())
}

/// Get or create the cached default client for a device.
pub(super) fn get_or_create_client(device: &CpuDevice) -> CpuClient {
    let cache = CLIENT_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = cache.lock();
    guard
        .entry(key(device))
        .or_insert_with(|| CpuClient::new(device.clone()))
        .clone()
}

/// Every cached default client on `device`'s memory, whatever its limits.
pub(super) fn cached_clients(device: &CpuDevice) -> Vec<CpuClient> {
    let Some(cache) = CLIENT_CACHE.get() else {
        return Vec::new();
    };
    cache
        .lock()
        .iter()
        .filter(|((id, _), _)| *id == device.id())
        .map(|(_, client)| client.clone())
        .collect()
}
