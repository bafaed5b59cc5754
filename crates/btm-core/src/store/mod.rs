mod device_store;
pub(crate) mod keys;
mod store_state;

pub use {device_store::DeviceStore, store_state::StoreState};
