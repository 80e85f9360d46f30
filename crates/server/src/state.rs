use transconnect::{bundle::BundleStore, eta::EtaService};

pub struct AppState {
    pub service: EtaService,
    pub store: BundleStore,
}

impl AppState {
    pub fn new(service: EtaService, store: BundleStore) -> Self {
        Self { service, store }
    }
}
