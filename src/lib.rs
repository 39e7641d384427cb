pub mod config_client;
pub mod emissions_service;
pub mod model;
pub mod state_store_client;
pub mod store_client;
