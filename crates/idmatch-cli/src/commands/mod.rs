pub mod default_config;
pub mod reconcile;
