pub mod asset_reader;
pub mod asset_uploader;
pub mod gateway_handlers;
pub mod health_handlers;
