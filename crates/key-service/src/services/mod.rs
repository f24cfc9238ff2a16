pub mod key_store_service;
pub mod token_service;
