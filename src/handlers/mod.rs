pub mod cart;
pub mod catalog;
pub mod public;
pub mod webhooks;
