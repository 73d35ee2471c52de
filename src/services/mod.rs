pub mod amount;
pub mod payment_service;
