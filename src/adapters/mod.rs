pub mod discord;
pub mod notifications;
pub mod performance_service;
pub mod queue;
