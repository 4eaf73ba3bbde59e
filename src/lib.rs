pub mod adapters;
pub mod common;
pub mod entities;
pub mod models;
pub mod processors;
pub mod repositories;
pub mod settings;
pub mod storage;
pub mod usecases;
pub mod workers;
