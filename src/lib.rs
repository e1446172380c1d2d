pub mod app;
pub mod blob;
pub mod chat;
pub mod config;
pub mod domain;
pub mod embedding;
pub mod error;
pub mod feedback;
pub mod gate;
pub mod hungarian;
pub mod logging;
pub mod matching;
pub mod meetings;
pub mod notifier;
pub mod preference;
pub mod rand_source;
pub mod repo;
pub mod scheduling;
pub mod service;
pub mod similarity;
pub mod state;
pub mod time_slot;
pub mod usecase;
pub mod utils;
