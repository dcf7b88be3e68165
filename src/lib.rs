pub mod analytics;
pub mod api;
pub mod database;
pub mod editor;
pub mod model;
pub mod outbound;
pub mod settings;
pub mod template;
pub mod web;
