//! Core of a real-estate listing site: the admin guided tour, the property
//! search filters, and the GraphQL API serving both the public site and the
//! admin panel.

pub mod api;
pub mod consent;
pub mod database;
pub mod favorites;
pub mod filter;
pub mod preference;
pub mod settings;
pub mod store;
pub mod tour;
pub mod web;

pub use self::database::Database;
