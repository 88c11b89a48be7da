//! webserver - HTTP/1.0 origin server
//!
//! Serves static files, directory listings and registered dynamic pages,
//! one request per connection.

pub mod access_log;
pub mod config;
pub mod dynamic;
pub mod http;
pub mod resources;
pub mod server;
