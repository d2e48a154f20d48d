//! Domains module containing business logic organized by bounded contexts.
//!
//! Each subdomain represents a specific area of functionality within the MCP
//! server. The traffic server has a single domain: the tools that query the
//! upstream traffic-volume API.

pub mod tools;
