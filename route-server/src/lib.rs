//! Route session server for a historical transport network.
//!
//! A web application that answers: "if I drag the start and end of my
//! route to these places, how would I have travelled between them, and by
//! what modes?"

pub mod cache;
pub mod config;
pub mod domain;
pub mod itinerary;
pub mod route;
pub mod session;
pub mod spatial;
pub mod web;
pub mod wfs;
