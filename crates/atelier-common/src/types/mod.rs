//! Core data types shared by the Atelier crates

pub mod session_id;
