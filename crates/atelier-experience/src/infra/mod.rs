//! Infrastructure: storage backends

pub mod session_repository;
