pub mod application;
pub mod commands;
pub mod git;
pub mod http;
pub mod package;
pub mod provider;
pub mod python;
pub mod runtime;
