// Infrastructure - configuration, logging, command line and the application runner

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
