pub mod browse;
pub mod catalog;
pub mod cli;
pub mod error;
pub mod jsonp;
pub mod models;
pub mod output;
pub mod retriever;
pub mod sample;
pub mod surface;
