pub mod args;
pub mod client;
pub mod domain;
pub mod filter;
pub mod http;
pub mod options;
pub mod output;
pub mod runner;
pub mod utils;

pub use args::Args;
pub use client::{ChaosApi, ChaosError, Item};
pub use http::HttpClient;
pub use options::{Mode, Options};
pub use runner::Runner;
