#[cfg(feature = "browser")]
pub mod chrome;
pub mod engine;
pub mod http;

#[cfg(feature = "browser")]
pub use chrome::{ChromeLauncher, ChromePage, ChromeSession};
pub use engine::{Engine, run_batch};
pub use http::{HttpLauncher, HttpPage, HttpSession, evaluate_metadata};
