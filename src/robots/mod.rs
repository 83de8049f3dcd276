//! Robots.txt handling
//!
//! Parsing lives in [`parser`], the once-per-session per-domain cache in
//! [`cache`]. Everything here fails open: a missing or unreadable robots.txt
//! never blocks a crawl.

mod cache;
mod parser;

pub use cache::RobotsPolicyCache;
pub use parser::RobotsPolicy;
