//! Configuration for career-tree
//!
//! CLI arguments with environment variable fallbacks, using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::tree::DatasetSource;

/// Smallest accepted request body limit
pub const MIN_BODY_BYTES: usize = 1024;

/// Career path explorer API
#[derive(Parser, Debug, Clone)]
#[command(name = "career-tree")]
#[command(about = "Career path explorer: tree navigation, map layout and community submissions")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Career tree dataset (JSON object keyed by composite path)
    #[arg(long, env = "TREE_DATA", default_value = "data/career_tree_data.json")]
    pub tree_data: PathBuf,

    /// Per-node metadata overlay; a missing file means no metadata
    #[arg(long, env = "METADATA_DATA", default_value = "data/metadata.json")]
    pub metadata_data: PathBuf,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "career_tree")]
    pub mongodb_db: String,

    /// Development mode: MongoDB is optional, submissions fall back to memory
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    /// Submissions allowed per interval, shared by every client
    #[arg(long, env = "RATE_LIMIT_TOKENS", default_value = "7")]
    pub rate_limit_tokens: u32,

    /// Seconds for the rate limit bucket to refill completely
    #[arg(long, env = "RATE_LIMIT_INTERVAL_SECS", default_value = "60")]
    pub rate_limit_interval_secs: u64,

    /// Largest accepted request body in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "65536")]
    pub max_body_bytes: usize,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.rate_limit_tokens == 0 {
            return Err("RATE_LIMIT_TOKENS must be at least 1".to_string());
        }

        if self.rate_limit_interval_secs == 0 {
            return Err("RATE_LIMIT_INTERVAL_SECS must be at least 1".to_string());
        }

        if self.max_body_bytes < MIN_BODY_BYTES {
            return Err(format!("MAX_BODY_BYTES must be at least {}", MIN_BODY_BYTES));
        }

        Ok(())
    }

    pub fn rate_limit_interval(&self) -> Duration {
        Duration::from_secs(self.rate_limit_interval_secs)
    }

    pub fn dataset_source(&self) -> DatasetSource {
        DatasetSource::new(&self.tree_data, &self.metadata_data)
    }
}
