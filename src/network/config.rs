// Network configuration
// Socket tuning and framing limits shared by every listening service

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Enable TCP_NODELAY on accepted and outbound streams (disable Nagle's algorithm)
    #[serde(default = "default_true")]
    pub tcp_nodelay: bool,

    /// Enable SO_REUSEADDR on listening sockets
    #[serde(default = "default_true")]
    pub so_reuseaddr: bool,

    /// Enable TCP keepalive on listening sockets
    #[serde(default = "default_true")]
    pub keepalive: bool,

    /// Pending connection backlog
    #[serde(default = "default_backlog")]
    pub backlog: i32,

    /// Longest accepted request line in bytes (excluding the newline)
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
}

fn default_true() -> bool { true }
fn default_backlog() -> i32 { 1024 }
fn default_max_line_length() -> usize { 64 * 1024 }

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            tcp_nodelay: default_true(),
            so_reuseaddr: default_true(),
            keepalive: default_true(),
            backlog: default_backlog(),
            max_line_length: default_max_line_length(),
        }
    }
}
