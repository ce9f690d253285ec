use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "favicon-aggregator",
    version,
    about = "Look up a site's favicon from several providers at once"
)]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Per-provider request timeout in milliseconds
    #[arg(long, env = "FETCH_TIMEOUT_MS", default_value_t = 5000)]
    pub fetch_timeout_ms: u64,

    /// User-Agent sent to favicon providers
    #[arg(long, env = "USER_AGENT", default_value = "FaviconAggregator/1.0")]
    pub user_agent: String,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
