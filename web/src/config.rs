//! Command line flags for the web server.
//!
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use clap::Parser;
use engine_config::CentralConfig;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "dropline-web")]
#[command(about = "Real-time multiplayer Connect 4 server")]
pub struct Args {
    /// Address to bind (overrides web.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides web.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Log level: trace, debug, info, warn, error (overrides common.log_level)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    pub fn apply(&self, config: &mut CentralConfig) {
        if let Some(host) = &self.host {
            config.web.host = host.clone();
        }
        if let Some(port) = self.port {
            config.web.port = port;
        }
        if let Some(level) = &self.log_level {
            config.common.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from(["dropline-web", "--port", "9000", "--log-level", "debug"]);
        let mut config = CentralConfig::default();
        args.apply(&mut config);

        assert_eq!(config.web.port, 9000);
        assert_eq!(config.common.log_level, "debug");
        assert_eq!(config.web.host, "0.0.0.0");
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = Args::parse_from(["dropline-web"]);
        let mut config = CentralConfig::default();
        config.web.port = 1234;
        args.apply(&mut config);
        assert_eq!(config.web.port, 1234);
    }
}
