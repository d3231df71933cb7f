//! Command line and environment configuration

use std::net::IpAddr;

use clap::Parser;
use reqwest::Url;

use crate::client::DEFAULT_LIFETIME;

/// Keeps a NAT-PMP TCP mapping alive and points Deluge's incoming port at it
#[derive(Parser, Debug, Clone)]
#[command(name = "deluge-incoming-port", version)]
pub struct Args {
    /// Address of the NAT-PMP gateway
    #[arg(long, env = "NATPMP_GATEWAY")]
    pub gateway: IpAddr,

    /// Base URL of the Deluge web UI
    #[arg(long, env = "DELUGE_URL", default_value = "http://localhost:8112")]
    pub deluge_url: Url,

    /// Password of the Deluge web UI, if it requires one
    #[arg(long, env = "DELUGE_PASSWORD", hide_env_values = true)]
    pub deluge_password: Option<String>,

    /// Lifetime to request for the mapping, in seconds
    #[arg(long, env = "NATPMP_LIFETIME", default_value_t = DEFAULT_LIFETIME)]
    pub lifetime: u32,

    /// Log every request and response
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Default log filter when `RUST_LOG` isn't set
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "trace"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["deluge-incoming-port", "--gateway", "10.2.0.1"]).unwrap();
        assert_eq!(args.gateway, "10.2.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(args.deluge_url.as_str(), "http://localhost:8112/");
        assert_eq!(args.deluge_password, None);
        assert_eq!(args.lifetime, 360);
        assert_eq!(args.log_filter(), "info");
    }

    #[test]
    fn flags() {
        let args = Args::try_parse_from([
            "deluge-incoming-port",
            "--gateway",
            "fd00::1",
            "--deluge-url",
            "http://deluge:8112/web",
            "--deluge-password",
            "hunter2",
            "--lifetime",
            "60",
            "--verbose",
        ])
        .unwrap();
        assert!(args.gateway.is_ipv6());
        assert_eq!(args.deluge_url.path(), "/web");
        assert_eq!(args.deluge_password.as_deref(), Some("hunter2"));
        assert_eq!(args.lifetime, 60);
        assert_eq!(args.log_filter(), "trace");
    }

    #[test]
    fn gateway_must_be_an_address() {
        let err = Args::try_parse_from(["deluge-incoming-port", "--gateway", "router.lan"]);
        assert!(err.is_err());
    }
}
