// ABOUTME: SSH server address for remote-copy rollouts.
// ABOUTME: Parses formats like "host", "user@host", "host:port", "user@host:port".

use serde::Deserialize;

use crate::ssh::SessionConfig;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub user: Option<String>,
}

fn default_port() -> u16 {
    22
}

impl ServerConfig {
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("server address cannot be empty".to_string());
        }

        // Parse format: [user@]host[:port]
        let (user_part, rest) = if let Some(at_pos) = s.find('@') {
            (Some(&s[..at_pos]), &s[at_pos + 1..])
        } else {
            (None, s)
        };

        let (host, port) = if let Some(colon_pos) = rest.rfind(':') {
            let port_str = &rest[colon_pos + 1..];
            let port = port_str
                .parse::<u16>()
                .map_err(|_| format!("invalid port: {}", port_str))?;
            (&rest[..colon_pos], port)
        } else {
            (rest, 22)
        };

        if host.is_empty() {
            return Err("hostname cannot be empty".to_string());
        }
        if user_part.is_some_and(str::is_empty) {
            return Err("user cannot be empty".to_string());
        }

        Ok(ServerConfig {
            host: host.to_string(),
            port,
            user: user_part.map(|s| s.to_string()),
        })
    }

    /// Login user: configured, else `$USER`, else `root`.
    pub fn user(&self) -> String {
        self.user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "root".to_string())
    }

    /// Session settings for this server.
    pub fn ssh_session_config(&self) -> SessionConfig {
        SessionConfig::new(&self.host, self.user()).port(self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_only() {
        let server = ServerConfig::parse("tomcat.internal").unwrap();
        assert_eq!(server.host, "tomcat.internal");
        assert_eq!(server.port, 22);
        assert_eq!(server.user, None);
    }

    #[test]
    fn parses_user_host_and_port() {
        let server = ServerConfig::parse("deploy@10.0.0.5:2222").unwrap();
        assert_eq!(server.host, "10.0.0.5");
        assert_eq!(server.port, 2222);
        assert_eq!(server.user.as_deref(), Some("deploy"));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(ServerConfig::parse("").is_err());
        assert!(ServerConfig::parse("deploy@").is_err());
        assert!(ServerConfig::parse("@host").is_err());
        assert!(ServerConfig::parse("host:notaport").is_err());
    }

    #[test]
    fn session_config_carries_user_and_port() {
        let server = ServerConfig::parse("tomcat@app1:2200").unwrap();
        let session = server.ssh_session_config();
        assert_eq!(session.host, "app1");
        assert_eq!(session.user, "tomcat");
        assert_eq!(session.port, 2200);
    }
}
