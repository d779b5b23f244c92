use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// Default per-request timeout for model connections.
pub const DEFAULT_CONNECTION_TIMEOUT_SEC: u64 = 120;

/// Top-level contents of `aish.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub default_agent: Option<String>,
    #[serde(default, deserialize_with = "ordered_connections")]
    pub connections: Vec<NamedConnection>,
}

impl AppConfig {
    #[must_use]
    pub fn connection(&self, name: &str) -> Option<&NamedConnection> {
        self.connections
            .iter()
            .find(|connection| connection.name == name)
    }

    /// First connection in file order.
    #[must_use]
    pub fn first_connection(&self) -> Option<&NamedConnection> {
        self.connections.first()
    }
}

/// One model backend entry under `connections`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Connection {
    pub model: String,
    pub provider: String,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub timeout_sec: Option<u64>,
    #[serde(default)]
    pub temperature: Option<f64>,
}

impl Connection {
    #[must_use]
    pub fn timeout_sec(&self) -> u64 {
        self.timeout_sec.unwrap_or(DEFAULT_CONNECTION_TIMEOUT_SEC)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedConnection {
    pub name: String,
    pub connection: Connection,
}

fn ordered_connections<'de, D>(deserializer: D) -> Result<Vec<NamedConnection>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ConnectionsVisitor;

    impl<'de> Visitor<'de> for ConnectionsVisitor {
        type Value = Vec<NamedConnection>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a map of connection name to connection settings")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut connections: Vec<NamedConnection> = Vec::new();
            while let Some((name, connection)) = map.next_entry::<String, Connection>()? {
                if connections.iter().any(|existing| existing.name == name) {
                    return Err(serde::de::Error::custom(format!(
                        "duplicate connection '{name}'"
                    )));
                }
                connections.push(NamedConnection { name, connection });
            }
            Ok(connections)
        }
    }

    deserializer.deserialize_map(ConnectionsVisitor)
}
