//! Configuration schema definitions.
//!
//! The route file keeps the key casing of existing deployments: `Port`,
//! `Routes` and `Active` are capitalized, `source` and `dest` are not.
//! Both casings are accepted on read.

use serde::{Deserialize, Serialize};

/// Listening port used when the file does not name one.
pub const DEFAULT_PORT: u16 = 8080;

/// A (source host, destination URL, active flag) triple.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Route {
    /// Lowercase `host[:port]` matched exactly against the request host.
    #[serde(alias = "Source")]
    pub source: String,

    /// Base URL requests are forwarded to.
    #[serde(alias = "Dest")]
    pub dest: String,

    /// Inactive routes stay in the table but are skipped by dispatch.
    #[serde(rename = "Active", alias = "active", default)]
    pub active: bool,
}

/// On-disk document: `{ "Port": 8080, "Routes": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConfigFile {
    #[serde(rename = "Port", alias = "port", default = "default_port")]
    pub port: u16,

    #[serde(rename = "Routes", alias = "routes", default)]
    pub routes: Vec<Route>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl ConfigFile {
    /// Starter configuration written by `portal template`.
    pub fn template() -> Self {
        Self {
            port: DEFAULT_PORT,
            routes: vec![
                Route {
                    source: "localhost:8080".to_string(),
                    dest: "http://localhost:3000".to_string(),
                    active: true,
                },
                Route {
                    source: "127.0.0.1:8080".to_string(),
                    dest: "http://127.0.0.1:3001".to_string(),
                    active: false,
                },
            ],
        }
    }
}

/// Borrowed view used when saving, so the table is not cloned under its lock.
#[derive(Serialize)]
pub(crate) struct ConfigFileRef<'a> {
    #[serde(rename = "Port")]
    pub port: u16,

    #[serde(rename = "Routes")]
    pub routes: &'a [Route],
}
