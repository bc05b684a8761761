use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Where the durable copy of the user collection lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MirrorBackend {
    /// Memory only; nothing survives a restart.
    #[default]
    None,
    /// In-process document collection.
    Memory,
    /// JSON collection under `data_dir`.
    File,
    /// MongoDB collection at `mongo_uri` (needs the `mongo` feature).
    Mongo,
}

/// Service configuration
///
/// Every option can be given as a flag or through its `USERDB_*` environment
/// variable; flags win. A `.env` file is read before parsing.
#[derive(Debug, Clone, Parser)]
#[command(name = "userdb")]
#[command(about = "In-memory user CRUD service with an optional durable mirror")]
pub struct AppConfig {
    /// Address to listen on
    #[arg(long = "bind", env = "USERDB_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// Mirror backend
    #[arg(long, env = "USERDB_MIRROR", value_enum, default_value_t = MirrorBackend::None)]
    pub mirror: MirrorBackend,

    /// Root directory of the file mirror
    #[arg(long, env = "USERDB_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Connection string of the mongo mirror
    #[arg(long, env = "USERDB_MONGO_URI", default_value = "mongodb://localhost:27017")]
    pub mongo_uri: String,

    /// Mirror database name
    #[arg(long, env = "USERDB_DATABASE", default_value = "UsersDB")]
    pub database: String,

    /// Mirror collection name
    #[arg(long, env = "USERDB_COLLECTION", default_value = "Users")]
    pub collection: String,

    /// Deadline for the startup mirror scan, in seconds
    #[arg(long, env = "USERDB_STARTUP_TIMEOUT_SECS", default_value_t = 100)]
    pub startup_timeout_secs: u64,

    /// Also write updates through to the mirror
    #[arg(long, env = "USERDB_MIRROR_UPDATES", default_value_t = false)]
    pub mirror_updates: bool,
}

impl AppConfig {
    /// Load `.env`, then parse flags and environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }

    /// Mirror namespace in `database.collection` form.
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.collection)
    }

    pub fn validate(&self) -> Result<()> {
        if self.startup_timeout_secs == 0 {
            bail!("startup timeout must be > 0");
        }
        if self.mirror != MirrorBackend::None {
            if self.database.trim().is_empty() {
                bail!("mirror database name cannot be empty");
            }
            if self.collection.trim().is_empty() {
                bail!("mirror collection name cannot be empty");
            }
        }
        if self.mirror == MirrorBackend::Mongo && self.mongo_uri.trim().is_empty() {
            bail!("mongo mirror needs a connection string");
        }
        Ok(())
    }

    pub fn mirror(mut self, backend: MirrorBackend) -> Self {
        self.mirror = backend;
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn startup_timeout_secs(mut self, secs: u64) -> Self {
        self.startup_timeout_secs = secs;
        self
    }

    pub fn mirror_updates(mut self, enabled: bool) -> Self {
        self.mirror_updates = enabled;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            mirror: MirrorBackend::None,
            data_dir: PathBuf::from("./data"),
            mongo_uri: "mongodb://localhost:27017".to_string(),
            database: "UsersDB".to_string(),
            collection: "Users".to_string(),
            startup_timeout_secs: 100,
            mirror_updates: false,
        }
    }
}
