//! Durable, redundant storage of the bearer token across restarts.
//!
//! Two independent slots hold the same credential: a plain token file with no
//! expiry, and a fallback record carrying a 7-day expiry set at write time.
//! Storage errors are swallowed and logged, never propagated; losing
//! persistence only means the next start requires a fresh login.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tokio::fs;

const PRIMARY_FILE: &str = "session.token";
const FALLBACK_FILE: &str = "session.bak";

const FALLBACK_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Serialize, Deserialize)]
struct FallbackRecord {
    token: String,
    expires: SystemTime,
}

#[derive(Debug, Clone)]
pub struct TokenStore {
    root: PathBuf,
}

impl TokenStore {
    pub fn new(root: impl Into<PathBuf>) -> TokenStore {
        TokenStore { root: root.into() }
    }

    fn primary(&self) -> PathBuf {
        self.root.join(PRIMARY_FILE)
    }

    fn fallback(&self) -> PathBuf {
        self.root.join(FALLBACK_FILE)
    }

    /// Writes the token to both slots. Infallible from the caller's view.
    pub async fn save(&self, token: &str) {
        if let Err(e) = fs::create_dir_all(&self.root).await {
            log::warn!("Unable to create session data directory {}: {e}", self.root.display());
        }

        if let Err(e) = fs::write(self.primary(), token).await {
            log::warn!("Unable to persist session token: {e}");
        }

        let record = FallbackRecord {
            token: token.to_owned(),
            expires: SystemTime::now() + FALLBACK_TTL,
        };

        match serde_json::to_vec(&record) {
            Ok(bytes) => {
                if let Err(e) = fs::write(self.fallback(), bytes).await {
                    log::warn!("Unable to persist fallback session token: {e}");
                }
            }
            Err(e) => log::warn!("Unable to encode fallback session token: {e}"),
        }
    }

    /// Returns the primary slot's token when present and non-empty, the
    /// unexpired fallback otherwise.
    pub async fn load(&self) -> Option<String> {
        match fs::read_to_string(self.primary()).await {
            Ok(raw) => {
                let token = raw.trim();
                if !token.is_empty() {
                    return Some(token.to_owned());
                }
            }
            Err(e) if e.kind() != ErrorKind::NotFound => {
                log::warn!("Unable to read session token: {e}");
            }
            Err(_) => {}
        }

        let raw = fs::read(self.fallback()).await.ok()?;
        let record: FallbackRecord = serde_json::from_slice(&raw).ok()?;

        if record.expires <= SystemTime::now() {
            log::debug!("Fallback session token expired");
            return None;
        }

        if record.token.is_empty() {
            return None;
        }

        Some(record.token)
    }

    /// Removes both slots. Clearing an already-empty store is not an error.
    pub async fn clear(&self) {
        for path in [self.primary(), self.fallback()] {
            if let Err(e) = fs::remove_file(&path).await {
                if e.kind() != ErrorKind::NotFound {
                    log::warn!("Unable to remove {}: {e}", path.display());
                }
            }
        }
    }
}
