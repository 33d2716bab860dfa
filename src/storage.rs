use crate::errors::TallyError;
use crate::models::TallyData;
use crate::tally::TallyStore;
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

/// Loads the store at startup. Missing, unreadable, or malformed files all
/// yield an empty store; a bad file is never partially adopted.
pub async fn load_data(path: &Path) -> TallyStore {
    match read_snapshot(path).await {
        Ok(Some(data)) => {
            info!("loaded tally data from {}", path.display());
            TallyStore::from_data(data)
        }
        Ok(None) => {
            info!("no tally data at {}, starting empty", path.display());
            TallyStore::new()
        }
        Err(err) => {
            error!("{err}; starting with an empty store");
            TallyStore::new()
        }
    }
}

/// Creates the directory holding the data file. Failure leaves the store
/// usable in memory; every later save reports it again.
pub async fn ensure_data_dir(path: &Path) -> Result<(), TallyError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(parent)
        .await
        .map_err(|source| TallyError::Persistence {
            path: parent.to_path_buf(),
            source,
        })
}

pub async fn read_snapshot(path: &Path) -> Result<Option<TallyData>, TallyError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(TallyError::Persistence {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| TallyError::MalformedSnapshot {
            path: path.to_path_buf(),
            source,
        })
}

pub async fn persist_data(path: &Path, data: &TallyData) -> Result<(), TallyError> {
    let persistence = |source: std::io::Error| TallyError::Persistence {
        path: path.to_path_buf(),
        source,
    };
    let payload = serde_json::to_vec_pretty(data).map_err(|err| persistence(err.into()))?;
    fs::write(path, payload).await.map_err(persistence)?;
    Ok(())
}
