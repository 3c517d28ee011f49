//! Binary resource directory: `<resource_dir>/<action_id>/<chunk_id>.<ext>`.
//! Collisions are avoided by construction since the chunk id is
//! monotonically assigned per action.

use std::path::{Path, PathBuf};

use tokio::fs;

pub async fn write_binary_chunk(
    resource_dir: &Path,
    action_id: i64,
    chunk_id: i64,
    ext: &str,
    bytes: &[u8],
) -> std::io::Result<PathBuf> {
    let dir = resource_dir.join(action_id.to_string());
    fs::create_dir_all(&dir).await?;

    let path = dir.join(format!("{chunk_id}.{ext}"));
    fs::write(&path, bytes).await?;
    Ok(path)
}
