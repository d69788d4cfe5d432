use bytes::Bytes;
use gallery_storage::{FilesystemBackend, MemoryBackend, PermanentStore};
use std::sync::Arc;
use tempfile::TempDir;

pub const GATEWAY: &str = "https://gateway.test";

/// Generate deterministic test data using a seeded pseudo-random generator
/// Same seed produces same output (reproducible tests)
pub fn seeded_bytes(seed: u64, len: usize) -> Bytes {
    let mut data = vec![0u8; len];
    let mut state = seed;

    // Simple LCG (Linear Congruential Generator)
    for chunk in data.chunks_mut(8) {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let bytes = state.to_le_bytes();
        for (i, byte) in chunk.iter_mut().enumerate() {
            *byte = bytes[i % 8];
        }
    }

    Bytes::from(data)
}

/// One instance of every backend. Keep the `TempDir` alive for the test.
#[allow(dead_code)]
pub async fn all_backends() -> (Vec<Arc<dyn PermanentStore>>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let filesystem = FilesystemBackend::new(dir.path(), GATEWAY).await.unwrap();
    let stores: Vec<Arc<dyn PermanentStore>> =
        vec![Arc::new(MemoryBackend::new(GATEWAY)), Arc::new(filesystem)];
    (stores, dir)
}
