use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::PathBuf;

/// Magic number for store entries ("TPKV" in ASCII)
const MAGIC_NUMBER: [u8; 4] = [b'T', b'P', b'K', b'V'];

/// Current entry format version
const VERSION: u16 = 1;

/// Error type for store operations
#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    InvalidMagicNumber,
    InvalidVersion(u16),
    Truncated { expected: usize, found: usize },
    InvalidChecksum,
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::InvalidMagicNumber => write!(f, "Invalid magic number"),
            StoreError::InvalidVersion(v) => write!(f, "Invalid version: {}", v),
            StoreError::Truncated { expected, found } => {
                write!(f, "Truncated entry: expected {} bytes, found {}", expected, found)
            }
            StoreError::InvalidChecksum => write!(f, "Checksum mismatch"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Durable key-value store, one file per key
///
/// Each entry is framed as: magic, version (u16), payload length (u32),
/// payload, CRC32 of the payload. All integers little-endian.
#[derive(Debug, Clone)]
pub struct LocalStore {
    directory: PathBuf,
}

impl LocalStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Get the path to a key's entry file
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.kv", key))
    }

    /// Write a value, replacing any previous value for the key
    pub fn put(&self, key: &str, payload: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.directory)?;

        let mut file = File::create(self.entry_path(key))?;

        // Write header
        file.write_all(&MAGIC_NUMBER)?;
        file.write_all(&VERSION.to_le_bytes())?;
        file.write_all(&(payload.len() as u32).to_le_bytes())?;

        file.write_all(payload)?;

        let checksum = crc32fast::hash(payload);
        file.write_all(&checksum.to_le_bytes())?;

        file.sync_all()?;
        Ok(())
    }

    /// Read a value; Ok(None) if the key was never written
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut file = match File::open(self.entry_path(key)) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        decode_entry(&bytes).map(Some)
    }
}

fn decode_entry(bytes: &[u8]) -> Result<Vec<u8>, StoreError> {
    const HEADER_LEN: usize = 4 + 2 + 4;

    if bytes.len() < HEADER_LEN {
        return Err(StoreError::Truncated {
            expected: HEADER_LEN,
            found: bytes.len(),
        });
    }

    if bytes[0..4] != MAGIC_NUMBER {
        return Err(StoreError::InvalidMagicNumber);
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != VERSION {
        return Err(StoreError::InvalidVersion(version));
    }

    let payload_len = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
    let expected = HEADER_LEN + payload_len + 4;
    if bytes.len() != expected {
        return Err(StoreError::Truncated {
            expected,
            found: bytes.len(),
        });
    }

    let payload = &bytes[HEADER_LEN..HEADER_LEN + payload_len];
    let checksum_bytes = &bytes[HEADER_LEN + payload_len..];
    let expected_checksum = u32::from_le_bytes([
        checksum_bytes[0],
        checksum_bytes[1],
        checksum_bytes[2],
        checksum_bytes[3],
    ]);
    if crc32fast::hash(payload) != expected_checksum {
        return Err(StoreError::InvalidChecksum);
    }

    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, LocalStore) {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().join("store"));
        (dir, store)
    }

    #[test]
    fn test_put_and_get() {
        let (_dir, store) = setup_store();

        store.put("grid", b"[[0,1],[2,3]]").expect("Failed to write entry");
        let value = store.get("grid").expect("Failed to read entry");

        assert_eq!(value.as_deref(), Some(&b"[[0,1],[2,3]]"[..]));
        assert!(store.entry_path("grid").exists());
    }

    #[test]
    fn test_put_overwrites() {
        let (_dir, store) = setup_store();

        store.put("grid", b"first").unwrap();
        store.put("grid", b"second value").unwrap();

        assert_eq!(store.get("grid").unwrap(), Some(b"second value".to_vec()));
    }

    #[test]
    fn test_missing_key() {
        let (_dir, store) = setup_store();

        // Store directory does not exist yet
        assert!(store.get("nothing").unwrap().is_none());

        store.put("grid", b"x").unwrap();
        assert!(store.get("nothing").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_payload_is_rejected() {
        let (_dir, store) = setup_store();
        store.put("grid", b"[[1,2,3]]").unwrap();

        // Flip a payload byte
        let path = store.entry_path("grid");
        let mut bytes = fs::read(&path).unwrap();
        bytes[11] ^= 0xff;
        fs::write(&path, bytes).unwrap();

        assert!(matches!(store.get("grid"), Err(StoreError::InvalidChecksum)));
    }

    #[test]
    fn test_bad_header_is_rejected() {
        let (dir, store) = setup_store();
        fs::create_dir_all(dir.path().join("store")).unwrap();

        fs::write(store.entry_path("magic"), b"NOPE\x01\x00\x00\x00\x00\x00").unwrap();
        assert!(matches!(store.get("magic"), Err(StoreError::InvalidMagicNumber)));

        fs::write(store.entry_path("version"), b"TPKV\x09\x00\x00\x00\x00\x00").unwrap();
        assert!(matches!(store.get("version"), Err(StoreError::InvalidVersion(9))));

        fs::write(store.entry_path("short"), b"TPKV").unwrap();
        assert!(matches!(store.get("short"), Err(StoreError::Truncated { .. })));
    }
}
