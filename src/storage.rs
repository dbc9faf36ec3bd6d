use log::warn;
use std::fs;
use std::io;
use std::path::PathBuf;

/// the most a flag register dump can hold, V0-VF
pub const MAX_FLAG_BYTES: usize = 16;

/// where FileFlagStore keeps its dump unless told otherwise
pub const DEFAULT_FLAG_FILE: &str = "chipdata";

/// Somewhere to keep the SUPER-CHIP "flag registers" (FX75/FX85) between runs.
pub trait FlagStore {
    /// replace whatever is stored with these bytes
    fn save(&mut self, data: &[u8]) -> Result<(), io::Error>;

    /// what was stored last, or None if nothing ever was
    fn load(&mut self) -> Result<Option<Vec<u8>>, io::Error>;
}

/// Fill `regs` from a stored dump. Nothing stored means zeroes; a dump shorter
/// than `regs` leaves the remaining registers alone. An oversized dump is
/// suspicious but still used.
pub fn restore_into(stored: Option<Vec<u8>>, regs: &mut [u8]) {
    match stored {
        None => regs.fill(0),
        Some(data) => {
            if data.len() > MAX_FLAG_BYTES {
                warn!(
                    "flag register dump is {} bytes, expected at most {}; possibly corrupted",
                    data.len(),
                    MAX_FLAG_BYTES
                );
            }
            let n = data.len().min(regs.len());
            regs[..n].copy_from_slice(&data[..n]);
        }
    }
}

/// keeps the dump in memory; lost when the process ends
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    data: Option<Vec<u8>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        MemoryFlagStore::default()
    }
}

impl FlagStore for MemoryFlagStore {
    fn save(&mut self, data: &[u8]) -> Result<(), io::Error> {
        self.data = Some(data.to_vec());
        Ok(())
    }

    fn load(&mut self) -> Result<Option<Vec<u8>>, io::Error> {
        Ok(self.data.clone())
    }
}

/// keeps the dump as raw bytes in a file
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileFlagStore { path: path.into() }
    }
}

impl Default for FileFlagStore {
    fn default() -> Self {
        FileFlagStore::new(DEFAULT_FLAG_FILE)
    }
}

impl FlagStore for FileFlagStore {
    fn save(&mut self, data: &[u8]) -> Result<(), io::Error> {
        fs::write(&self.path, data)
    }

    fn load(&mut self) -> Result<Option<Vec<u8>>, io::Error> {
        match fs::read(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
