use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    // 讀取走呼叫者給的路徑（絕對或相對於工作目錄），不掛在輸出目錄下
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        match fs::read(path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(EtlError::SourceNotFound {
                path: path.to_string(),
            }),
            Err(e) => Err(EtlError::ReadFailure {
                path: path.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    // 寫入以輸出目錄為根，必要時建立父目錄
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| EtlError::WriteFailure {
                path: full_path.display().to_string(),
                reason: e.to_string(),
            })?;
        }

        fs::write(&full_path, data).map_err(|e| EtlError::WriteFailure {
            path: full_path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(())
    }
}
