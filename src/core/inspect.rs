use crate::core::Storage;
use crate::utils::error::{EtlError, Result};

/// 只讀表頭那一列，不過濾、不投影；空檔案回傳空表頭
pub async fn read_header<S: Storage>(
    storage: &S,
    source_path: &str,
    delimiter: u8,
) -> Result<Vec<String>> {
    let bytes = storage.read_file(source_path).await?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_reader(bytes.as_slice());

    let headers = reader
        .headers()
        .map_err(|e| EtlError::ReadFailure {
            path: source_path.to_string(),
            reason: e.to_string(),
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();

    Ok(headers)
}
