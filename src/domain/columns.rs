/// 來源欄位名稱（區分大小寫，必須與匯出檔的表頭完全一致）
pub const COL_SERIAL_NUMBER: &str = "Serial Number";
pub const COL_LIST_YEAR: &str = "List Year";
pub const COL_TOWN: &str = "Town";
pub const COL_PROPERTY_TYPE: &str = "Property Type";
pub const COL_ASSESSED_VALUE: &str = "Assessed Value";
pub const COL_SALE_AMOUNT: &str = "Sale Amount";
pub const COL_SALES_RATIO: &str = "Sales Ratio";
pub const COL_ADDRESS: &str = "Address";

/// 固定投影欄位，輸出順序即此順序
pub const PROJECTION_FIELDS: [&str; 8] = [
    COL_SERIAL_NUMBER,
    COL_LIST_YEAR,
    COL_TOWN,
    COL_PROPERTY_TYPE,
    COL_ASSESSED_VALUE,
    COL_SALE_AMOUNT,
    COL_SALES_RATIO,
    COL_ADDRESS,
];

/// 來源欄位名稱轉輸出鍵：小寫 + 空白轉底線
/// e.g. "Sale Amount" -> "sale_amount"
pub fn output_key(column: &str) -> String {
    column.to_lowercase().replace(' ', "_")
}

/// 回傳表頭中缺少的投影欄位（僅供檢查顯示，轉換本身容忍缺欄）
pub fn missing_columns(headers: &[String]) -> Vec<&'static str> {
    PROJECTION_FIELDS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .copied()
        .collect()
}
