use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::domain::columns::{
    COL_ADDRESS, COL_ASSESSED_VALUE, COL_LIST_YEAR, COL_PROPERTY_TYPE, COL_SALES_RATIO,
    COL_SALE_AMOUNT, COL_SERIAL_NUMBER, COL_TOWN,
};

/// 原始資料列：表頭欄位名稱對應原始文字值，缺欄就是缺鍵
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
    pub fields: HashMap<String, String>,
}

impl SaleRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// 投影後的輸出列，欄位宣告順序即 JSON 鍵順序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedRecord {
    pub serial_number: Option<String>,
    pub list_year: Option<serde_json::Number>,
    pub town: Option<String>,
    pub property_type: Option<String>,
    pub assessed_value: Option<serde_json::Number>,
    pub sale_amount: Option<serde_json::Number>,
    pub sales_ratio: Option<serde_json::Number>,
    pub address: Option<String>,
}

impl ProjectedRecord {
    /// 從原始列建立輸出列，回傳 (輸出列, 轉型失敗而置 null 的欄位數)
    pub fn from_record(record: &SaleRecord) -> (Self, usize) {
        let mut nulled = 0usize;
        let mut numeric = |raw: Option<&str>, always_float: bool| match raw {
            Some(text) => match coerce_numeric(text, always_float) {
                Some(number) => Some(number),
                None => {
                    nulled += 1;
                    None
                }
            },
            // 來源就缺欄：輸出 null 但不算轉型失敗
            None => None,
        };

        let list_year = numeric(record.field(COL_LIST_YEAR), false);
        let assessed_value = numeric(record.field(COL_ASSESSED_VALUE), false);
        let sale_amount = numeric(record.field(COL_SALE_AMOUNT), false);
        let sales_ratio = numeric(record.field(COL_SALES_RATIO), true);

        let projected = Self {
            serial_number: record.field(COL_SERIAL_NUMBER).map(str::to_string),
            list_year,
            town: record.field(COL_TOWN).map(str::to_string),
            property_type: record.field(COL_PROPERTY_TYPE).map(str::to_string),
            assessed_value,
            sale_amount,
            sales_ratio,
            address: record.field(COL_ADDRESS).map(str::to_string),
        };
        (projected, nulled)
    }
}

/// 數值轉型：文字含 '.' 或欄位本身是比率時走浮點，否則走整數
/// "100" 一律是整數 100，不會變成 100.0；失敗回 None
pub fn coerce_numeric(raw: &str, always_float: bool) -> Option<serde_json::Number> {
    let trimmed = raw.trim();
    if always_float || trimmed.contains('.') {
        let value: f64 = trimmed.parse().ok()?;
        // JSON 不能表示 NaN/inf
        serde_json::Number::from_f64(value)
    } else {
        let value: i64 = trimmed.parse().ok()?;
        Some(serde_json::Number::from(value))
    }
}

/// 過濾條件，單次執行期間不可變
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub town: Option<String>,
    pub property_type: Option<String>,
}

impl FilterCriteria {
    pub fn is_active(&self) -> bool {
        self.start_year.is_some()
            || self.end_year.is_some()
            || self.town.is_some()
            || self.property_type.is_some()
    }

    /// 檢查順序固定：年份 -> 城鎮 -> 物件類型，回傳第一個不符的原因
    pub fn evaluate(&self, record: &SaleRecord) -> Option<FilterReason> {
        if self.start_year.is_some() || self.end_year.is_some() {
            let year = record
                .field(COL_LIST_YEAR)
                .and_then(|raw| raw.trim().parse::<i32>().ok());
            let year = match year {
                Some(year) => year,
                None => return Some(FilterReason::YearUnparseable),
            };
            if let Some(start) = self.start_year {
                if year < start {
                    return Some(FilterReason::YearOutOfRange);
                }
            }
            if let Some(end) = self.end_year {
                if year > end {
                    return Some(FilterReason::YearOutOfRange);
                }
            }
        }

        if let Some(town) = &self.town {
            // 缺欄視為空字串，永遠比不上非空的條件
            let actual = record.field(COL_TOWN).unwrap_or("");
            if actual.to_lowercase() != town.to_lowercase() {
                return Some(FilterReason::TownMismatch);
            }
        }

        if let Some(property_type) = &self.property_type {
            let actual = record.field(COL_PROPERTY_TYPE).unwrap_or("");
            if actual.to_lowercase() != property_type.to_lowercase() {
                return Some(FilterReason::PropertyTypeMismatch);
            }
        }

        None
    }
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_active() {
            return write!(f, "none");
        }
        let mut parts = Vec::new();
        match (self.start_year, self.end_year) {
            (Some(start), Some(end)) => parts.push(format!("years {}-{}", start, end)),
            (Some(start), None) => parts.push(format!("years {}-max", start)),
            (None, Some(end)) => parts.push(format!("years min-{}", end)),
            (None, None) => {}
        }
        if let Some(town) = &self.town {
            parts.push(format!("town \"{}\"", town));
        }
        if let Some(property_type) = &self.property_type {
            parts.push(format!("type \"{}\"", property_type));
        }
        write!(f, "{}", parts.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterReason {
    YearUnparseable,
    YearOutOfRange,
    TownMismatch,
    PropertyTypeMismatch,
}

/// 每列三種結局：通過、被過濾、或通過但有欄位轉型失敗置 null
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Accepted {
        record: ProjectedRecord,
        nulled_fields: usize,
    },
    Filtered(FilterReason),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformStats {
    pub rows_in: usize,
    pub accepted: usize,
    pub year_unparseable: usize,
    pub year_out_of_range: usize,
    pub town_mismatch: usize,
    pub property_type_mismatch: usize,
    pub coerced_nulls: usize,
}

impl TransformStats {
    pub fn record(&mut self, outcome: &RowOutcome) {
        self.rows_in += 1;
        match outcome {
            RowOutcome::Accepted { nulled_fields, .. } => {
                self.accepted += 1;
                self.coerced_nulls += nulled_fields;
            }
            RowOutcome::Filtered(reason) => match reason {
                FilterReason::YearUnparseable => self.year_unparseable += 1,
                FilterReason::YearOutOfRange => self.year_out_of_range += 1,
                FilterReason::TownMismatch => self.town_mismatch += 1,
                FilterReason::PropertyTypeMismatch => self.property_type_mismatch += 1,
            },
        }
    }

    pub fn filtered(&self) -> usize {
        self.year_unparseable + self.year_out_of_range + self.town_mismatch
            + self.property_type_mismatch
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: Vec<ProjectedRecord>,
    pub stats: TransformStats,
}
