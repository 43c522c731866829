use crate::core::{ConfigProvider, Pipeline, SaleRecord, Storage, TransformResult};
use crate::domain::model::{FilterCriteria, ProjectedRecord, RowOutcome, TransformStats};
use crate::utils::error::{EtlError, Result};
use std::collections::HashMap;

pub struct ConvertPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ConvertPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

/// 單列的完整判定：先過濾、再投影與數值轉型
pub fn process_row(record: &SaleRecord, filters: &FilterCriteria) -> RowOutcome {
    if let Some(reason) = filters.evaluate(record) {
        return RowOutcome::Filtered(reason);
    }
    let (projected, nulled_fields) = ProjectedRecord::from_record(record);
    RowOutcome::Accepted {
        record: projected,
        nulled_fields,
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ConvertPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<SaleRecord>> {
        let source_path = self.config.source_path();
        tracing::debug!("📥 Reading source file: {}", source_path);

        let bytes = self.storage.read_file(source_path).await?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.config.delimiter())
            .from_reader(bytes.as_slice());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| EtlError::ReadFailure {
                path: source_path.to_string(),
                reason: e.to_string(),
            })?
            .iter()
            .map(|h| h.to_string())
            .collect();
        tracing::debug!("Header row has {} columns", headers.len());

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for row in reader.records() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    // 壞列跳過，不中斷整批
                    skipped += 1;
                    tracing::debug!("Skipping undecodable row: {}", e);
                    continue;
                }
            };

            // 表頭配對欄位值；短列尾端缺鍵，超出表頭的值忽略，同名欄位後者覆蓋前者
            let mut fields = HashMap::new();
            for (header, value) in headers.iter().zip(row.iter()) {
                fields.insert(header.clone(), value.to_string());
            }
            records.push(SaleRecord { fields });
        }

        if skipped > 0 {
            tracing::warn!("⚠️ Skipped {} undecodable rows", skipped);
        }
        tracing::debug!("Extracted {} rows", records.len());
        Ok(records)
    }

    async fn transform(&self, data: Vec<SaleRecord>) -> Result<TransformResult> {
        let filters = self.config.filters();
        let mut stats = TransformStats::default();
        let mut records = Vec::new();

        for record in &data {
            let outcome = process_row(record, filters);
            stats.record(&outcome);
            match outcome {
                RowOutcome::Accepted {
                    record,
                    nulled_fields,
                } => {
                    if nulled_fields > 0 {
                        tracing::debug!(
                            "Row kept with {} unparseable numeric fields set to null",
                            nulled_fields
                        );
                    }
                    records.push(record);
                }
                RowOutcome::Filtered(reason) => {
                    tracing::debug!("Row filtered: {:?}", reason);
                }
            }
        }

        tracing::debug!(
            "Filter breakdown - year out of range: {}, year unparseable: {}, town: {}, type: {}, nulled fields: {}",
            stats.year_out_of_range,
            stats.year_unparseable,
            stats.town_mismatch,
            stats.property_type_mismatch,
            stats.coerced_nulls
        );

        Ok(TransformResult { records, stats })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_file = self.config.output_file();
        let output_path = format!("{}/{}", self.config.output_path(), output_file);

        let json = if self.config.pretty_output() {
            serde_json::to_string_pretty(&result.records)?
        } else {
            serde_json::to_string(&result.records)?
        };

        tracing::debug!("💾 Writing {} bytes to {}", json.len(), output_path);
        self.storage.write_file(output_file, json.as_bytes()).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FilterReason;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put_file(&self, path: &str, data: &[u8]) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| EtlError::SourceNotFound {
                path: path.to_string(),
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        source_path: String,
        output_path: String,
        output_file: String,
        delimiter: u8,
        filters: FilterCriteria,
        pretty: bool,
    }

    impl MockConfig {
        fn new(filters: FilterCriteria) -> Self {
            Self {
                source_path: "sales.csv".to_string(),
                output_path: "test_output".to_string(),
                output_file: "out.json".to_string(),
                delimiter: b',',
                filters,
                pretty: true,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn source_path(&self) -> &str {
            &self.source_path
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_file(&self) -> &str {
            &self.output_file
        }

        fn delimiter(&self) -> u8 {
            self.delimiter
        }

        fn filters(&self) -> &FilterCriteria {
            &self.filters
        }

        fn pretty_output(&self) -> bool {
            self.pretty
        }
    }

    const SAMPLE_CSV: &str = "\
Serial Number,List Year,Town,Property Type,Assessed Value,Sale Amount,Sales Ratio,Address
20001,2018,Avon,Residential,150000,200000,0.75,123 Main St
20002,2020,Bristol,Commercial,300000,450000.5,0.66,9 Harbor Rd
20003,2015,Avon,Residential,90000,100000,0.9,77 Oak Ave
20004,2023,avon,Condo,120000,N/A,0.8,5 Pine Ct
";

    #[tokio::test]
    async fn test_extract_builds_records_from_header() {
        let storage = MockStorage::new();
        storage.put_file("sales.csv", SAMPLE_CSV.as_bytes()).await;
        let pipeline = ConvertPipeline::new(storage, MockConfig::new(FilterCriteria::default()));

        let rows = pipeline.extract().await.unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].field("Serial Number"), Some("20001"));
        assert_eq!(rows[0].field("Town"), Some("Avon"));
        assert_eq!(rows[3].field("Sale Amount"), Some("N/A"));
    }

    #[tokio::test]
    async fn test_extract_short_rows_leave_fields_absent() {
        let csv = "Serial Number,List Year,Town\n1,2020\n2,2021,Avon,EXTRA\n";
        let storage = MockStorage::new();
        storage.put_file("sales.csv", csv.as_bytes()).await;
        let pipeline = ConvertPipeline::new(storage, MockConfig::new(FilterCriteria::default()));

        let rows = pipeline.extract().await.unwrap();

        assert_eq!(rows.len(), 2);
        // 短列：尾端欄位缺鍵
        assert_eq!(rows[0].field("Serial Number"), Some("1"));
        assert_eq!(rows[0].field("Town"), None);
        // 超出表頭的值被忽略
        assert_eq!(rows[1].field("Town"), Some("Avon"));
        assert_eq!(rows[1].fields.len(), 3);
    }

    #[tokio::test]
    async fn test_extract_skips_undecodable_rows() {
        let bytes = b"Serial Number,Town\n1,Avon\n2,\xff\xfe\n3,Bristol\n";
        let storage = MockStorage::new();
        storage.put_file("sales.csv", bytes).await;
        let pipeline = ConvertPipeline::new(storage, MockConfig::new(FilterCriteria::default()));

        let rows = pipeline.extract().await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].field("Town"), Some("Avon"));
        assert_eq!(rows[1].field("Town"), Some("Bristol"));
    }

    #[tokio::test]
    async fn test_extract_missing_source_is_typed_error() {
        let storage = MockStorage::new();
        let pipeline = ConvertPipeline::new(storage, MockConfig::new(FilterCriteria::default()));

        let result = pipeline.extract().await;

        assert!(matches!(
            result,
            Err(EtlError::SourceNotFound { ref path }) if path == "sales.csv"
        ));
    }

    #[tokio::test]
    async fn test_extract_empty_file_yields_no_rows() {
        let storage = MockStorage::new();
        storage.put_file("sales.csv", b"").await;
        let pipeline = ConvertPipeline::new(storage, MockConfig::new(FilterCriteria::default()));

        let rows = pipeline.extract().await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_extract_honors_delimiter() {
        let csv = "Serial Number;Town\n1;Avon\n";
        let storage = MockStorage::new();
        storage.put_file("sales.csv", csv.as_bytes()).await;
        let mut config = MockConfig::new(FilterCriteria::default());
        config.delimiter = b';';
        let pipeline = ConvertPipeline::new(storage, config);

        let rows = pipeline.extract().await.unwrap();
        assert_eq!(rows[0].field("Town"), Some("Avon"));
    }

    #[test]
    fn test_process_row_accepted() {
        let record = SaleRecord::from_pairs(&[
            ("Serial Number", "1"),
            ("List Year", "2020"),
            ("Town", "Avon"),
            ("Assessed Value", "100"),
        ]);
        let outcome = process_row(&record, &FilterCriteria::default());
        match outcome {
            RowOutcome::Accepted {
                record,
                nulled_fields,
            } => {
                assert_eq!(nulled_fields, 0);
                assert_eq!(record.assessed_value.unwrap().as_i64(), Some(100));
            }
            other => panic!("expected accepted row, got {:?}", other),
        }
    }

    #[test]
    fn test_process_row_filtered_before_projection() {
        let record = SaleRecord::from_pairs(&[("List Year", "1999"), ("Town", "Avon")]);
        let filters = FilterCriteria {
            start_year: Some(2018),
            ..Default::default()
        };
        assert_eq!(
            process_row(&record, &filters),
            RowOutcome::Filtered(FilterReason::YearOutOfRange)
        );
    }

    #[test]
    fn test_process_row_accepted_with_nulled_fields() {
        let record = SaleRecord::from_pairs(&[
            ("List Year", "2020"),
            ("Sale Amount", "N/A"),
            ("Sales Ratio", "not-a-number"),
        ]);
        let outcome = process_row(&record, &FilterCriteria::default());
        match outcome {
            RowOutcome::Accepted {
                record,
                nulled_fields,
            } => {
                assert_eq!(nulled_fields, 2);
                assert!(record.sale_amount.is_none());
                assert!(record.sales_ratio.is_none());
            }
            other => panic!("expected accepted row, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transform_applies_filters_in_order() {
        let storage = MockStorage::new();
        storage.put_file("sales.csv", SAMPLE_CSV.as_bytes()).await;
        let filters = FilterCriteria {
            start_year: Some(2018),
            end_year: Some(2020),
            town: Some("Avon".to_string()),
            ..Default::default()
        };
        let pipeline = ConvertPipeline::new(storage, MockConfig::new(filters));

        let rows = pipeline.extract().await.unwrap();
        let result = pipeline.transform(rows).await.unwrap();

        // 只有 20001 落在年份範圍內且城鎮相符
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].serial_number.as_deref(), Some("20001"));
        assert_eq!(result.stats.rows_in, 4);
        assert_eq!(result.stats.accepted, 1);
        assert_eq!(result.stats.year_out_of_range, 2);
        assert_eq!(result.stats.town_mismatch, 1);
        assert_eq!(
            result.stats.rows_in,
            result.stats.accepted + result.stats.filtered()
        );
    }

    #[tokio::test]
    async fn test_transform_counts_coercion_nulls() {
        let storage = MockStorage::new();
        storage.put_file("sales.csv", SAMPLE_CSV.as_bytes()).await;
        let pipeline = ConvertPipeline::new(storage, MockConfig::new(FilterCriteria::default()));

        let rows = pipeline.extract().await.unwrap();
        let result = pipeline.transform(rows).await.unwrap();

        assert_eq!(result.records.len(), 4);
        // 20004 的 Sale Amount 是 "N/A"
        assert_eq!(result.stats.coerced_nulls, 1);
        assert!(result.records[3].sale_amount.is_none());
        assert!(result.records[3].sales_ratio.is_some());
    }

    #[tokio::test]
    async fn test_transform_preserves_input_order() {
        let storage = MockStorage::new();
        storage.put_file("sales.csv", SAMPLE_CSV.as_bytes()).await;
        let pipeline = ConvertPipeline::new(storage, MockConfig::new(FilterCriteria::default()));

        let rows = pipeline.extract().await.unwrap();
        let result = pipeline.transform(rows).await.unwrap();

        let serials: Vec<&str> = result
            .records
            .iter()
            .map(|r| r.serial_number.as_deref().unwrap())
            .collect();
        assert_eq!(serials, vec!["20001", "20002", "20003", "20004"]);
    }

    #[tokio::test]
    async fn test_load_writes_pretty_json() {
        let storage = MockStorage::new();
        storage.put_file("sales.csv", SAMPLE_CSV.as_bytes()).await;
        let pipeline =
            ConvertPipeline::new(storage.clone(), MockConfig::new(FilterCriteria::default()));

        let rows = pipeline.extract().await.unwrap();
        let result = pipeline.transform(rows).await.unwrap();
        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "test_output/out.json");

        let written = storage.get_file("out.json").await.unwrap();
        let text = String::from_utf8(written).unwrap();
        assert!(text.contains('\n'));

        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        let array = parsed.as_array().unwrap();
        assert_eq!(array.len(), 4);
        assert_eq!(array[0]["town"], "Avon");
        assert_eq!(array[0]["assessed_value"], 150000);
        assert_eq!(array[1]["sale_amount"], 450000.5);
        assert_eq!(array[3]["sale_amount"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_load_compact_mode() {
        let storage = MockStorage::new();
        storage.put_file("sales.csv", SAMPLE_CSV.as_bytes()).await;
        let mut config = MockConfig::new(FilterCriteria::default());
        config.pretty = false;
        let pipeline = ConvertPipeline::new(storage.clone(), config);

        let rows = pipeline.extract().await.unwrap();
        let result = pipeline.transform(rows).await.unwrap();
        pipeline.load(result).await.unwrap();

        let written = storage.get_file("out.json").await.unwrap();
        let text = String::from_utf8(written).unwrap();
        assert!(!text.contains('\n'));
        assert!(text.starts_with('['));
    }

    #[tokio::test]
    async fn test_load_empty_result_writes_empty_array() {
        let storage = MockStorage::new();
        let pipeline =
            ConvertPipeline::new(storage.clone(), MockConfig::new(FilterCriteria::default()));

        let result = pipeline.transform(Vec::new()).await.unwrap();
        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "test_output/out.json");
        let written = storage.get_file("out.json").await.unwrap();
        assert_eq!(String::from_utf8(written).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_integer_fields_stay_integers_in_output() {
        let csv = "Assessed Value,Sales Ratio\n100,1\n";
        let storage = MockStorage::new();
        storage.put_file("sales.csv", csv.as_bytes()).await;
        let pipeline =
            ConvertPipeline::new(storage.clone(), MockConfig::new(FilterCriteria::default()));

        let rows = pipeline.extract().await.unwrap();
        let result = pipeline.transform(rows).await.unwrap();
        pipeline.load(result).await.unwrap();

        let text = String::from_utf8(storage.get_file("out.json").await.unwrap()).unwrap();
        // 整數欄位不得變成 100.0；比率欄位一律浮點
        assert!(text.contains("\"assessed_value\": 100"));
        assert!(!text.contains("\"assessed_value\": 100.0"));
        assert!(text.contains("\"sales_ratio\": 1.0"));
    }
}
