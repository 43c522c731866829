use clap::Parser;
use estate_etl::config::interactive::Prompter;
use estate_etl::core::inspect;
use estate_etl::domain::columns::{missing_columns, output_key, PROJECTION_FIELDS};
use estate_etl::utils::logger;
use estate_etl::utils::validation::{validate_delimiter, Validate};
use estate_etl::{CliConfig, ConvertJob, ConvertPipeline, EtlEngine, LocalStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting estate-etl CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 只看表頭就離開
    if cli.inspect {
        return inspect_source(&cli).await;
    }

    // 組出本次任務：互動流程或旗標+任務檔
    let job = if cli.interactive {
        match build_interactive_job(&cli).await {
            Ok(job) => job,
            Err(e) => {
                tracing::error!("❌ Interactive session failed: {}", e);
                tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(1);
            }
        }
    } else {
        match cli.resolve() {
            Ok(job) => job,
            Err(e) => {
                tracing::error!("❌ Configuration validation failed: {}", e);
                tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(1);
            }
        }
    };

    let monitor_enabled = cli.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    tracing::info!("📋 Source: {}", job.source_path);
    tracing::info!("📋 Filters: {}", job.filters);
    tracing::info!("📋 Output: {}/{}", job.output_path, job.output_file);

    // 創建存儲和管道
    let storage = LocalStorage::new(job.output_path.clone());
    let pipeline = ConvertPipeline::new(storage, job);

    // 創建ETL引擎並運行
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ Conversion completed successfully!");
            println!("✅ Converted {} records", summary.records_written);
            println!("📁 Output saved to: {}", summary.output_path);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Conversion failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                estate_etl::utils::error::ErrorSeverity::Low => 0, // 警告，但成功
                estate_etl::utils::error::ErrorSeverity::Medium => 2, // 設定錯誤
                estate_etl::utils::error::ErrorSeverity::High => 1, // 處理錯誤
                estate_etl::utils::error::ErrorSeverity::Critical => 3, // 系統錯誤
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

/// --inspect：印出來源表頭與投影欄位對照後離開
async fn inspect_source(cli: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let job = match cli.resolve() {
        Ok(job) => job,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(2);
        }
    };

    let storage = LocalStorage::new(".".to_string());
    match inspect::read_header(&storage, &job.source_path, job.delimiter).await {
        Ok(headers) => {
            print_header_report(&job.source_path, &headers);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Header inspection failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    }
}

fn print_header_report(source: &str, headers: &[String]) {
    println!("📋 Header of {} ({} columns):", source, headers.len());
    for (i, name) in headers.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, name);
    }

    println!();
    println!("📋 Projected columns:");
    for column in PROJECTION_FIELDS {
        if headers.iter().any(|h| h == column) {
            println!("  ✅ {} -> {}", column, output_key(column));
        } else {
            println!("  ⚠️ {} -> {} (missing)", column, output_key(column));
        }
    }

    let missing = missing_columns(headers);
    if !missing.is_empty() {
        println!(
            "⚠️ {} projected column(s) missing; their output fields will be null",
            missing.len()
        );
    }
}

/// 互動模式：提問補齊來源、過濾條件與輸出檔名，組成一個驗證過的任務
async fn build_interactive_job(cli: &CliConfig) -> estate_etl::Result<ConvertJob> {
    println!("🏠 estate-etl - CSV to JSON converter");
    println!("Press Enter to leave a filter blank");
    println!();

    let mut prompter = Prompter::new(
        std::io::BufReader::new(std::io::stdin()),
        std::io::stdout(),
    );

    let source_path = match &cli.input {
        Some(path) => path.clone(),
        None => prompter.source_path()?,
    };

    let delimiter = match &cli.delimiter {
        Some(text) => validate_delimiter(text)?,
        None => b',',
    };

    // 先看表頭；讀不到也不中斷，轉換階段會再以正式錯誤處理
    let storage = LocalStorage::new(".".to_string());
    match inspect::read_header(&storage, &source_path, delimiter).await {
        Ok(headers) => print_header_report(&source_path, &headers),
        Err(e) => println!("⚠️ Could not read the header: {}", e.user_friendly_message()),
    }
    println!();

    let filters = prompter.filter_criteria()?;
    let output_file = prompter.output_file(&filters)?;

    let job = ConvertJob {
        source_path,
        output_path: cli
            .output_path
            .clone()
            .unwrap_or_else(|| "./output".to_string()),
        output_file,
        delimiter,
        filters,
        pretty: !cli.compact,
    };
    job.validate()?;
    Ok(job)
}
