use crate::config::{default_output_name, json_file_name};
use crate::domain::model::FilterCriteria;
use crate::utils::error::{EtlError, Result};
use std::io::{BufRead, Write};

/// 互動式提問流程：只負責收集並驗證輸入，組好條件交給引擎，不碰轉換本身
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// 讀一行並去除前後空白；EOF 回 None
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        let bytes = self.input.read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask_or_blank(&mut self, prompt: &str) -> Result<String> {
        Ok(self.ask(prompt)?.unwrap_or_default())
    }

    fn optional(&mut self, prompt: &str) -> Result<Option<String>> {
        let answer = self.ask_or_blank(prompt)?;
        Ok((!answer.is_empty()).then_some(answer))
    }

    /// 來源路徑必填，空白重問；EOF 視為缺少必要設定
    pub fn source_path(&mut self) -> Result<String> {
        loop {
            match self.ask("Enter the CSV file path: ")? {
                None => {
                    return Err(EtlError::MissingConfigError {
                        field: "input".to_string(),
                    })
                }
                Some(answer) if answer.is_empty() => {
                    writeln!(self.output, "⚠️ A source file is required")?;
                }
                Some(answer) => return Ok(answer),
            }
        }
    }

    /// 年份區間顛倒時整組重問；城鎮與物件類型留空表示不過濾
    pub fn filter_criteria(&mut self) -> Result<FilterCriteria> {
        let (start_year, end_year) = loop {
            let start_year = parse_year(&self.ask_or_blank("Start year (blank for none): ")?);
            let end_year = parse_year(&self.ask_or_blank("End year (blank for none): ")?);

            if let (Some(start), Some(end)) = (start_year, end_year) {
                if start > end {
                    writeln!(
                        self.output,
                        "⚠️ Start year {} is after end year {}, please re-enter",
                        start, end
                    )?;
                    continue;
                }
            }
            break (start_year, end_year);
        };

        let town = self.optional("Town filter (blank for none): ")?;
        let property_type = self.optional("Property type filter (blank for none): ")?;

        Ok(FilterCriteria {
            start_year,
            end_year,
            town,
            property_type,
        })
    }

    /// 輸出檔名，留空採用由過濾條件推導的預設值
    pub fn output_file(&mut self, filters: &FilterCriteria) -> Result<String> {
        let default_name = default_output_name(filters);
        let answer = self.ask_or_blank(&format!("Output file name [{}]: ", default_name))?;
        let name = if answer.is_empty() { default_name } else { answer };
        Ok(json_file_name(&name))
    }
}

/// 全是數字才算年份，其他一律當成留空（含負號與夾雜字母）
fn parse_year(answer: &str) -> Option<i32> {
    if !answer.is_empty() && answer.chars().all(|c| c.is_ascii_digit()) {
        answer.parse().ok()
    } else {
        None
    }
}
