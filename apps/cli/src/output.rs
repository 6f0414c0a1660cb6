//! 命令输出渲染

use anyhow::Result;
use clap::ValueEnum;
use mcm_sdk::ResponseFields;
use serde_json::json;

/// 输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `KEY : value` 对齐文本
    #[default]
    Table,
    /// JSON
    Json,
}

/// 一条命令的结果
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// 结构化回复
    Fields(ResponseFields),
    /// 单个整数（位置查询）
    Scalar { key: &'static str, value: i64 },
    /// 原文回复（RST）
    Text(String),
}

impl Output {
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        Ok(match (self, format) {
            (Output::Fields(fields), OutputFormat::Table) => {
                let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
                fields
                    .iter()
                    .map(|(key, value)| format!("{key:<width$} : {value}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            },
            (Output::Fields(fields), OutputFormat::Json) => serde_json::to_string_pretty(fields)?,
            (Output::Scalar { value, .. }, OutputFormat::Table) => value.to_string(),
            (Output::Scalar { key, value }, OutputFormat::Json) => {
                serde_json::to_string_pretty(&json!({ (*key): value }))?
            },
            (Output::Text(text), OutputFormat::Table) => text.clone(),
            (Output::Text(text), OutputFormat::Json) => {
                serde_json::to_string_pretty(&json!({ "reply": text }))?
            },
        })
    }

    /// 渲染并写到 stdout（空结果不输出）
    pub fn print(&self, format: OutputFormat) -> Result<()> {
        let rendered = self.render(format)?;
        if !rendered.is_empty() {
            println!("{rendered}");
        }
        Ok(())
    }
}
