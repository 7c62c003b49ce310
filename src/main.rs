use anyhow::{Context, Result};
use log::{debug, warn};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::Value;

use query_shaper::{QueryParameters, RequestParser};

/// 创建请求解析器，优先使用JSON配置，失败时使用默认参数名
fn create_parser(config_path: Option<&str>) -> RequestParser {
    let Some(path) = config_path else {
        return RequestParser::default();
    };

    match QueryParameters::from_json_file(path) {
        Ok(parameters) => {
            println!("✅ 成功从JSON配置文件加载参数名: {}", path);
            RequestParser::new(parameters)
        }
        Err(e) => {
            warn!("{}", e);
            println!("⚠️ 无法加载JSON配置文件 ({}), 使用默认配置", e);
            RequestParser::default()
        }
    }
}

/// 解析一行输入并打印结果
fn handle_line(parser: &RequestParser, line: &str) -> Result<()> {
    let request: Value = serde_json::from_str(line).context("输入必须是JSON对象")?;
    let Value::Object(request) = request else {
        anyhow::bail!("输入必须是JSON对象");
    };

    let input = parser.parse(&request)?;
    println!("{}", serde_json::to_string_pretty(&input)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config_path = std::env::args().nth(1);
    let parser = create_parser(config_path.as_deref());
    let parameters = parser.parameters();

    println!("--- Query Shaper: 请求参数解析 ---");
    println!(
        "参数名: fields={}, filters={}, sort={}",
        parameters.fields, parameters.filters, parameters.sort
    );
    println!(
        r#"每行输入一个JSON对象, 例如: {{"{}": "id,posts(id,title)", "{}": "id.desc"}}"#,
        parameters.fields, parameters.sort
    );
    println!("输入 :quit 退出\n");

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline(">> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == ":quit" {
                    break;
                }
                editor.add_history_entry(line)?;
                debug!("input: {}", line);

                if let Err(e) = handle_line(&parser, line) {
                    println!("✗ 解析失败: {:#}", e);
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
