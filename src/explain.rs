use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use insight_common::Settings;
use insight_llm::{DeepSeekClient, LLMConfig, LLMProvider, RetryPolicy};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const PANDAS_PROMPT: &str = "请用中文详细解释Python的pandas库，包括：
1. pandas是什么以及它的主要用途
2. 核心数据结构（Series和DataFrame）
3. 常用的数据操作功能（读取数据、数据清洗、数据筛选、分组聚合等）
4. 常用的函数和方法
5. 实际应用场景和示例

请提供详细的解释和实用的代码示例。";

const DOCUMENT_HEADER: &str = "# Pandas库详细解释\n\n";

#[derive(Args, Debug)]
pub struct ExplainArgs {
    /// Where to write the Markdown explanation
    #[arg(short, long, default_value = "pandas_explanation.md")]
    output: PathBuf,

    /// Maximum number of API attempts
    #[arg(long, default_value_t = 3)]
    attempts: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Model name (overrides DEEPSEEK_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Completion token limit
    #[arg(long, default_value_t = 2000)]
    max_tokens: u32,
}

pub async fn run(args: ExplainArgs) -> Result<()> {
    println!("{}", "Asking DeepSeek to explain pandas...".cyan().bold());

    let settings = Settings::from_env();
    let mut config = LLMConfig::from_settings(&settings)?
        .with_max_tokens(args.max_tokens)
        .with_timeout(Duration::from_secs(args.timeout));
    if let Some(model) = args.model {
        config = config.with_model(model);
    }
    println!("{}", "✓ DeepSeek API key loaded".green());

    let client = DeepSeekClient::new(config)?.with_retry(RetryPolicy::new(args.attempts));
    let explanation = explain_pandas(&client).await?;

    save_explanation(&args.output, &explanation)?;
    println!(
        "{} {}",
        "✓ Explanation saved to".green(),
        args.output.display()
    );
    Ok(())
}

pub async fn explain_pandas(llm: &dyn LLMProvider) -> Result<String> {
    info!("Calling DeepSeek API for the pandas explanation");
    let response = llm
        .generate(PANDAS_PROMPT)
        .await
        .context("Failed to get pandas explanation from DeepSeek")?;
    info!(
        "Received {} chars (finish reason: {})",
        response.content.chars().count(),
        response.finish_reason.as_deref().unwrap_or("unknown")
    );
    Ok(response.content)
}

pub fn save_explanation(path: &Path, explanation: &str) -> Result<()> {
    let document = format!("{}{}", DOCUMENT_HEADER, explanation);
    fs::write(path, document).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Explanation written to {}", path.display());
    Ok(())
}
