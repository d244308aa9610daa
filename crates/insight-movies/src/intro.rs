//! Prompting for, and formatting, the introduction of a single movie.

use crate::Movie;
use insight_llm::LLMProvider;
use tracing::{info, warn};

const UNKNOWN: &str = "未知";
const FAILURE_PREFIX: &str = "无法获取电影介绍：";

pub fn build_prompt(movie: &Movie) -> String {
    let mut prompt = format!("请用中文详细介绍这部电影：{}。", movie.title);
    if let Some(country) = &movie.country {
        prompt.push_str(&format!(" 国家：{}", country));
    }
    if let Some(genre) = &movie.genre {
        prompt.push_str(&format!(" 类型：{}", genre));
    }
    if let Some(release_date) = &movie.release_date {
        prompt.push_str(&format!(" 上映日期：{}", release_date));
    }
    prompt.push_str("。请提供电影的剧情简介、主要演员、导演信息以及为什么这部电影评分如此之高。");
    prompt
}

/// Ask the provider to introduce `movie`.
///
/// Never fails: a missing provider or a failed call yields a short
/// explanation in place of the introduction, so the report is still written.
pub async fn fetch_introduction(provider: Option<&dyn LLMProvider>, movie: &Movie) -> String {
    let Some(provider) = provider else {
        warn!("DeepSeek API key not found, skipping movie introduction");
        return format!("{}缺少API密钥", FAILURE_PREFIX);
    };

    info!("Requesting introduction for '{}'", movie.title);
    match provider.generate(&build_prompt(movie)).await {
        Ok(response) => response.content,
        Err(e) => {
            warn!("Error calling DeepSeek API: {}", e);
            format!("{}{}", FAILURE_PREFIX, e)
        }
    }
}

pub fn render_intro_markdown(movie: &Movie, introduction: &str) -> String {
    let or_unknown = |value: &Option<String>| value.as_deref().unwrap_or(UNKNOWN).to_string();

    let mut out = format!("# {} 详细介绍\n\n", movie.title);
    out.push_str(&format!("**评分**: {:?}\n", movie.average));
    out.push_str(&format!("**国家**: {}\n", or_unknown(&movie.country)));
    out.push_str(&format!("**类型**: {}\n", or_unknown(&movie.genre)));
    out.push_str(&format!("**上映日期**: {}\n", or_unknown(&movie.release_date)));
    out.push_str(&format!("**投票数**: {}\n\n", or_unknown(&movie.votes)));
    out.push_str("## 电影介绍\n\n");
    out.push_str(introduction);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_llm::MockProvider;

    fn shawshank() -> Movie {
        Movie {
            title: "肖申克的救赎".to_string(),
            average: 9.7,
            country: Some("美国".to_string()),
            genre: Some("剧情".to_string()),
            release_date: Some("1994-09-10".to_string()),
            votes: Some("2000000".to_string()),
        }
    }

    #[test]
    fn test_prompt_with_all_fields() {
        assert_eq!(
            build_prompt(&shawshank()),
            "请用中文详细介绍这部电影：肖申克的救赎。 国家：美国 类型：剧情 上映日期：1994-09-10。\
             请提供电影的剧情简介、主要演员、导演信息以及为什么这部电影评分如此之高。"
        );
    }

    #[test]
    fn test_prompt_skips_missing_fields() {
        let movie = Movie {
            genre: None,
            release_date: None,
            ..shawshank()
        };
        let prompt = build_prompt(&movie);
        assert!(prompt.contains(" 国家：美国。"));
        assert!(!prompt.contains("类型"));
        assert!(!prompt.contains("上映日期"));
    }

    #[test]
    fn test_markdown_uses_unknown_for_missing() {
        let movie = Movie {
            country: None,
            votes: None,
            ..shawshank()
        };
        let md = render_intro_markdown(&movie, "一部关于希望的电影。");
        assert!(md.starts_with("# 肖申克的救赎 详细介绍\n\n**评分**: 9.7\n"));
        assert!(md.contains("**国家**: 未知\n"));
        assert!(md.contains("**投票数**: 未知\n\n## 电影介绍\n\n"));
        assert!(md.ends_with("一部关于希望的电影。"));
    }

    #[test]
    fn test_markdown_whole_rating_keeps_decimal() {
        let table = crate::read_movies("title,average\nA,9\n".as_bytes()).unwrap();
        let md = render_intro_markdown(&table.movies[0], "");
        assert!(md.contains("**评分**: 9.0\n"));
    }

    #[tokio::test]
    async fn test_fetch_without_provider() {
        let intro = fetch_introduction(None, &shawshank()).await;
        assert_eq!(intro, "无法获取电影介绍：缺少API密钥");
    }

    #[tokio::test]
    async fn test_fetch_sends_prompt() {
        let mock = MockProvider::new().with_reply("剧情简介……");
        let intro = fetch_introduction(Some(&mock), &shawshank()).await;

        assert_eq!(intro, "剧情简介……");
        assert_eq!(mock.prompts(), vec![build_prompt(&shawshank())]);
    }

    #[tokio::test]
    async fn test_fetch_failure_becomes_text() {
        let mock = MockProvider::new().with_error("connection refused");
        let intro = fetch_introduction(Some(&mock), &shawshank()).await;
        assert_eq!(intro, "无法获取电影介绍：connection refused");
    }
}
