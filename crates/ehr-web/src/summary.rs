//! 病历摘要生成

use ehr_core::utils::truncate_chars;

/// 摘要生成器
///
/// 由应用状态持有并注入到处理器中，便于替换为真实的模型服务。
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str) -> String;
}

/// 截断加模板的摘要生成器
#[derive(Debug, Clone)]
pub struct TemplateSummarizer {
    prefix: String,
    suffix: String,
    max_chars: usize,
}

impl TemplateSummarizer {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>, max_chars: usize) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            max_chars,
        }
    }
}

impl Default for TemplateSummarizer {
    fn default() -> Self {
        Self::new(
            "AI Medical Summary: ",
            "... [Professional evaluation recommended]",
            100,
        )
    }
}

impl Summarizer for TemplateSummarizer {
    fn summarize(&self, text: &str) -> String {
        format!(
            "{}{}{}",
            self.prefix,
            truncate_chars(text, self.max_chars),
            self.suffix
        )
    }
}
