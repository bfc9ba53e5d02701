use crate::error::ConfigError;
use crate::models::subject::{Level, SubjectRecord};
use std::path::Path;
use tokio::fs;

/// 从科目文件加载所有单元
///
/// 每行格式: `level | unit_title | grammar_focus | vocab_topics`，
/// 空行和以 `#` 开头的行会被跳过。
pub async fn load_subjects(path: &Path) -> Result<Vec<SubjectRecord>, ConfigError> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(ConfigError::SubjectFileNotFound { path: display });
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::SubjectFileUnreadable {
            path: display.clone(),
            source,
        })?;

    let subjects = parse_subjects(&content)?;
    if subjects.is_empty() {
        return Err(ConfigError::NoSubjects { path: display });
    }

    tracing::info!("成功加载 {} 个单元", subjects.len());
    Ok(subjects)
}

/// 解析科目文本（不检查是否为空）
pub fn parse_subjects(content: &str) -> Result<Vec<SubjectRecord>, ConfigError> {
    let mut subjects = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split('|').map(str::trim).collect();
        if parts.len() < 4 {
            return Err(ConfigError::BadSubjectLine {
                line: index + 1,
                found: parts.len(),
            });
        }

        let vocab_topics = parts[3]
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();

        subjects.push(SubjectRecord {
            level: Level::parse(parts[0]),
            unit_title: parts[1].to_string(),
            grammar_focus: parts[2].to_string(),
            vocab_topics,
        });
    }

    Ok(subjects)
}
