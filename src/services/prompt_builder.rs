//! 提示词构建 - 业务能力层
//!
//! 只负责把科目和序号信息变成一条完整的生成请求（正文 + JSON 骨架），
//! 不做任何 I/O，也不做校验。

use std::collections::BTreeSet;

use crate::config::BookSettings;
use crate::models::content::GenerationRequest;
use crate::models::schema::{self, Schema, UnitMeta};
use crate::models::subject::{Level, SubjectRecord};

/// 单元练习的题目数量说明（schema 固定为 6 × 15 = 90）
const UNIT_ITEM_RANGE: &str = "90-120";

const TONE_DIRECTIVE: &str = "Adult-neutral tone. No childish tone.";
const OUTPUT_DIRECTIVE: &str = "OUTPUT FORMAT:\nReturn ONLY valid JSON. No comments. No markdown.";

/// 提示词构建器
pub struct PromptBuilder {
    settings: BookSettings,
}

impl PromptBuilder {
    pub fn new(settings: &BookSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    /// 词汇单元
    pub fn vocabulary(
        &self,
        sequence_index: usize,
        unit_number: usize,
        unit: &SubjectRecord,
    ) -> GenerationRequest {
        let (topic1, topic2) = self.topic_headings(&unit.vocab_topics);
        let schema = schema::vocabulary(
            &unit_meta(unit, unit_number),
            topic1,
            topic2,
            &self.settings.verbs_heading,
            &self.settings.mark_note,
        );

        let prompt = format!(
            r#"{preamble}
No vocabulary above the level.
Follow Destination-style logic: clear lists, controlled practice, and professional workbook layout.

UNIT META:
level: "{level}"
unit_number: {unit_number}
unit_title: "{title}"
main_topics: "{topics}"

{output}

TASK:
Generate data for ONE Vocabulary Unit.
- Page 1: explanation (core vocabulary lists + short notes).
- Pages 2-3: {range} total exercise items across A-F.

{schema}"#,
            preamble = self.preamble(&unit.level),
            level = unit.level,
            title = unit.unit_title,
            topics = unit.vocab_topics.join(", "),
            output = OUTPUT_DIRECTIVE,
            range = UNIT_ITEM_RANGE,
            schema = schema_block(&schema),
        );

        request(sequence_index, vec![unit.clone()], prompt, schema)
    }

    /// 语法单元
    pub fn grammar(
        &self,
        sequence_index: usize,
        unit_number: usize,
        unit: &SubjectRecord,
    ) -> GenerationRequest {
        let schema = schema::grammar(&unit_meta(unit, unit_number), &self.settings.mark_note);

        let prompt = format!(
            r#"{preamble}
No grammar above the level.
Follow Destination-style logic: clear rules, controlled practice, and a professional workbook style.

UNIT META:
level: "{level}"
unit_number: {unit_number}
unit_title: "{title}"
grammar_focus: "{focus}"
vocab_context: "{topics}"

{output}

TASK:
Generate data for ONE Grammar Unit.
- Page 1: explanation + short examples.
- Pages 2-3: {range} total exercise items across A-F.

{schema}"#,
            preamble = self.preamble(&unit.level),
            level = unit.level,
            title = unit.unit_title,
            focus = unit.grammar_focus,
            topics = unit.vocab_topics.join(", "),
            output = OUTPUT_DIRECTIVE,
            range = UNIT_ITEM_RANGE,
            schema = schema_block(&schema),
        );

        request(sequence_index, vec![unit.clone()], prompt, schema)
    }

    /// 小复习：覆盖最近的两个单元
    pub fn mini_review(
        &self,
        sequence_index: usize,
        review_number: usize,
        unit_range: &str,
        units: &[SubjectRecord],
    ) -> GenerationRequest {
        let schema = schema::mini_review(review_number, unit_range);
        let (topics, grammar) = aggregate(units);

        let prompt = format!(
            r#"{preamble}
Focus on review for the last two units.
Topics: {topics}
Grammar: {grammar}

{output}

TASK:
Generate data for ONE mini review page (50 tasks total).

{schema}"#,
            preamble = self.preamble(review_level(units)),
            output = OUTPUT_DIRECTIVE,
            schema = schema_block(&schema),
        );

        request(sequence_index, units.to_vec(), prompt, schema)
    }

    /// 总复习：覆盖全部单元
    pub fn final_review(
        &self,
        sequence_index: usize,
        unit_range: &str,
        units: &[SubjectRecord],
    ) -> GenerationRequest {
        let schema = schema::final_review(unit_range);
        let (topics, grammar) = aggregate(units);

        let prompt = format!(
            r#"{preamble}
Comprehensive final review for the full book.
Topics: {topics}
Grammar: {grammar}

{output}

TASK:
Generate data for ONE final review (3 pages, 150 tasks total).

{schema}"#,
            preamble = self.preamble(review_level(units)),
            output = OUTPUT_DIRECTIVE,
            schema = schema_block(&schema),
        );

        request(sequence_index, units.to_vec(), prompt, schema)
    }

    /// 所有提示词共用的开头：角色、水平、句长规则、语气
    fn preamble(&self, level: &Level) -> String {
        format!(
            "You are a senior {language} teacher and book writer (18+ years experience).\n\
             Create content STRICTLY for level {level}.\n\
             {rule}\n\
             {tone}",
            language = self.settings.language,
            level = level,
            rule = level.sentence_rule(),
            tone = TONE_DIRECTIVE,
        )
    }

    /// 前两个主题作为标题；只有一个主题时重复使用
    fn topic_headings<'a>(&'a self, topics: &'a [String]) -> (&'a str, &'a str) {
        match topics {
            [] => (
                self.settings.fallback_topic1.as_str(),
                self.settings.fallback_topic2.as_str(),
            ),
            [only] => (only.as_str(), only.as_str()),
            [first, second, ..] => (first.as_str(), second.as_str()),
        }
    }
}

fn unit_meta(unit: &SubjectRecord, unit_number: usize) -> UnitMeta<'_> {
    UnitMeta {
        level: &unit.level,
        unit_number,
        unit_title: &unit.unit_title,
    }
}

/// 复习使用最后一个单元的水平
fn review_level(units: &[SubjectRecord]) -> &Level {
    static FALLBACK: Level = Level::A1;
    units.last().map(|u| &u.level).unwrap_or(&FALLBACK)
}

/// 汇总主题和语法重点（去重并排序）
fn aggregate(units: &[SubjectRecord]) -> (String, String) {
    let topics: BTreeSet<&str> = units
        .iter()
        .flat_map(|u| u.vocab_topics.iter().map(String::as_str))
        .collect();
    let grammar: BTreeSet<&str> = units.iter().map(|u| u.grammar_focus.as_str()).collect();
    (
        topics.into_iter().collect::<Vec<_>>().join(", "),
        grammar.into_iter().collect::<Vec<_>>().join(", "),
    )
}

fn schema_block(schema: &Schema) -> String {
    let skeleton = serde_json::to_string_pretty(&schema.skeleton()).unwrap_or_default();
    format!("JSON SCHEMA (fill all fields):\n{}", skeleton)
}

fn request(
    sequence_index: usize,
    subjects: Vec<SubjectRecord>,
    rendered_prompt: String,
    schema: Schema,
) -> GenerationRequest {
    GenerationRequest {
        content_kind: schema.kind(),
        sequence_index,
        subjects,
        rendered_prompt,
        schema,
    }
}
