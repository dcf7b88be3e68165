use std::collections::HashMap;

use async_graphql::{SimpleObject, Union};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Answer, Question, QuestionType, Response};

const TOP_ANSWER_LIMIT: usize = 5;
const KEYWORD_LIMIT: usize = 8;
const MIN_KEYWORD_LEN: usize = 4;

const STOP_WORDS: &[&str] = &[
    "about", "after", "again", "against", "also", "among", "because", "before", "being", "below",
    "between", "could", "does", "doing", "during", "from", "have", "having", "just", "more",
    "most", "other", "over", "same", "some", "such", "than", "that", "their", "there", "these",
    "they", "this", "those", "through", "very", "what", "when", "where", "which", "while", "with",
    "would", "your", "you", "the", "and", "for", "are", "not", "was", "were", "can",
];

static TOKEN_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("token pattern is a valid regex"));

#[derive(SimpleObject, Debug, Clone, PartialEq)]
pub struct QuestionSummary {
    pub question_id: Option<i64>,
    pub text: String,
    pub question_type: QuestionType,
    pub answers: AnswerSummary,
}

#[derive(Union, Debug, Clone, PartialEq)]
pub enum AnswerSummary {
    Choice(ChoiceSummary),
    Media(MediaSummary),
    Text(TextSummary),
}

#[derive(SimpleObject, Debug, Clone, PartialEq)]
pub struct ChoiceSummary {
    /// One entry per defined choice, including those nobody picked.
    pub choices: Vec<ChoiceCount>,
    /// Answers that selected at least one choice.
    pub answered_responses: usize,
    pub total_responses: usize,
    /// The base the percentages are computed against.
    pub denominator: usize,
}

#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct ChoiceCount {
    pub choice_id: Option<i64>,
    pub text: String,
    pub count: usize,
    pub percent: usize,
}

#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct MediaSummary {
    pub upload_count: usize,
    /// The last path segment of each uploaded file, in encounter order.
    pub file_names: Vec<String>,
}

#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct TextSummary {
    /// Non-blank answers.
    pub answer_count: usize,
    pub top_answers: Vec<AnswerCount>,
    /// Distinct answers not listed in `top_answers`.
    pub other_unique_answers: usize,
    pub keywords: Vec<KeywordCount>,
}

#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct AnswerCount {
    pub text: String,
    pub count: usize,
}

#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// Summarizes the answers to `question` across `responses`.
pub fn summarize(question: &Question, responses: &[Response]) -> QuestionSummary {
    let answers: Vec<&Answer> = responses
        .iter()
        .flat_map(|response| response.answers.iter())
        .filter(|answer| question.id == Some(answer.question))
        .collect();

    let summary = if question.question_type.is_choice() {
        AnswerSummary::Choice(summarize_choices(question, &answers, responses.len()))
    } else if question.question_type.is_text() {
        AnswerSummary::Text(summarize_text(&answers))
    } else {
        AnswerSummary::Media(summarize_media(&answers))
    };

    QuestionSummary {
        question_id: question.id,
        text: question.text.clone(),
        question_type: question.question_type,
        answers: summary,
    }
}

fn summarize_choices(question: &Question, answers: &[&Answer], total: usize) -> ChoiceSummary {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for choice in answers.iter().flat_map(|answer| &answer.selected_choices) {
        *counts.entry(*choice).or_insert(0) += 1;
    }

    let answered_responses = answers
        .iter()
        .filter(|answer| !answer.selected_choices.is_empty())
        .count();

    // A respondent may pick several options, so those percentages are
    // relative to every response and need not add up to 100.
    let denominator = if question.question_type == QuestionType::MultipleSelect {
        total
    } else {
        answered_responses.max(1)
    };

    let choices = question
        .choices
        .iter()
        .map(|choice| {
            let count = choice
                .id
                .and_then(|id| counts.get(&id).copied())
                .unwrap_or(0);
            ChoiceCount {
                choice_id: choice.id,
                text: choice.text.clone(),
                count,
                percent: percent(count, denominator),
            }
        })
        .collect();

    ChoiceSummary {
        choices,
        answered_responses,
        total_responses: total,
        denominator,
    }
}

/// `count / denominator` as a whole percentage, halves rounded up.
fn percent(count: usize, denominator: usize) -> usize {
    if denominator == 0 {
        return 0;
    }
    (count * 200 + denominator) / (denominator * 2)
}

fn summarize_media(answers: &[&Answer]) -> MediaSummary {
    let file_names: Vec<String> = answers
        .iter()
        .filter(|answer| answer.has_file())
        .filter_map(|answer| answer.file_answer.as_deref())
        .map(|url| url.rsplit('/').next().unwrap_or(url).to_string())
        .collect();

    MediaSummary {
        upload_count: file_names.len(),
        file_names,
    }
}

fn summarize_text(answers: &[&Answer]) -> TextSummary {
    let values: Vec<&str> = answers
        .iter()
        .filter_map(|answer| answer.text_answer.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect();

    let groups = rank_by_frequency(values.iter().map(|text| (*text).to_string()));
    let other_unique_answers = groups.len().saturating_sub(TOP_ANSWER_LIMIT);
    let top_answers = groups
        .into_iter()
        .take(TOP_ANSWER_LIMIT)
        .map(|(text, count)| AnswerCount { text, count })
        .collect();

    let keywords = extract_keywords(&values)
        .into_iter()
        .take(KEYWORD_LIMIT)
        .map(|(keyword, count)| KeywordCount { keyword, count })
        .collect();

    TextSummary {
        answer_count: values.len(),
        top_answers,
        other_unique_answers,
        keywords,
    }
}

/// Counts keyword occurrences across `texts`, most frequent first.
///
/// Texts are lower-cased and split on anything outside `[a-z0-9]`; tokens
/// shorter than four characters and stop words are dropped.
pub fn extract_keywords(texts: &[&str]) -> Vec<(String, usize)> {
    let tokens = texts.iter().flat_map(|text| {
        TOKEN_SEPARATOR
            .split(&text.to_lowercase())
            .filter(|token| token.len() >= MIN_KEYWORD_LEN && !STOP_WORDS.contains(token))
            .map(str::to_string)
            .collect::<Vec<_>>()
    });
    rank_by_frequency(tokens)
}

/// Groups equal items and sorts the groups by descending count. Ties keep
/// the order in which each item was first seen.
fn rank_by_frequency(items: impl IntoIterator<Item = String>) -> Vec<(String, usize)> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, usize)> = Vec::new();
    for item in items {
        if let Some(&position) = positions.get(&item) {
            groups[position].1 += 1;
        } else {
            positions.insert(item.clone(), groups.len());
            groups.push((item, 1));
        }
    }
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups
}
