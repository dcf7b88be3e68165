use async_graphql::SimpleObject;

use crate::model::{Form, Response};

const UNKNOWN_CHOICE: &str = "?";

/// One submission laid out for reading.
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct ResponseView {
    pub response_id: i64,
    pub created_at: String,
    pub answers: Vec<AnswerView>,
}

#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct AnswerView {
    pub question_id: i64,
    pub question_text: String,
    /// `None` when the respondent left the question blank.
    pub display: Option<String>,
}

impl ResponseView {
    /// Renders each answer of `response`, skipping answers to questions that
    /// are no longer on `form`.
    pub fn new(form: &Form, response: &Response) -> Self {
        let questions = form.question_index();
        let choice_texts = form.choice_texts();

        let answers = response
            .answers
            .iter()
            .filter_map(|answer| {
                let question = questions.get(&answer.question)?;
                let display = if question.question_type.is_choice() {
                    Some(
                        answer
                            .selected_choices
                            .iter()
                            .map(|id| choice_texts.get(id).copied().unwrap_or(UNKNOWN_CHOICE))
                            .collect::<Vec<_>>()
                            .join(", "),
                    )
                } else if question.question_type.is_media() {
                    answer.file_answer.clone()
                } else {
                    answer.text_answer.clone()
                };
                Some(AnswerView {
                    question_id: answer.question,
                    question_text: question.text.clone(),
                    display: display.filter(|text| !text.trim().is_empty()),
                })
            })
            .collect();

        Self {
            response_id: response.id,
            created_at: response.created_at.clone(),
            answers,
        }
    }
}
