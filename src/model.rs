use std::collections::HashMap;

use async_graphql::{Enum, SimpleObject};
use serde::{Deserialize, Deserializer, Serialize};

/// A form as served by `GET /forms/{id}/`.
#[derive(SimpleObject, Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Form {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sections: Vec<Section>,
}

#[derive(SimpleObject, Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub order: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<Question>,
}

#[derive(SimpleObject, Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Question {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub order: usize,
    /// Non-empty only for `multiple_choice` and `multiple_select`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<Choice>,
}

#[derive(SimpleObject, Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Choice {
    /// Absent until the server has assigned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default)]
    pub order: usize,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    ShortText,
    LongText,
    Number,
    Float,
    MultipleChoice,
    MultipleSelect,
    Media,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShortText => "short_text",
            Self::LongText => "long_text",
            Self::Number => "number",
            Self::Float => "float",
            Self::MultipleChoice => "multiple_choice",
            Self::MultipleSelect => "multiple_select",
            Self::Media => "media",
        }
    }

    pub fn is_choice(self) -> bool {
        matches!(self, Self::MultipleChoice | Self::MultipleSelect)
    }

    pub fn is_media(self) -> bool {
        self == Self::Media
    }

    /// Free-text answers: everything that is neither a choice nor an upload.
    pub fn is_text(self) -> bool {
        !self.is_choice() && !self.is_media()
    }
}

impl From<&str> for QuestionType {
    fn from(value: &str) -> Self {
        match value {
            "long_text" => Self::LongText,
            "number" => Self::Number,
            "float" => Self::Float,
            "multiple_choice" => Self::MultipleChoice,
            "multiple_select" => Self::MultipleSelect,
            "media" => Self::Media,
            _ => Self::ShortText,
        }
    }
}

/// A submission as served by `GET /forms/{id}/responses/`.
#[derive(SimpleObject, Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Response {
    pub id: i64,
    /// Kept verbatim; unparsable values are dropped from trends only.
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answers: Vec<Answer>,
}

#[derive(SimpleObject, Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Answer {
    #[serde(default)]
    pub id: Option<i64>,
    pub question: i64,
    #[serde(default)]
    pub text_answer: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub selected_choices: Vec<i64>,
    #[serde(default)]
    pub file_answer: Option<String>,
}

impl Form {
    /// Every question of every section, in display order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|section| section.questions.iter())
    }

    pub fn question_index(&self) -> HashMap<i64, &Question> {
        self.questions()
            .filter_map(|question| question.id.map(|id| (id, question)))
            .collect()
    }

    pub fn choice_texts(&self) -> HashMap<i64, &str> {
        self.questions()
            .flat_map(|question| question.choices.iter())
            .filter_map(|choice| choice.id.map(|id| (id, choice.text.as_str())))
            .collect()
    }
}

impl Response {
    /// The first answer recorded for `question_id`, if any.
    pub fn answer_for(&self, question_id: i64) -> Option<&Answer> {
        self.answers
            .iter()
            .find(|answer| answer.question == question_id)
    }
}

impl Answer {
    pub fn has_file(&self) -> bool {
        self.file_answer.as_deref().is_some_and(|url| !url.is_empty())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
