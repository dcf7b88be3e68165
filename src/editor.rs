//! Builder-side mutations of a [`Form`].
//!
//! Every insertion and removal re-indexes the `order` of the affected
//! siblings so that it always equals their position.

use std::fmt;

use crate::model::{Choice, Form, Question, QuestionType, Section};

const UNTITLED_QUESTION: &str = "Untitled Question";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditError {
    /// A form must keep at least one section.
    LastSection,
    SectionOutOfRange(usize),
    QuestionOutOfRange(usize),
    ChoiceOutOfRange(usize),
    /// Only `multiple_choice` and `multiple_select` questions carry choices.
    NotAChoiceQuestion(usize),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastSection => write!(f, "a form must have at least one section"),
            Self::SectionOutOfRange(i) => write!(f, "no section at index {i}"),
            Self::QuestionOutOfRange(i) => write!(f, "no question at index {i}"),
            Self::ChoiceOutOfRange(i) => write!(f, "no choice at index {i}"),
            Self::NotAChoiceQuestion(i) => write!(f, "question {i} does not take choices"),
        }
    }
}

impl std::error::Error for EditError {}

impl Form {
    pub fn add_section(&mut self) -> &mut Section {
        let position = self.sections.len();
        self.sections.push(Section {
            title: format!("Section {}", position + 1),
            order: position,
            ..Default::default()
        });
        &mut self.sections[position]
    }

    pub fn remove_section(&mut self, index: usize) -> Result<Section, EditError> {
        if index >= self.sections.len() {
            return Err(EditError::SectionOutOfRange(index));
        }
        if self.sections.len() == 1 {
            return Err(EditError::LastSection);
        }
        let removed = self.sections.remove(index);
        reindex_sections(&mut self.sections);
        Ok(removed)
    }

    pub fn add_question(&mut self, section: usize) -> Result<&mut Question, EditError> {
        let questions = &mut self.section_mut(section)?.questions;
        let position = questions.len();
        questions.push(Question {
            text: UNTITLED_QUESTION.to_string(),
            order: position,
            ..Default::default()
        });
        Ok(&mut questions[position])
    }

    pub fn remove_question(&mut self, section: usize, index: usize) -> Result<Question, EditError> {
        let questions = &mut self.section_mut(section)?.questions;
        if index >= questions.len() {
            return Err(EditError::QuestionOutOfRange(index));
        }
        let removed = questions.remove(index);
        reindex_questions(questions);
        Ok(removed)
    }

    pub fn add_choice(&mut self, section: usize, question: usize) -> Result<&mut Choice, EditError> {
        let target = self.question_mut(section, question)?;
        if !target.question_type.is_choice() {
            return Err(EditError::NotAChoiceQuestion(question));
        }
        let choices = &mut target.choices;
        let position = choices.len();
        choices.push(Choice {
            id: None,
            text: format!("Option {}", position + 1),
            order: position,
        });
        Ok(&mut choices[position])
    }

    pub fn remove_choice(
        &mut self,
        section: usize,
        question: usize,
        index: usize,
    ) -> Result<Choice, EditError> {
        let choices = &mut self.question_mut(section, question)?.choices;
        if index >= choices.len() {
            return Err(EditError::ChoiceOutOfRange(index));
        }
        let removed = choices.remove(index);
        reindex_choices(choices);
        Ok(removed)
    }

    /// Changes the type of a question while keeping choices only on choice
    /// questions.
    pub fn set_question_type(
        &mut self,
        section: usize,
        question: usize,
        question_type: QuestionType,
    ) -> Result<(), EditError> {
        let question = self.question_mut(section, question)?;
        question.question_type = question_type;
        if !question_type.is_choice() {
            question.choices.clear();
        } else if question.choices.is_empty() {
            question.choices.push(Choice {
                id: None,
                text: "Option 1".to_string(),
                order: 0,
            });
        }
        Ok(())
    }

    fn section_mut(&mut self, index: usize) -> Result<&mut Section, EditError> {
        self.sections
            .get_mut(index)
            .ok_or(EditError::SectionOutOfRange(index))
    }

    fn question_mut(&mut self, section: usize, index: usize) -> Result<&mut Question, EditError> {
        self.section_mut(section)?
            .questions
            .get_mut(index)
            .ok_or(EditError::QuestionOutOfRange(index))
    }
}

fn reindex_sections(sections: &mut [Section]) {
    for (position, section) in sections.iter_mut().enumerate() {
        section.order = position;
    }
}

fn reindex_questions(questions: &mut [Question]) {
    for (position, question) in questions.iter_mut().enumerate() {
        question.order = position;
    }
}

fn reindex_choices(choices: &mut [Choice]) {
    for (position, choice) in choices.iter_mut().enumerate() {
        choice.order = position;
    }
}
