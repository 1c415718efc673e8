use rand::Rng;
use serde::{Deserialize, Serialize};

/// One question as delivered by the provider. Strings may still carry HTML
/// entities; decoding is left to the renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuestionRecord {
    #[serde(rename = "question")]
    pub text: String,
    pub correct_answer: String,
    #[serde(default)]
    pub incorrect_answers: Vec<String>,
}

/// A question ready to be presented: the correct answer sits at `correct_index`
/// and every other slot holds one incorrect answer in provider order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: Vec<String>,
    correct_index: usize,
}

impl Question {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_index
    }
}

/// Build a `Question` by inserting the correct answer into the incorrect
/// answers at `random_index`.
///
/// # Panics
///
/// Panics if `random_index > record.incorrect_answers.len()`; callers draw it
/// with [`draw_index`].
pub fn normalize(record: &RawQuestionRecord, random_index: usize) -> Question {
    let mut options = record.incorrect_answers.clone();
    options.insert(random_index, record.correct_answer.clone());

    Question {
        text: record.text.clone(),
        options,
        correct_index: random_index,
    }
}

/// Uniform draw over every slot the correct answer could take.
pub fn draw_index<R: Rng + ?Sized>(record: &RawQuestionRecord, rng: &mut R) -> usize {
    rng.gen_range(0..=record.incorrect_answers.len())
}

pub fn normalize_with<R: Rng + ?Sized>(record: &RawQuestionRecord, rng: &mut R) -> Question {
    let idx = draw_index(record, rng);
    normalize(record, idx)
}
