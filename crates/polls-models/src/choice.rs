use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub choice_text: String,
    pub votes: i64,
}

/// Sum of votes across a question's choices.
pub fn total_votes(choices: &[Choice]) -> i64 {
    choices.iter().map(|c| c.votes).sum()
}
