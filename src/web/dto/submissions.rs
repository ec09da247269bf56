use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grading::GradedSubmission;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    pub answer: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SubmitAnswersRequest {
    pub answers: Vec<SubmittedAnswer>,
}

impl SubmitAnswersRequest {
    /// Later duplicates win, matching how a client resubmits a field.
    pub fn into_answer_map(self) -> HashMap<Uuid, String> {
        self.answers
            .into_iter()
            .map(|a| (a.question_id, a.answer))
            .collect()
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    pub attempt_id: Uuid,
    #[serde(flatten)]
    pub graded: GradedSubmission,
}
