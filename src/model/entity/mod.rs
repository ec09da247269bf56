mod user;
pub use user::{UserEntity, UserEntityCreateUpdate};

mod language;
pub use language::Language;

mod level;
pub use level::Level;

mod exercise;
pub use exercise::{Exercise, ExerciseCreateUpdate, ExerciseType};

mod question;
pub use question::{Question, QuestionCreate};

mod attempt;
pub use attempt::{
    CompletedAttemptRow, ExerciseAttempt, ExerciseAttemptCreate, StudentScoreRow,
};

mod progress;
pub use progress::{ExerciseProgress, ProgressStatus};
