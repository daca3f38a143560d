pub mod catalog;
pub mod loaders;
pub mod problem;
pub mod question;

pub use loaders::load_question_ids;
pub use problem::{ProblemQuery, ProblemsResponse, RawProblem};
pub use question::{AnswerOutcome, AnswerResult, ExportRow, QuestionRecord, ANSWER_UNAVAILABLE};
