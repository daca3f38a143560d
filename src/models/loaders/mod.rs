pub mod id_loader;

pub use id_loader::{flatten_id_tree, load_question_ids};
