pub mod learner;
pub mod lemma;
pub mod lesson;
pub mod srs_state;

pub use learner::LearnerRepository;
pub use lemma::LemmaRepository;
pub use lesson::LessonRepository;
pub use srs_state::SrsStateRepository;
