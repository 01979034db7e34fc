pub mod dictionary;
pub mod job_parser;
pub mod patterns;
pub mod resume_parser;
pub mod sections;

pub use dictionary::Dictionary;
pub use job_parser::JobAnalyzer;
pub use resume_parser::ResumeExtractor;
