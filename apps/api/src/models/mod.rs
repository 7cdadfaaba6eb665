pub mod job_analysis;
pub mod resume;
