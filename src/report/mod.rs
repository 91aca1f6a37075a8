//! Derived reports and terminal output.
//!
//! - `skills`: skill token frequencies from job titles and categories
//! - `jobs`: country ranking, daily publication counts, salary averages
//! - `format`: summaries printed by the CLI

pub mod format;
pub mod jobs;
pub mod skills;

pub use format::{format_fetch_summary, format_process_summary, format_status};
pub use jobs::{average_salaries, job_growth_daily, jobs_by_country, salary_value};
pub use skills::SkillTokenExtractor;
