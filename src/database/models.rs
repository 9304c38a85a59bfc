pub mod brand;
pub mod job;
pub mod job_status;
pub mod job_type;
pub mod post;
pub mod scheduled_post;
pub mod scheduled_post_status;
