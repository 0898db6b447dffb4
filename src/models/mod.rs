pub mod employee;
pub mod envelope;
pub mod id;
pub mod review;
pub mod stats;
pub mod timeline;
pub mod video;
pub mod work;
pub mod work_update;
