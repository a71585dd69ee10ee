// Resume API
// Upload, storage, persistence and background analysis around the
// stateless analysis engine in `crate::analysis`.

pub mod handlers;
pub mod jobs;
pub mod repository;
pub mod service;
pub mod skills;
pub mod storage;
