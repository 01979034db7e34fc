//! File-backed persistence: JSON collections per entity plus a blob store
//! for original uploads.

pub mod blobs;
pub mod json_store;

use std::path::Path;
use std::sync::Arc;

pub use blobs::{BlobStore, LocalBlobStore};
pub use json_store::JsonCollection;

use crate::models::application::ApplicationRecord;
use crate::models::job::JobRecord;
use crate::models::resume::StoredResume;

/// All collections rooted at one data directory.
#[derive(Clone)]
pub struct Storage {
    pub resumes: JsonCollection<StoredResume>,
    pub jobs: JsonCollection<JobRecord>,
    pub applications: JsonCollection<ApplicationRecord>,
    pub blobs: Arc<dyn BlobStore>,
}

impl Storage {
    pub fn open(data_dir: &Path) -> Self {
        Self {
            resumes: JsonCollection::new(data_dir.join("resumes.json")),
            jobs: JsonCollection::new(data_dir.join("jobs.json")),
            applications: JsonCollection::new(data_dir.join("applications.json")),
            blobs: Arc::new(LocalBlobStore::new(data_dir.join("uploads"))),
        }
    }
}
