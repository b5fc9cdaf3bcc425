//! JobSource trait - Job Source interface
//!
//! Produces a finite, ordered sequence of job descriptors.

use std::collections::VecDeque;

use crate::{ContractError, JobDescriptor, JobManifest};

/// Finite ordered source of jobs
///
/// A failing source is fatal for the whole run: the dispatcher reads the
/// source to the end before it dispatches anything.
pub trait JobSource {
    /// Next job, `Ok(None)` at end of sequence
    ///
    /// # Errors
    /// Returns an error if the source cannot be read or a record is malformed
    fn next_job(&mut self) -> Result<Option<JobDescriptor>, ContractError>;
}

/// In-memory job source
#[derive(Debug, Clone, Default)]
pub struct VecJobSource {
    jobs: VecDeque<JobDescriptor>,
}

impl VecJobSource {
    /// Create a source yielding `jobs` in order
    pub fn new(jobs: impl IntoIterator<Item = JobDescriptor>) -> Self {
        Self {
            jobs: jobs.into_iter().collect(),
        }
    }

    /// Remaining job count
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl JobSource for VecJobSource {
    fn next_job(&mut self) -> Result<Option<JobDescriptor>, ContractError> {
        Ok(self.jobs.pop_front())
    }
}

impl From<&JobManifest> for VecJobSource {
    fn from(manifest: &JobManifest) -> Self {
        Self::new(manifest.descriptors())
    }
}

impl FromIterator<JobDescriptor> for VecJobSource {
    fn from_iter<I: IntoIterator<Item = JobDescriptor>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_source_preserves_order() {
        let mut source = VecJobSource::new(vec![
            JobDescriptor::new("a", "http://a.example/"),
            JobDescriptor::new("b", "http://b.example/"),
        ]);
        assert_eq!(source.len(), 2);
        assert_eq!(source.next_job().unwrap().unwrap().name(), "a");
        assert_eq!(source.next_job().unwrap().unwrap().name(), "b");
        assert!(source.next_job().unwrap().is_none());
        assert!(source.is_empty());
    }
}
