//! Batch runner: discover input files and process each one independently.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Deserialize;
use walkdir::WalkDir;

use super::export::{read_json, Exporter};
use super::work::{resolve_work, WorkFile};
use crate::bible::ChapterLengths;
use crate::canon::{SectionRecord, VerseToCanonIndex};
use crate::commentary::UnparseablePolicy;
use crate::constants::input::{CANON_SUFFIX, WORK_SUFFIX};
use crate::error::{Error, Result};

/// What an input file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// A commentary work (`*.units.json`).
    Work,
    /// Eusebian canon sections (`*.canon.json`).
    Canon,
}

/// One input file to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Input file.
    pub path: PathBuf,
    /// Kind, from the file suffix.
    pub kind: JobKind,
}

impl Job {
    /// Classify `path` by suffix; `None` for files that are not inputs.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let kind = if name.ends_with(WORK_SUFFIX) {
            JobKind::Work
        } else if name.ends_with(CANON_SUFFIX) {
            JobKind::Canon
        } else {
            return None;
        };
        Some(Self { path: path.to_path_buf(), kind })
    }

    /// File name without the input suffix.
    pub fn stem(&self) -> &str {
        let suffix = match self.kind {
            JobKind::Work => WORK_SUFFIX,
            JobKind::Canon => CANON_SUFFIX,
        };
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(suffix))
            .unwrap_or_default()
    }
}

/// Canon input file layout.
#[derive(Debug, Clone, Deserialize)]
struct CanonFile {
    sections: Vec<SectionRecord>,
}

/// Outcome of one job.
#[derive(Debug)]
pub struct JobReport {
    /// Input file.
    pub path: PathBuf,
    /// Files written, or why none were.
    pub result: Result<Vec<PathBuf>>,
    /// Numbering gaps met while resolving (works only).
    pub gaps: usize,
}

/// Outcome of a whole batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Per-job outcomes in input order.
    pub jobs: Vec<JobReport>,
}

impl BatchReport {
    /// Jobs that failed.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &Error)> {
        self.jobs
            .iter()
            .filter_map(|job| job.result.as_ref().err().map(|e| (job.path.as_path(), e)))
    }

    /// Number of jobs that failed.
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Every file written.
    pub fn written(&self) -> Vec<&Path> {
        self.jobs
            .iter()
            .filter_map(|job| job.result.as_ref().ok())
            .flatten()
            .map(PathBuf::as_path)
            .collect()
    }

    /// Total numbering gaps across works.
    pub fn gap_count(&self) -> usize {
        self.jobs.iter().map(|job| job.gaps).sum()
    }
}

/// Find input files below `dir`, sorted by path.
pub fn discover(dir: &Path) -> Vec<Job> {
    let mut jobs: Vec<Job> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Job::from_path(e.path()))
        .collect();
    jobs.sort_by(|a, b| a.path.cmp(&b.path));
    jobs
}

/// A job's input, read but not yet processed.
enum Input {
    Work(WorkFile),
    Canon(CanonFile),
}

impl Input {
    fn load(job: &Job) -> Result<Self> {
        match job.kind {
            JobKind::Work => read_json(&job.path).map(Self::Work),
            JobKind::Canon => read_json(&job.path).map(Self::Canon),
        }
    }

    /// Directory below the output root this input writes into.
    fn output_name<'a>(&'a self, job: &'a Job) -> Result<&'a str> {
        match self {
            Self::Work(file) => file.dir_name(),
            Self::Canon(_) => Ok(job.stem()),
        }
    }
}

/// Process every job in parallel. One job failing never affects another.
///
/// Inputs are read first; jobs that would write the same output directory
/// all fail with [`Error::OutputConflict`] before anything is written.
///
/// # Arguments
/// * `jobs` - Input files, typically from [`discover`]
/// * `lengths` - Chapter-length table shared by all works
/// * `policy` - Default unparseable-reference policy
/// * `exporter` - Where results are written
pub fn run_batch(
    jobs: &[Job],
    lengths: &ChapterLengths,
    policy: UnparseablePolicy,
    exporter: &dyn Exporter,
) -> BatchReport {
    let start = Instant::now();
    let mut inputs: Vec<Result<Input>> = jobs.par_iter().map(Input::load).collect();
    reject_conflicts(jobs, &mut inputs);

    let reports: Vec<JobReport> = jobs
        .par_iter()
        .zip(inputs.into_par_iter())
        .map(|(job, input)| {
            let (result, gaps) = match input {
                Ok(Input::Work(file)) => run_work(&file, lengths, policy, exporter),
                Ok(Input::Canon(file)) => (run_canon(job, &file, exporter).map(|p| vec![p]), 0),
                Err(e) => (Err(e), 0),
            };
            if let Err(e) = &result {
                tracing::error!("{}: {e}", job.path.display());
            }
            JobReport { path: job.path.clone(), result, gaps }
        })
        .collect();

    let report = BatchReport { jobs: reports };
    let elapsed = start.elapsed();
    tracing::info!(
        "Processed {} inputs in {elapsed:?}: {} files written, {} failed, {} numbering gaps",
        report.jobs.len(),
        report.written().len(),
        report.failure_count(),
        report.gap_count()
    );
    report
}

/// Fail every input whose output directory another input also claims.
fn reject_conflicts(jobs: &[Job], inputs: &mut [Result<Input>]) {
    let names: Vec<Option<String>> = jobs
        .iter()
        .zip(inputs.iter())
        .map(|(job, input)| {
            let input = input.as_ref().ok()?;
            input.output_name(job).ok().map(str::to_string)
        })
        .collect();

    let mut claims: HashMap<&str, usize> = HashMap::new();
    for name in names.iter().flatten() {
        *claims.entry(name.as_str()).or_default() += 1;
    }

    for (input, name) in inputs.iter_mut().zip(&names) {
        let Some(name) = name else { continue };
        let count = claims.get(name.as_str()).copied().unwrap_or_default();
        if count > 1 {
            *input = Err(Error::OutputConflict { name: name.clone(), count });
        }
    }
}

fn run_work(
    file: &WorkFile,
    lengths: &ChapterLengths,
    policy: UnparseablePolicy,
    exporter: &dyn Exporter,
) -> (Result<Vec<PathBuf>>, usize) {
    match resolve_work(file, lengths, policy) {
        Ok(work) => {
            let gaps = work.gaps.len();
            tracing::info!("{}: resolved {} units on {}", work.name, work.units.len(), work.book);
            (exporter.export_work(&work), gaps)
        }
        Err(e) => (Err(e), 0),
    }
}

fn run_canon(job: &Job, file: &CanonFile, exporter: &dyn Exporter) -> Result<PathBuf> {
    let index = VerseToCanonIndex::build(&file.sections)?;
    exporter.export_canon(job.stem(), &index)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::services::export::JsonDirectory;

    #[test]
    fn test_job_classification() {
        let job = Job::from_path(Path::new("sources/chrysostom-john.units.json")).unwrap();
        assert_eq!(job.kind, JobKind::Work);
        assert_eq!(job.stem(), "chrysostom-john");

        let job = Job::from_path(Path::new("eusebian.canon.json")).unwrap();
        assert_eq!(job.kind, JobKind::Canon);
        assert_eq!(job.stem(), "eusebian");

        assert!(Job::from_path(Path::new("notes.json")).is_none());
    }

    const WORK: &str = r#"{
        "work": "same",
        "book": "Matthew",
        "records": [{"unit_number": 1, "title": "Matthew I. 1."}]
    }"#;

    #[test]
    fn test_conflicting_outputs_fail_before_writing() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs_err::write(input.path().join("a.units.json"), WORK).unwrap();
        fs_err::write(
            input.path().join("b.units.json"),
            WORK.replace("Matthew I. 1.", "Matthew II. 1."),
        )
        .unwrap();
        fs_err::write(input.path().join("same.canon.json"), r#"{"sections": []}"#).unwrap();
        fs_err::write(input.path().join("other.units.json"), WORK.replace("same", "other")).unwrap();

        let jobs = discover(input.path());
        let exporter = JsonDirectory::new(output.path());
        let report = run_batch(
            &jobs,
            &ChapterLengths::new_testament(),
            UnparseablePolicy::Reject,
            &exporter,
        );

        assert_eq!(report.failure_count(), 3);
        for (_, err) in report.failures() {
            assert!(matches!(err, Error::OutputConflict { count: 3, .. }), "{err}");
        }
        assert!(!output.path().join("same").exists());
        assert!(output.path().join("other").join("homily_coverage.json").is_file());
    }

    #[test]
    fn test_discover_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs_err::create_dir_all(dir.path().join("nested")).unwrap();
        fs_err::write(dir.path().join("nested/b.units.json"), "{}").unwrap();
        fs_err::write(dir.path().join("a.canon.json"), "{}").unwrap();
        fs_err::write(dir.path().join("readme.txt"), "").unwrap();

        let jobs = discover(dir.path());
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].kind, JobKind::Canon);
        assert_eq!(jobs[1].stem(), "b");
    }
}
