//! Per-iteration text log (spec §6): UTF-8 records of init_loss,
//! current_loss, per-parameter accept/reject decisions, stability-check
//! outcomes and filtering-pass ranges, mirrored to stdout via the `log`
//! crate. Grounded on the teacher's convention of a small owned writer
//! type rather than a process-wide logger (spec §9 "process-wide logger"
//! design note: lifted into an explicit sink passed through the caller).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anc_engine::IterationReport;

use crate::error::IoResult;

/// Iteration-record log sink. Writing a record always mirrors it to
/// stdout through `log::info!`/`log::debug!`; the file handle is optional
/// so a caller with no `log_path` configured still gets console output.
pub struct IterationLog {
    file: Option<BufWriter<File>>,
}

impl IterationLog {
    /// Open (truncating) the log file at `path`, or build a console-only
    /// sink if `path` is `None`.
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> IoResult<Self> {
        let file = match path {
            Some(p) => Some(BufWriter::new(File::create(p)?)),
            None => None,
        };
        Ok(Self { file })
    }

    /// Write one iteration's record: `report.summary_line()` plus the
    /// filtering-pass range, if the iteration was accepted.
    pub fn record(&mut self, report: &IterationReport, filtering_range: Option<(usize, usize)>) -> IoResult<()> {
        let mut line = report.summary_line();
        if let Some((start, end)) = filtering_range {
            line.push_str(&format!(", filtering pass [{start}..{end})"));
        }

        log::info!("{line}");

        if let Some(file) = &mut self.file {
            writeln!(file, "{line}")?;
        }
        Ok(())
    }

    /// Flush the underlying file, if any.
    pub fn flush(&mut self) -> IoResult<()> {
        if let Some(file) = &mut self.file {
            file.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anc_engine::stability::{RejectReason, Verdict};
    use std::io::Read;
    use tempfile::NamedTempFile;

    #[test]
    fn console_only_sink_accepts_records() {
        let mut sink = IterationLog::open::<&str>(None).unwrap();
        let report = IterationReport::rejected(0, Verdict::Reject(RejectReason::Smoothness));
        sink.record(&report, None).unwrap();
    }

    #[test]
    fn file_sink_writes_records_to_disk() {
        let file = NamedTempFile::new().unwrap();
        let mut sink = IterationLog::open(Some(file.path())).unwrap();
        let report = IterationReport::rejected(3, Verdict::Reject(RejectReason::GlobalShift));
        sink.record(&report, Some((100, 200))).unwrap();
        sink.flush().unwrap();

        let mut contents = String::new();
        File::open(file.path()).unwrap().read_to_string(&mut contents).unwrap();
        assert!(contents.contains("iteration 3"));
        assert!(contents.contains("[100..200)"));
    }
}
