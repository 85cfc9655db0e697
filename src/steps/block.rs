//! Delimited-block removal step.
//!
//! Rewrites a line-oriented file with one marked block removed, preserving
//! every byte outside the block. The block is three or more lines: a begin
//! marker, a line carrying a required inner marker, any further payload,
//! and an end marker. A begin line not followed by the inner marker is a
//! false match and passes through untouched; a block that opens but never
//! closes is a hard error and the live file is not rewritten.
use std::fs;
use std::path::PathBuf;

use crate::fs::atomic::write_atomic;
use crate::fs::Scratch;
use crate::steps::MigrationStep;
use crate::types::errors::{Result, StepError};

/// Line-scanner states. Terminal is `Done`; reaching end of input in any
/// other state means the expected block was never fully found.
enum Scan<'a> {
    Seeking,
    Buffering { held: &'a str },
    Matched,
    Done,
}

/// Remove the single delimited block from `input`.
///
/// Lines are split inclusive of their terminators, so everything outside
/// the block is reproduced byte-for-byte, including a missing final
/// newline.
fn strip_block(
    input: &str,
    path: &std::path::Path,
    begin: &str,
    inner: &str,
    end: &str,
) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut state = Scan::Seeking;
    for line in input.split_inclusive('\n') {
        state = match state {
            Scan::Seeking if line.contains(begin) => Scan::Buffering { held: line },
            Scan::Seeking => {
                out.push_str(line);
                Scan::Seeking
            }
            Scan::Buffering { .. } if line.contains(inner) => Scan::Matched,
            Scan::Buffering { held } => {
                // false match: the held begin line is restored verbatim
                out.push_str(held);
                out.push_str(line);
                Scan::Seeking
            }
            Scan::Matched if line.contains(end) => Scan::Done,
            Scan::Matched => {
                return Err(StepError::MalformedBlock {
                    path: path.to_path_buf(),
                    msg: "begin and inner markers matched but content precedes the end marker"
                        .to_string(),
                })
            }
            Scan::Done => {
                out.push_str(line);
                Scan::Done
            }
        };
    }
    if !matches!(state, Scan::Done) {
        return Err(StepError::MalformedBlock {
            path: path.to_path_buf(),
            msg: "expected block was never fully found".to_string(),
        });
    }
    Ok(out)
}

/// Excises one marked block from a line-oriented file.
///
/// The file is snapshotted before the rewrite and the rewrite itself is
/// staged-then-renamed, so both an interrupted write and a later pipeline
/// failure leave or restore the original bytes.
pub struct RemoveBlock {
    path: PathBuf,
    begin: String,
    inner: String,
    end: String,
}

impl RemoveBlock {
    pub fn new(
        path: impl Into<PathBuf>,
        begin: impl Into<String>,
        inner: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            begin: begin.into(),
            inner: inner.into(),
            end: end.into(),
        }
    }
}

impl MigrationStep for RemoveBlock {
    fn name(&self) -> String {
        format!("remove-block:{}", self.path.display())
    }

    fn path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }

    fn snapshot(&self, scratch: &Scratch) -> Result<()> {
        scratch.snapshot(&self.path)
    }

    fn run(&self) -> Result<()> {
        let input = fs::read_to_string(&self.path)?;
        let output = strip_block(&input, &self.path, &self.begin, &self.inner, &self.end)?;
        write_atomic(&self.path, output.as_bytes())?;
        Ok(())
    }

    fn rollback(&self, scratch: &Scratch) -> Result<()> {
        scratch.restore(&self.path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::Path;

    const BEGIN: &str = "### BEGIN X ###";
    const INNER: &str = "marker-line";
    const END: &str = "### END X ###";

    fn strip(input: &str) -> Result<String> {
        strip_block(input, Path::new("/t"), BEGIN, INNER, END)
    }

    #[test]
    fn removes_block_and_preserves_surroundings() {
        let input = "A\n### BEGIN X ###\nmarker-line\npayload\n### END X ###\nB\n";
        assert_eq!(strip(input).unwrap(), "A\nB\n");
    }

    #[test]
    fn preserves_missing_final_newline() {
        let input = "### BEGIN X ###\nmarker-line\n### END X ###\nB";
        assert_eq!(strip(input).unwrap(), "B");
    }

    #[test]
    fn false_match_is_restored_in_order() {
        let input = "A\n### BEGIN X ###\nnot-the-marker\nB\n\
                     ### BEGIN X ###\nmarker-line\n### END X ###\nC\n";
        assert_eq!(
            strip(input).unwrap(),
            "A\n### BEGIN X ###\nnot-the-marker\nB\nC\n"
        );
    }

    #[test]
    fn lines_after_done_pass_through_even_if_marked() {
        let input = "### BEGIN X ###\nmarker-line\n### END X ###\n### BEGIN X ###\n";
        assert_eq!(strip(input).unwrap(), "### BEGIN X ###\n");
    }

    #[test]
    fn unterminated_block_is_malformed() {
        let input = "### BEGIN X ###\nmarker-line\nstray content\n";
        let err = strip(input).unwrap_err();
        assert!(matches!(err, StepError::MalformedBlock { .. }));
    }

    #[test]
    fn eof_before_end_marker_is_malformed() {
        let input = "### BEGIN X ###\nmarker-line\n";
        let err = strip(input).unwrap_err();
        assert!(matches!(err, StepError::MalformedBlock { .. }));
    }

    #[test]
    fn absent_block_is_malformed() {
        let err = strip("just\nordinary\nlines\n").unwrap_err();
        assert!(matches!(err, StepError::MalformedBlock { .. }));
    }

    #[test]
    fn eof_while_buffering_is_malformed() {
        let err = strip("A\n### BEGIN X ###\n").unwrap_err();
        assert!(matches!(err, StepError::MalformedBlock { .. }));
    }

    #[test]
    fn run_leaves_file_untouched_on_malformed_input() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("tab");
        fs::write(&p, "no block here\n").unwrap();
        let step = RemoveBlock::new(&p, BEGIN, INNER, END);
        step.run().unwrap_err();
        assert_eq!(fs::read_to_string(&p).unwrap(), "no block here\n");
    }

    #[test]
    fn run_rewrites_file_and_rollback_restores_it() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("tab");
        let original = "keep1\n### BEGIN X ###\nmarker-line\n### END X ###\nkeep2\n";
        fs::write(&p, original).unwrap();

        let scratch = Scratch::new().unwrap();
        let step = RemoveBlock::new(&p, BEGIN, INNER, END);
        step.snapshot(&scratch).unwrap();
        step.run().unwrap();
        assert_eq!(fs::read_to_string(&p).unwrap(), "keep1\nkeep2\n");

        step.rollback(&scratch).unwrap();
        assert_eq!(fs::read_to_string(&p).unwrap(), original);
    }
}
