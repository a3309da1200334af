//! Hand-off of a completed summary to an external collaborator.
//!
//! Booking, charging and persistence live outside the engine. A `Submitter`
//! receives the immutable summary; any closure taking `&Summary` qualifies.

use std::io::Write;

use crate::summary::Summary;

/// Receiver of completed summaries
pub trait Submitter {
    fn submit(&mut self, summary: &Summary) -> anyhow::Result<()>;
}

impl<F> Submitter for F
where
    F: FnMut(&Summary) -> anyhow::Result<()>,
{
    fn submit(&mut self, summary: &Summary) -> anyhow::Result<()> {
        self(summary)
    }
}

/// Writes the summary as pretty JSON to any writer
#[derive(Debug)]
pub struct JsonSubmitter<W: Write> {
    writer: W,
}

impl<W: Write> JsonSubmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Submitter for JsonSubmitter<W> {
    fn submit(&mut self, summary: &Summary) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, summary)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
