//! Output stream of an export.
//!
//! All store I/O has finished by the time a stream exists; it only walks the
//! ordered objects, redacting each as it is pulled, and then yields the
//! summary. Dropping the stream early is a complete cancellation.

use futures::{Stream, StreamExt};
use serde::Serialize;
use std::io::Write;
use std::pin::Pin;

use super::redact::Redactor;
use super::summary::ExportSummary;
use crate::error::Result;
use crate::object::SavedObject;

/// One element of an export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportLine {
    Object(SavedObject),
    Summary(ExportSummary),
}

impl ExportLine {
    pub fn as_object(&self) -> Option<&SavedObject> {
        match self {
            ExportLine::Object(obj) => Some(obj),
            ExportLine::Summary(_) => None,
        }
    }

    pub fn as_summary(&self) -> Option<&ExportSummary> {
        match self {
            ExportLine::Summary(summary) => Some(summary),
            ExportLine::Object(_) => None,
        }
    }
}

/// Forward-only, single-pass export output.
pub type ExportStream = Pin<Box<dyn Stream<Item = ExportLine> + Send>>;

pub(crate) fn emit(
    objects: Vec<SavedObject>,
    redactor: Redactor,
    summary: Option<ExportSummary>,
) -> ExportStream {
    Box::pin(async_stream::stream! {
        for obj in objects {
            yield ExportLine::Object(redactor.redact(obj));
        }
        if let Some(summary) = summary {
            yield ExportLine::Summary(summary);
        }
    })
}

/// Totals of a written export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub objects_written: usize,
    pub summary: Option<ExportSummary>,
}

/// Drain `stream` into `writer` as NDJSON, one compact JSON value per line.
pub async fn write_ndjson<W: Write>(mut stream: ExportStream, mut writer: W) -> Result<WriteReport> {
    let mut objects_written = 0usize;
    let mut summary = None;

    while let Some(line) = stream.next().await {
        serde_json::to_writer(&mut writer, &line)?;
        writer.write_all(b"\n")?;
        match line {
            ExportLine::Object(_) => objects_written += 1,
            ExportLine::Summary(s) => summary = Some(s),
        }
    }
    writer.flush()?;

    Ok(WriteReport {
        objects_written,
        summary,
    })
}
