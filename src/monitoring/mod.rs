/*!
 * Monitoring
 * Structured tracing and scheduler reports
 */

pub mod report;
mod tracer;

pub use report::{render, sink_for, LogSink, ReportSink, StdoutSink};
pub use tracer::{init_tracing, PayloadSpan};
