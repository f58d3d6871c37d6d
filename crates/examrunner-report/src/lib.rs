//! examrunner-report: HTML rendering of exam reports.
//!
//! JSON and markdown output live on `ExamReport` itself in `examrunner-core`.

pub mod html;
