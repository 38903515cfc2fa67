//! Analysis-definition library: converts OSW workflows into OSA analyses and
//! persists them as `analysis.json` and `analysis.zip`.

mod algorithm;
mod analysis;
mod bundle;
mod document;
mod measure;
mod osw;
mod output;
mod workflow;

pub use algorithm::Algorithm;
pub use analysis::{Analysis, Library, RunFlags};
pub use bundle::save_osa_zip;
pub use document::{analysis_document, AnalysisDocument};
pub use measure::{
    Argument, Distribution, DistributionKind, Measure, UncertaintyAttribute,
    UncertaintyDescription, Variable, SKIP_ARGUMENT,
};
pub use osw::{OswDocument, OswStep};
pub use output::Output;
pub use workflow::Workflow;
