//! Degsieve turns GEO2R differential-expression result tables into annotated
//! DEG tables and up/down-regulated locus-tag lists, ready for downstream
//! tools such as Venny or ShinyGO. It ingests a results table and an
//! optional GPL platform annotation table as named byte streams, joins and
//! normalizes them into [Polars](https://pola.rs/) data frames, applies
//! significance and magnitude thresholds, reduces to one probe per gene, and
//! renders deterministic byte artifacts.

pub mod annotate;
pub mod artifacts;
pub mod deg;
pub mod errors;
pub mod loader;
pub mod locus;
pub mod options;
pub mod pipeline;
pub mod schema;

pub use annotate::{AnnotationMode, AnnotationReport};
pub use artifacts::{Artifact, ArtifactSet};
pub use deg::{Classification, DegCounts};
pub use errors::DegError;
pub use loader::TableSource;
pub use locus::LocusTag;
pub use options::DegOptions;
pub use pipeline::{run, PipelineOutput};
