//! XMLTV guide generation
//!
//! - `transformer`: grid record -> programme (or skip)
//! - `writer`: streaming XMLTV element emission
//! - `generator`: the run itself, from lineup resolution to the closed document

pub mod generator;
pub mod transformer;
pub mod writer;

pub use generator::{
    source_info_url, source_info_url_from_env, GenerationConfig, GenerationStatistics,
    XmltvGenerator,
};
pub use transformer::ProgrammeTransformer;
pub use writer::{DocumentHeader, XmltvWriter, SOURCE_INFO_NAME};
