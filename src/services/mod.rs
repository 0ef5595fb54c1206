pub mod catalogue;
pub mod catalogue_import;
pub mod preferences;
pub mod recommendations;

pub use catalogue_import::TmdbImporter;
pub use recommendations::Recommender;
