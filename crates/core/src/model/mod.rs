mod defect;
mod generated;
mod ids;
mod material;
mod module;

pub use defect::{ContentDefect, ContentItem, DefectKind};
pub use generated::{Flashcard, GeneratedContent, QuizQuestion, Summary};
pub use ids::{MaterialId, ModuleId, ParseIdError};
pub use material::{
    DEFAULT_MATERIAL_KIND, Material, MaterialError, StoredFile, title_and_kind_from_file_name,
};
pub use module::{Module, ModuleError};
