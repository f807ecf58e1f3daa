pub mod chapter;
pub mod error;
pub mod operation;

pub use chapter::{
    Chapter, ChapterContent, ChapterSummary, ChapterUpdate, NewChapter, OrderEntry, Project,
    count_words,
};
pub use error::{ErrorKind, ErrorReport, NovelError, Result, ResultExt};
pub use operation::{
    AiOperationRequest, AnalyzeRequest, Perspective, PolishFocus, PolishOptions, PolishRequest,
    PolishStyle, RewriteLength, RewriteRequest, RewriteTone, SuggestionKind, SuggestionRequest,
};
