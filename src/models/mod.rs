// Model exports
pub mod defaults;
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    DocumentCategory, Lead, LeadCriteria, LeadStatus, Property, PropertyType, Recommendation,
    RecommendationResponse, StoredDocument,
};
pub use requests::{
    AskRequest, InventorySourceKind, NewPropertyRequest, RankRequest, RecommendationsRequest,
    SyncLeadsRequest, UploadDocumentRequest,
};
pub use responses::{
    AnswerResponse, ErrorResponse, HealthResponse, RankedRecommendation, RecommendationsResponse,
};
