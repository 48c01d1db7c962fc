pub mod message;
pub mod profile;

pub use message::{ChatMessage, Role};
pub use profile::{
    ConflictStyle, GirlProfile, InvestmentStyle, NewProfile, RelationshipStage, ThinkingStyle,
    Traits,
};
