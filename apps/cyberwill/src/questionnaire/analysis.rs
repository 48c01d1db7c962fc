//! Profile analysis: the analyzer seam, its backend implementation and the offline fallback.
//!
//! Default: `BackendAnalyzer`, which calls `POST /analyze-profile`.

use async_trait::async_trait;

use crate::backend_client::{AnalyzeRequest, BackendClient, ProfileAnalysis};
use crate::errors::AppError;
use crate::models::{RelationshipStage, Traits};

/// Archetype stored when the analysis service cannot be reached.
pub const FALLBACK_ARCHETYPE: &str = "未知类型";
/// Description stored when the analysis service cannot be reached.
pub const FALLBACK_ANALYSIS: &str = "无法连接到分析服务器，但我们已经记录了她的性格特征。";

#[async_trait]
pub trait ProfileAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        name: &str,
        stage: RelationshipStage,
        traits: Traits,
    ) -> Result<ProfileAnalysis, AppError>;
}

pub struct BackendAnalyzer(pub BackendClient);

#[async_trait]
impl ProfileAnalyzer for BackendAnalyzer {
    async fn analyze(
        &self,
        name: &str,
        stage: RelationshipStage,
        traits: Traits,
    ) -> Result<ProfileAnalysis, AppError> {
        self.0
            .analyze_profile(&AnalyzeRequest {
                name,
                stage,
                traits,
            })
            .await
    }
}

/// Placeholder used when analysis fails.
pub fn fallback_analysis() -> ProfileAnalysis {
    ProfileAnalysis {
        archetype: FALLBACK_ARCHETYPE.to_string(),
        analysis: FALLBACK_ANALYSIS.to_string(),
    }
}
