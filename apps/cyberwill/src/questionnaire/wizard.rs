//! Profile creation wizard: name and stage, then the questionnaire, then analysis.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{GirlProfile, NewProfile, RelationshipStage, Traits};
use crate::questionnaire::analysis::{fallback_analysis, ProfileAnalyzer};
use crate::questionnaire::questions::{Question, QUESTIONS};
use crate::questionnaire::scoring::{Choice, QuestionnaireAnswer, TraitScore};
use crate::storage::ProfileStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    /// Waiting for the answer to the question at this index.
    AwaitingAnswer(usize),
    Complete,
}

/// Walks a fixed question list forwards and backwards, one vote per question.
#[derive(Debug, Clone)]
pub struct Questionnaire {
    questions: &'static [Question],
    answers: Vec<QuestionnaireAnswer>,
}

impl Default for Questionnaire {
    fn default() -> Self {
        Self::new()
    }
}

impl Questionnaire {
    pub fn new() -> Self {
        Self::with_questions(&QUESTIONS)
    }

    pub fn with_questions(questions: &'static [Question]) -> Self {
        Self {
            questions,
            answers: Vec::with_capacity(questions.len()),
        }
    }

    pub fn state(&self) -> WizardState {
        if self.answers.len() >= self.questions.len() {
            WizardState::Complete
        } else {
            WizardState::AwaitingAnswer(self.answers.len())
        }
    }

    pub fn current_question(&self) -> Option<&'static Question> {
        match self.state() {
            WizardState::AwaitingAnswer(i) => self.questions.get(i),
            WizardState::Complete => None,
        }
    }

    /// Records a vote for the current question and moves forward.
    pub fn answer(&mut self, choice: Choice) -> Result<WizardState, AppError> {
        let question = self.current_question().ok_or_else(|| {
            AppError::Validation("questionnaire is already complete".to_string())
        })?;
        self.answers.push(QuestionnaireAnswer::new(question, choice));
        Ok(self.state())
    }

    /// Discards the most recent vote. `None` means there was nothing to undo
    /// and the caller should leave the questionnaire.
    pub fn back(&mut self) -> Option<WizardState> {
        self.answers.pop()?;
        Some(self.state())
    }

    /// (answered, total)
    pub fn progress(&self) -> (usize, usize) {
        (self.answers.len(), self.questions.len())
    }

    pub fn score(&self) -> TraitScore {
        TraitScore::from_answers(&self.answers)
    }

    /// Trait labels, once every question has been answered.
    pub fn traits(&self) -> Option<Traits> {
        match self.state() {
            WizardState::Complete => Some(self.score().traits()),
            WizardState::AwaitingAnswer(_) => None,
        }
    }
}

/// In-progress profile. Dropping it abandons every vote.
#[derive(Debug, Clone)]
pub struct ProfileDraft {
    pub name: String,
    pub stage: RelationshipStage,
    pub questionnaire: Questionnaire,
}

impl ProfileDraft {
    pub fn new(name: &str, stage: RelationshipStage) -> Result<Self, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            stage,
            questionnaire: Questionnaire::new(),
        })
    }
}

/// Finishes a completed draft: asks the analyzer for an archetype and
/// description, then persists and selects the profile.
///
/// Analysis failure never blocks creation; the fallback archetype and
/// description are stored instead.
pub async fn complete_profile(
    draft: &ProfileDraft,
    analyzer: &dyn ProfileAnalyzer,
    store: &mut ProfileStore,
) -> Result<GirlProfile, AppError> {
    let traits = draft
        .questionnaire
        .traits()
        .ok_or_else(|| AppError::Validation("questionnaire is not complete".to_string()))?;

    let analysis = match analyzer.analyze(&draft.name, draft.stage, traits).await {
        Ok(analysis) => {
            info!(archetype = %analysis.archetype, "Profile analysis received");
            analysis
        }
        Err(e) => {
            warn!(code = e.code(), "Profile analysis failed, using fallback: {e}");
            fallback_analysis()
        }
    };

    store.add_profile(NewProfile {
        name: draft.name.clone(),
        stage: draft.stage,
        description: analysis.analysis,
        traits: Some(traits),
        archetype: Some(analysis.archetype),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::StatusCode;

    use super::*;
    use crate::backend_client::ProfileAnalysis;
    use crate::models::{ConflictStyle, InvestmentStyle, ThinkingStyle};
    use crate::questionnaire::analysis::{BackendAnalyzer, FALLBACK_ANALYSIS, FALLBACK_ARCHETYPE};
    use crate::storage::MemoryStore;
    use crate::test_support::{AnalyzeScript, ChatScript, MockBackend};

    struct FixedAnalyzer;

    #[async_trait]
    impl ProfileAnalyzer for FixedAnalyzer {
        async fn analyze(
            &self,
            name: &str,
            _stage: RelationshipStage,
            _traits: Traits,
        ) -> Result<ProfileAnalysis, AppError> {
            Ok(ProfileAnalysis {
                archetype: "邻家女孩".to_string(),
                analysis: format!("{name} 温柔体贴"),
            })
        }
    }

    fn completed_draft(name: &str, stage: RelationshipStage, choice: Choice) -> ProfileDraft {
        let mut draft = ProfileDraft::new(name, stage).unwrap();
        while draft.questionnaire.state() != WizardState::Complete {
            draft.questionnaire.answer(choice).unwrap();
        }
        draft
    }

    fn empty_store() -> ProfileStore {
        ProfileStore::load(Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_forward_through_all_questions() {
        let mut q = Questionnaire::new();
        assert_eq!(q.state(), WizardState::AwaitingAnswer(0));
        assert_eq!(q.current_question().map(|q| q.id), Some(1));
        for i in 1..QUESTIONS.len() {
            assert_eq!(q.answer(Choice::A).unwrap(), WizardState::AwaitingAnswer(i));
        }
        assert_eq!(q.answer(Choice::B).unwrap(), WizardState::Complete);
        assert!(q.current_question().is_none());
        assert_eq!(q.progress(), (15, 15));
        assert!(matches!(q.answer(Choice::A), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_skip_advances_with_zero_vote() {
        let mut q = Questionnaire::new();
        assert_eq!(q.answer(Choice::Skip).unwrap(), WizardState::AwaitingAnswer(1));
        assert_eq!(q.answers[0].axis_vote, 0.0);
    }

    #[test]
    fn test_back_discards_latest_vote() {
        let mut q = Questionnaire::new();
        assert_eq!(q.back(), None);

        q.answer(Choice::A).unwrap();
        q.answer(Choice::B).unwrap();
        assert_eq!(q.back(), Some(WizardState::AwaitingAnswer(1)));
        assert_eq!(q.answers.len(), 1);
        assert_eq!(q.answers[0].choice, Choice::A);

        q.answer(Choice::Skip).unwrap();
        assert_eq!(q.answers[1].choice, Choice::Skip);
    }

    #[test]
    fn test_back_from_complete_reopens_last_question() {
        let mut q = Questionnaire::new();
        while q.state() != WizardState::Complete {
            q.answer(Choice::A).unwrap();
        }
        assert!(q.traits().is_some());
        assert_eq!(q.back(), Some(WizardState::AwaitingAnswer(14)));
        assert!(q.traits().is_none());
    }

    #[test]
    fn test_draft_requires_name() {
        assert!(matches!(
            ProfileDraft::new("  ", RelationshipStage::Friend),
            Err(AppError::Validation(_))
        ));
        assert_eq!(
            ProfileDraft::new(" 小美 ", RelationshipStage::Friend).unwrap().name,
            "小美"
        );
    }

    #[tokio::test]
    async fn test_incomplete_draft_is_rejected() {
        let draft = ProfileDraft::new("小美", RelationshipStage::Friend).unwrap();
        let mut store = empty_store();
        let result = complete_profile(&draft, &FixedAnalyzer, &mut store).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.profiles().is_empty());
    }

    #[tokio::test]
    async fn test_successful_analysis_is_stored() {
        let draft = completed_draft("小美", RelationshipStage::Situationship, Choice::A);
        let mut store = empty_store();

        let profile = complete_profile(&draft, &FixedAnalyzer, &mut store).await.unwrap();

        assert_eq!(profile.archetype.as_deref(), Some("邻家女孩"));
        assert_eq!(profile.description, "小美 温柔体贴");
        assert_eq!(store.current().map(|p| p.id), Some(profile.id));
    }

    #[tokio::test]
    async fn test_analysis_500_falls_back_and_still_creates_profile() {
        let backend = MockBackend::start(
            ChatScript::Status(StatusCode::NOT_FOUND),
            AnalyzeScript::Status(StatusCode::INTERNAL_SERVER_ERROR),
        )
        .await;
        let analyzer = BackendAnalyzer(backend.client());
        let draft = completed_draft("小美", RelationshipStage::Friend, Choice::Skip);
        let mut store = empty_store();

        let profile = complete_profile(&draft, &analyzer, &mut store).await.unwrap();

        assert_eq!(profile.name, "小美");
        assert_eq!(profile.stage, RelationshipStage::Friend);
        assert_eq!(profile.description, FALLBACK_ANALYSIS);
        assert!(!profile.description.is_empty());
        assert_eq!(profile.archetype.as_deref(), Some(FALLBACK_ARCHETYPE));
        assert_eq!(
            profile.traits,
            Some(Traits {
                investment: InvestmentStyle::Test,
                rationality: ThinkingStyle::Emotional,
                openness: ConflictStyle::Avoidant,
            })
        );
        assert_eq!(store.profiles().len(), 1);

        let requests = backend.analyze_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["name"], "小美");
        assert_eq!(requests[0]["stage"], "Friend");
        assert_eq!(requests[0]["traits"]["investment"], "测试");
    }

    #[tokio::test]
    async fn test_backend_analysis_success() {
        let backend = MockBackend::start(
            ChatScript::Status(StatusCode::NOT_FOUND),
            AnalyzeScript::Ok {
                archetype: "高冷御姐".to_string(),
                analysis: "独立而理性".to_string(),
            },
        )
        .await;
        let analyzer = BackendAnalyzer(backend.client());
        let draft = completed_draft("Luna", RelationshipStage::Girlfriend, Choice::A);
        let mut store = empty_store();

        let profile = complete_profile(&draft, &analyzer, &mut store).await.unwrap();
        assert_eq!(profile.archetype.as_deref(), Some("高冷御姐"));
        assert_eq!(profile.description, "独立而理性");
        assert_eq!(backend.analyze_requests()[0]["traits"]["rationality"], "理性");
    }
}
