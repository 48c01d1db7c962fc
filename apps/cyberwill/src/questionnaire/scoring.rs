use crate::models::{ConflictStyle, InvestmentStyle, ThinkingStyle, Traits};
use crate::questionnaire::questions::{Question, TraitAxis};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Left option.
    A,
    /// Right option.
    B,
    Skip,
}

/// One recorded vote.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionnaireAnswer {
    pub question_id: u32,
    pub choice: Choice,
    pub axis: TraitAxis,
    /// Signed weight: `+weight` for A, `-weight` for B, `0` for skip.
    pub axis_vote: f64,
}

impl QuestionnaireAnswer {
    pub fn new(question: &Question, choice: Choice) -> Self {
        let axis_vote = match choice {
            Choice::A => question.weight,
            Choice::B => -question.weight,
            Choice::Skip => 0.0,
        };
        Self {
            question_id: question.id,
            choice,
            axis: question.axis,
            axis_vote,
        }
    }
}

/// Per-axis running sums.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TraitScore {
    pub investment: f64,
    pub rationality: f64,
    pub openness: f64,
}

impl TraitScore {
    pub fn from_answers(answers: &[QuestionnaireAnswer]) -> Self {
        answers.iter().fold(Self::default(), |mut score, answer| {
            *score.axis_mut(answer.axis) += answer.axis_vote;
            score
        })
    }

    fn axis_mut(&mut self, axis: TraitAxis) -> &mut f64 {
        match axis {
            TraitAxis::Investment => &mut self.investment,
            TraitAxis::Rationality => &mut self.rationality,
            TraitAxis::Openness => &mut self.openness,
        }
    }

    /// Labels each axis by the sign of its sum. Zero (including "all skipped")
    /// falls to the right-hand label: test, emotional, avoidant.
    pub fn traits(&self) -> Traits {
        Traits {
            investment: if self.investment > 0.0 {
                InvestmentStyle::Investment
            } else {
                InvestmentStyle::Test
            },
            rationality: if self.rationality > 0.0 {
                ThinkingStyle::Rational
            } else {
                ThinkingStyle::Emotional
            },
            openness: if self.openness > 0.0 {
                ConflictStyle::Open
            } else {
                ConflictStyle::Avoidant
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::questions::QUESTIONS;

    fn answer_all(choice_for: impl Fn(&Question) -> Choice) -> Vec<QuestionnaireAnswer> {
        QUESTIONS
            .iter()
            .map(|q| QuestionnaireAnswer::new(q, choice_for(q)))
            .collect()
    }

    #[test]
    fn test_vote_sign_follows_choice() {
        let q = &QUESTIONS[0];
        assert_eq!(QuestionnaireAnswer::new(q, Choice::A).axis_vote, 0.37);
        assert_eq!(QuestionnaireAnswer::new(q, Choice::B).axis_vote, -0.37);
        assert_eq!(QuestionnaireAnswer::new(q, Choice::Skip).axis_vote, 0.0);
    }

    #[test]
    fn test_all_skipped_yields_default_labels() {
        let score = TraitScore::from_answers(&answer_all(|_| Choice::Skip));
        assert_eq!(score, TraitScore::default());
        assert_eq!(
            score.traits(),
            Traits {
                investment: InvestmentStyle::Test,
                rationality: ThinkingStyle::Emotional,
                openness: ConflictStyle::Avoidant,
            }
        );
    }

    #[test]
    fn test_all_left_yields_left_labels() {
        let traits = TraitScore::from_answers(&answer_all(|_| Choice::A)).traits();
        assert_eq!(traits.investment, InvestmentStyle::Investment);
        assert_eq!(traits.rationality, ThinkingStyle::Rational);
        assert_eq!(traits.openness, ConflictStyle::Open);
    }

    #[test]
    fn test_axes_are_independent() {
        let answers = answer_all(|q| match q.axis {
            TraitAxis::Investment => Choice::A,
            TraitAxis::Rationality => Choice::B,
            TraitAxis::Openness => Choice::Skip,
        });
        let score = TraitScore::from_answers(&answers);
        assert!((score.investment - 1.20).abs() < 1e-9);
        assert!((score.rationality + 1.10).abs() < 1e-9);
        assert_eq!(score.openness, 0.0);
        let traits = score.traits();
        assert_eq!(traits.investment, InvestmentStyle::Investment);
        assert_eq!(traits.rationality, ThinkingStyle::Emotional);
        assert_eq!(traits.openness, ConflictStyle::Avoidant);
    }

    #[test]
    fn test_heavier_question_outweighs_lighter_ones() {
        // Q1 (0.37) left vs Q3 (0.2) + Q4 (0.15) right: 0.37 - 0.35 > 0.
        let answers: Vec<_> = [(0, Choice::A), (2, Choice::B), (3, Choice::B)]
            .iter()
            .map(|&(i, c)| QuestionnaireAnswer::new(&QUESTIONS[i], c))
            .collect();
        assert_eq!(
            TraitScore::from_answers(&answers).traits().investment,
            InvestmentStyle::Investment
        );
    }

    #[test]
    fn test_same_answers_same_labels() {
        let pick = |q: &Question| if q.id % 3 == 0 { Choice::B } else { Choice::A };
        let first = TraitScore::from_answers(&answer_all(pick)).traits();
        for _ in 0..10 {
            assert_eq!(TraitScore::from_answers(&answer_all(pick)).traits(), first);
        }
    }
}
