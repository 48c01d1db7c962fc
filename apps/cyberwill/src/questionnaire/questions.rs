/// The three independent personality axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraitAxis {
    /// Investment (left) vs test (right).
    Investment,
    /// Rational (left) vs emotional (right).
    Rationality,
    /// Rationalising / open (left) vs avoidant (right).
    Openness,
}

/// A forced-choice question. Picking `left` votes `+weight` on `axis`,
/// picking `right` votes `-weight`.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: u32,
    pub text: &'static str,
    pub weight: f64,
    pub axis: TraitAxis,
    pub left: &'static str,
    pub right: &'static str,
}

pub static QUESTIONS: [Question; 15] = [
    Question {
        id: 1,
        text: "她是一个怎样的人",
        weight: 0.37,
        axis: TraitAxis::Investment,
        left: "专注的投入某个兴趣的人（投资型）",
        right: "兴趣广泛，什么都想尝试的人（测试型）",
    },
    Question {
        id: 2,
        text: "当她和某人分手时",
        weight: 0.23,
        axis: TraitAxis::Investment,
        left: "通常让自己的情绪深陷其中，很难抽身出来",
        right: "虽然觉得受伤，但一旦下定决心，就会直截了当地将过去恋人的影子甩开",
    },
    Question {
        id: 3,
        text: "关于她的社交圈",
        weight: 0.2,
        axis: TraitAxis::Investment,
        left: "朋友圈子比较固定，深交的朋友多",
        right: "朋友圈子很广，认识各种各样的人",
    },
    Question {
        id: 4,
        text: "对待新事物的态度",
        weight: 0.15,
        axis: TraitAxis::Investment,
        left: "比较谨慎，喜欢深入研究后再尝试",
        right: "充满好奇，喜欢先尝试再说",
    },
    Question {
        id: 5,
        text: "在感情中的表现",
        weight: 0.25,
        axis: TraitAxis::Investment,
        left: "倾向于长期稳定的关系，愿意付出",
        right: "倾向于体验和感觉，不合适就换",
    },
    Question {
        id: 6,
        text: "做决定时",
        weight: 0.3,
        axis: TraitAxis::Rationality,
        left: "更看重逻辑和事实",
        right: "更看重感觉和直觉",
    },
    Question {
        id: 7,
        text: "面对冲突时",
        weight: 0.25,
        axis: TraitAxis::Rationality,
        left: "试图讲道理，分析对错",
        right: "情绪激动，表达感受",
    },
    Question {
        id: 8,
        text: "安慰别人时",
        weight: 0.2,
        axis: TraitAxis::Rationality,
        left: "提供解决方案和建议",
        right: "给予情感支持和共情",
    },
    Question {
        id: 9,
        text: "日常生活中",
        weight: 0.15,
        axis: TraitAxis::Rationality,
        left: "做事有计划，条理清晰",
        right: "比较随性，跟着感觉走",
    },
    Question {
        id: 10,
        text: "看电影或读书时",
        weight: 0.2,
        axis: TraitAxis::Rationality,
        left: "关注剧情逻辑和结构",
        right: "关注人物情感和氛围",
    },
    Question {
        id: 11,
        text: "遇到不开心的事情",
        weight: 0.3,
        axis: TraitAxis::Openness,
        left: "会找理由说服自己接受",
        right: "会选择逃避，不想面对",
    },
    Question {
        id: 12,
        text: "面对压力时",
        weight: 0.25,
        axis: TraitAxis::Openness,
        left: "试图分析原因，寻找合理性",
        right: "想要躲起来，暂时断联",
    },
    Question {
        id: 13,
        text: "关于承诺",
        weight: 0.2,
        axis: TraitAxis::Openness,
        left: "会解释为什么做不到",
        right: "会回避做出承诺",
    },
    Question {
        id: 14,
        text: "被批评时",
        weight: 0.2,
        axis: TraitAxis::Openness,
        left: "会辩解，证明自己是对的",
        right: "沉默不语，拒绝沟通",
    },
    Question {
        id: 15,
        text: "处理过去的回忆",
        weight: 0.15,
        axis: TraitAxis::Openness,
        left: "会赋予它某种意义",
        right: "尽量不去想，封存起来",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_has_five_questions_per_axis() {
        for axis in [TraitAxis::Investment, TraitAxis::Rationality, TraitAxis::Openness] {
            assert_eq!(QUESTIONS.iter().filter(|q| q.axis == axis).count(), 5);
        }
    }

    #[test]
    fn test_ids_are_sequential_and_weights_positive() {
        for (i, q) in QUESTIONS.iter().enumerate() {
            assert_eq!(q.id as usize, i + 1);
            assert!(q.weight > 0.0);
        }
    }
}
