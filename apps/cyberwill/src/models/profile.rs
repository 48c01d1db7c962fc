use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How far the relationship has progressed. Declaration order is the progression order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RelationshipStage {
    Stranger,
    Acquaintance,
    Friend,
    #[serde(rename = "Close Friend")]
    CloseFriend,
    Situationship,
    Girlfriend,
}

impl RelationshipStage {
    pub const ALL: [RelationshipStage; 6] = [
        RelationshipStage::Stranger,
        RelationshipStage::Acquaintance,
        RelationshipStage::Friend,
        RelationshipStage::CloseFriend,
        RelationshipStage::Situationship,
        RelationshipStage::Girlfriend,
    ];

    /// Wire name, as sent to the analysis endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipStage::Stranger => "Stranger",
            RelationshipStage::Acquaintance => "Acquaintance",
            RelationshipStage::Friend => "Friend",
            RelationshipStage::CloseFriend => "Close Friend",
            RelationshipStage::Situationship => "Situationship",
            RelationshipStage::Girlfriend => "Girlfriend",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RelationshipStage::Stranger => "陌生人",
            RelationshipStage::Acquaintance => "点头之交",
            RelationshipStage::Friend => "普通朋友",
            RelationshipStage::CloseFriend => "好朋友",
            RelationshipStage::Situationship => "暧昧中",
            RelationshipStage::Girlfriend => "女朋友",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RelationshipStage::Stranger => "刚认识或还没见过面",
            RelationshipStage::Acquaintance => "偶尔聊几句",
            RelationshipStage::Friend => "纯友谊",
            RelationshipStage::CloseFriend => "关系很好",
            RelationshipStage::Situationship => "友达以上，恋人未满",
            RelationshipStage::Girlfriend => "正式交往",
        }
    }

    /// 1-based menu position.
    pub fn from_position(position: usize) -> Option<Self> {
        position
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestmentStyle {
    #[serde(rename = "投资")]
    Investment,
    #[serde(rename = "测试")]
    Test,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThinkingStyle {
    #[serde(rename = "理性")]
    Rational,
    #[serde(rename = "感性")]
    Emotional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictStyle {
    #[serde(rename = "合理解释")]
    Open,
    #[serde(rename = "回避")]
    Avoidant,
}

impl InvestmentStyle {
    pub fn label(&self) -> &'static str {
        match self {
            InvestmentStyle::Investment => "投资",
            InvestmentStyle::Test => "测试",
        }
    }
}

impl ThinkingStyle {
    pub fn label(&self) -> &'static str {
        match self {
            ThinkingStyle::Rational => "理性",
            ThinkingStyle::Emotional => "感性",
        }
    }
}

impl ConflictStyle {
    pub fn label(&self) -> &'static str {
        match self {
            ConflictStyle::Open => "合理解释",
            ConflictStyle::Avoidant => "回避",
        }
    }
}

/// Three-axis personality classification produced by the questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traits {
    pub investment: InvestmentStyle,
    pub rationality: ThinkingStyle,
    /// Older saved profiles call this axis `conflict`.
    #[serde(alias = "conflict")]
    pub openness: ConflictStyle,
}

impl Traits {
    pub fn summary(&self) -> String {
        format!(
            "{} / {} / {}",
            self.investment.label(),
            self.rationality.label(),
            self.openness.label()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GirlProfile {
    pub id: Uuid,
    /// Can be a nickname.
    pub name: String,
    pub stage: RelationshipStage,
    /// Analysis text returned by the backend, or the offline fallback.
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<Traits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Everything the caller supplies when creating a profile; id and timestamp are assigned.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub name: String,
    pub stage: RelationshipStage,
    pub description: String,
    pub traits: Option<Traits>,
    pub archetype: Option<String>,
}

impl GirlProfile {
    pub fn create(new: NewProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: new.name,
            stage: new.stage,
            description: new.description,
            traits: new.traits,
            archetype: new.archetype,
            created_at: Utc::now(),
        }
    }

    /// Context block sent with every chat message so the coach knows who is being discussed.
    pub fn chat_context(&self) -> String {
        let mut lines = vec![
            format!("当前咨询对象：{}", self.name),
            format!(
                "关系阶段：{}（{}）",
                self.stage.label(),
                self.stage.description()
            ),
        ];
        if let Some(traits) = &self.traits {
            lines.push(format!("性格特征：{}", traits.summary()));
        }
        if let Some(archetype) = &self.archetype {
            lines.push(format!("类型：{archetype}"));
        }
        if !self.description.is_empty() {
            lines.push(format!("描述：{}", self.description));
        }
        lines.join("\n")
    }
}
