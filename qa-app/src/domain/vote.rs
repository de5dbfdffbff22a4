use qa_errors::AppError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Contribution of one vote to an answer's score.
    pub fn weight(&self) -> i32 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

impl FromStr for VoteDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(AppError::InvalidInput(format!(
                "Unknown vote direction: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub answer_id: uuid::Uuid,
    pub direction: VoteDirection,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Vote {
    pub fn new(user_id: uuid::Uuid, answer_id: uuid::Uuid, direction: VoteDirection) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            user_id,
            answer_id,
            direction,
            created_at: None,
        }
    }
}

/// What a vote action did to the caller's vote on an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteAction {
    Cast,
    Retracted,
    Switched,
}

/// Result of a vote operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResult {
    pub action: VoteAction,
    pub user_vote: Option<VoteDirection>,
    pub vote_score: i32,
}

pub fn score_of<I>(directions: I) -> i32
where
    I: IntoIterator<Item = VoteDirection>,
{
    directions.into_iter().map(|d| d.weight()).sum()
}
