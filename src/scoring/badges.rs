use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub required_score: u64,
}

pub const BADGES: [Badge; 4] = [
    Badge {
        id: "explorer",
        name: "Explorer",
        description: "Complete lessons in 5 different categories",
        icon: "🌟",
        required_score: 250,
    },
    Badge {
        id: "scientist",
        name: "Scientist",
        description: "Complete 3 lab experiments",
        icon: "🔬",
        required_score: 300,
    },
    Badge {
        id: "artist",
        name: "Creative Artist",
        description: "Complete 5 art projects",
        icon: "🎨",
        required_score: 250,
    },
    Badge {
        id: "engineer",
        name: "Master Engineer",
        description: "Build 3 electronic projects",
        icon: "⚡",
        required_score: 350,
    },
];

/// Badges a point total qualifies for, in table order.
pub fn eligible_badges(total: u64) -> impl Iterator<Item = Badge> {
    BADGES
        .into_iter()
        .filter(move |badge| total >= badge.required_score)
}
