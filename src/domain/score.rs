//! Completeness scoring and tiering.
//!
//! A [`ScoreSnapshot`] is a pure function of per-category row counts and the
//! compiled-in [`ScoringTable`]: no clock, no randomness, no hidden state.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::domain::category::Category;

/// How many shortfalls are flagged as urgent.
pub const URGENT_SHORTFALLS: usize = 3;
/// How many shortfalls are surfaced in total (urgent + important).
pub const SURFACED_SHORTFALLS: usize = 5;

/// Per-category row counts. Missing categories count as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts(BTreeMap<Category, usize>);

impl CategoryCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> usize {
        self.0.get(&category).copied().unwrap_or(0)
    }

    pub fn set(&mut self, category: Category, count: usize) {
        self.0.insert(category, count);
    }

    pub fn with(mut self, category: Category, count: usize) -> Self {
        self.set(category, count);
        self
    }

    /// Sum of rows across every category.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

impl FromIterator<(Category, usize)> for CategoryCounts {
    fn from_iter<T: IntoIterator<Item = (Category, usize)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Discrete completeness rank.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Unrated,
    Bronze,
    Silver,
    Gold,
}

impl Tier {
    /// Ranked tiers with their inclusive lower bound, highest first.
    const THRESHOLDS: [(Tier, f64); 3] = [
        (Tier::Gold, 85.0),
        (Tier::Silver, 75.0),
        (Tier::Bronze, 60.0),
    ];

    /// First threshold met, evaluated from Gold down.
    pub fn from_score(score: f64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(_, threshold)| score >= *threshold)
            .map(|(tier, _)| *tier)
            .unwrap_or(Tier::Unrated)
    }

    /// Minimum total score of the tier (0 for Unrated).
    pub fn threshold(self) -> f64 {
        Self::THRESHOLDS
            .iter()
            .find(|(tier, _)| *tier == self)
            .map(|(_, threshold)| *threshold)
            .unwrap_or(0.0)
    }

    /// The tier directly above, if any.
    pub const fn next(self) -> Option<Tier> {
        match self {
            Self::Unrated => Some(Self::Bronze),
            Self::Bronze => Some(Self::Silver),
            Self::Silver => Some(Self::Gold),
            Self::Gold => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unrated => "Unrated",
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
        }
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Urgency label of a surfaced shortfall.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Urgent,
    Important,
}

/// Goal count and score share of a category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoringRule {
    pub target: usize,
    pub weight: f64,
}

/// Target/weight configuration for every category.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoringTable {
    rules: Vec<(Category, ScoringRule)>,
}

impl Default for ScoringTable {
    fn default() -> Self {
        let rule = |target, weight| ScoringRule { target, weight };
        Self {
            rules: vec![
                (Category::Qna, rule(60, 0.23)),
                (Category::WorkoutGuideline, rule(30, 0.18)),
                (Category::DietGuideline, rule(20, 0.13)),
                (Category::Philosophy, rule(15, 0.09)),
                (Category::Injury, rule(12, 0.09)),
                (Category::Feedback, rule(10, 0.04)),
                (Category::MealExample, rule(15, 0.04)),
                (Category::WorkoutExample, rule(20, 0.10)),
                (Category::Tone, rule(8, 0.10)),
            ],
        }
    }
}

/// Scored view of one category.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: Category,
    pub count: usize,
    pub target: usize,
    pub weight: f64,
    /// Percentage of the target reached, clamped to 100.
    pub achievement: f64,
    /// `achievement * weight`.
    pub score: f64,
    pub shortfall: usize,
}

/// A category still below its target.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Shortfall {
    pub category: Category,
    pub needed: usize,
    /// `needed / target * weight`.
    pub priority: f64,
    /// Set for the first [`SURFACED_SHORTFALLS`] entries only.
    pub urgency: Option<Urgency>,
}

/// Derived completeness state for one set of counts.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoreSnapshot {
    pub total_score: f64,
    pub tier: Tier,
    pub details: Vec<CategoryScore>,
    /// Every undersupplied category, highest priority first.
    pub shortfalls: Vec<Shortfall>,
    pub total_count: usize,
    pub total_target: usize,
}

impl ScoreSnapshot {
    /// Shortfalls shown on the dashboard (urgent first, then important).
    pub fn surfaced(&self) -> &[Shortfall] {
        let end = self.shortfalls.len().min(SURFACED_SHORTFALLS);
        &self.shortfalls[..end]
    }

    /// Next tier to reach and its threshold; `None` once Gold.
    pub fn next_goal(&self) -> Option<(Tier, f64)> {
        self.tier.next().map(|tier| (tier, tier.threshold()))
    }

    pub fn detail(&self, category: Category) -> Option<&CategoryScore> {
        self.details.iter().find(|d| d.category == category)
    }
}

impl ScoringTable {
    pub fn new(rules: Vec<(Category, ScoringRule)>) -> Self {
        Self { rules }
    }

    pub fn rule(&self, category: Category) -> Option<ScoringRule> {
        self.rules
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, rule)| *rule)
    }

    /// Scores `counts` against the table.
    pub fn score(&self, counts: &CategoryCounts) -> ScoreSnapshot {
        let details: Vec<CategoryScore> = self
            .rules
            .iter()
            .map(|(category, rule)| {
                let count = counts.get(*category);
                let achievement = achievement(count, rule.target);
                CategoryScore {
                    category: *category,
                    count,
                    target: rule.target,
                    weight: rule.weight,
                    achievement,
                    score: achievement * rule.weight,
                    shortfall: rule.target.saturating_sub(count),
                }
            })
            .collect();

        let total_score = details
            .iter()
            .map(|d| d.score)
            .sum::<f64>()
            .clamp(0.0, 100.0);

        let mut shortfalls: Vec<Shortfall> = details
            .iter()
            .filter(|d| d.count < d.target)
            .map(|d| Shortfall {
                category: d.category,
                needed: d.shortfall,
                priority: d.shortfall as f64 / d.target as f64 * d.weight,
                urgency: None,
            })
            .collect();
        // Stable: equal priorities keep declaration order.
        shortfalls.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        for (rank, shortfall) in shortfalls.iter_mut().enumerate() {
            shortfall.urgency = match rank {
                r if r < URGENT_SHORTFALLS => Some(Urgency::Urgent),
                r if r < SURFACED_SHORTFALLS => Some(Urgency::Important),
                _ => None,
            };
        }

        ScoreSnapshot {
            total_score,
            tier: Tier::from_score(total_score),
            total_count: details.iter().map(|d| d.count).sum(),
            total_target: details.iter().map(|d| d.target).sum(),
            details,
            shortfalls,
        }
    }
}

fn achievement(count: usize, target: usize) -> f64 {
    if target == 0 {
        return 100.0;
    }
    (count as f64 / target as f64 * 100.0).min(100.0)
}

/// Scores `counts` against the default targets and weights.
pub fn calculate_score(counts: &CategoryCounts) -> ScoreSnapshot {
    ScoringTable::default().score(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn full_counts() -> CategoryCounts {
        let table = ScoringTable::default();
        Category::ALL
            .into_iter()
            .map(|c| (c, table.rule(c).unwrap().target))
            .collect()
    }

    #[test]
    fn default_weights_sum_to_one() {
        let table = ScoringTable::default();
        let sum: f64 = Category::ALL
            .into_iter()
            .map(|c| table.rule(c).unwrap().weight)
            .sum();
        assert!((sum - 1.0).abs() < EPSILON);
    }

    #[test]
    fn all_targets_met_scores_hundred_and_gold() {
        let snapshot = calculate_score(&full_counts());
        assert!((snapshot.total_score - 100.0).abs() < EPSILON);
        assert_eq!(snapshot.tier, Tier::Gold);
        assert!(snapshot.shortfalls.is_empty());
        assert_eq!(snapshot.next_goal(), None);
    }

    #[test]
    fn excess_rows_are_capped_per_category() {
        let counts = full_counts().with(Category::Qna, 600);
        let snapshot = calculate_score(&counts);
        assert!(snapshot.total_score <= 100.0);
        assert_eq!(snapshot.detail(Category::Qna).unwrap().achievement, 100.0);
    }

    #[test]
    fn empty_knowledge_base_is_unrated() {
        let snapshot = calculate_score(&CategoryCounts::new());
        assert_eq!(snapshot.total_score, 0.0);
        assert_eq!(snapshot.tier, Tier::Unrated);
        assert_eq!(snapshot.shortfalls.len(), Category::ALL.len());
        assert_eq!(snapshot.total_target, 190);
        assert_eq!(snapshot.next_goal(), Some((Tier::Bronze, 60.0)));
    }

    #[test]
    fn documented_full_example_is_gold() {
        let counts = CategoryCounts::new()
            .with(Category::Qna, 60)
            .with(Category::WorkoutGuideline, 30)
            .with(Category::DietGuideline, 20)
            .with(Category::Philosophy, 15)
            .with(Category::Injury, 12)
            .with(Category::Feedback, 10)
            .with(Category::MealExample, 15)
            .with(Category::WorkoutExample, 20)
            .with(Category::Tone, 8);
        let snapshot = calculate_score(&counts);
        assert!((snapshot.total_score - 100.0).abs() < EPSILON);
        assert_eq!(snapshot.tier, Tier::Gold);
        assert_eq!(snapshot.total_count, 190);
    }

    #[test]
    fn half_of_qna_contributes_eleven_and_a_half() {
        let snapshot = calculate_score(&CategoryCounts::new().with(Category::Qna, 30));
        let qna = snapshot.detail(Category::Qna).unwrap();
        assert!((qna.achievement - 50.0).abs() < EPSILON);
        assert!((qna.score - 11.5).abs() < EPSILON);
        assert!((snapshot.total_score - 11.5).abs() < EPSILON);
        assert_eq!(snapshot.tier, Tier::Unrated);
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        assert_eq!(Tier::from_score(59.999), Tier::Unrated);
        assert_eq!(Tier::from_score(60.0), Tier::Bronze);
        assert_eq!(Tier::from_score(74.999), Tier::Bronze);
        assert_eq!(Tier::from_score(75.0), Tier::Silver);
        assert_eq!(Tier::from_score(84.999), Tier::Silver);
        assert_eq!(Tier::from_score(85.0), Tier::Gold);
        assert_eq!(Tier::from_score(100.0), Tier::Gold);
    }

    #[test]
    fn total_score_stays_within_bounds() {
        for scale in [0, 1, 3, 7, 15, 40, 1000] {
            for skew in 0..Category::ALL.len() {
                let counts: CategoryCounts = Category::ALL
                    .into_iter()
                    .enumerate()
                    .map(|(i, c)| (c, scale * ((i + skew) % 4)))
                    .collect();
                let snapshot = calculate_score(&counts);
                assert!(
                    (0.0..=100.0).contains(&snapshot.total_score),
                    "{}",
                    snapshot.total_score
                );
            }
        }
    }

    #[test]
    fn shortfalls_exclude_complete_categories_and_sort_descending() {
        let counts = full_counts()
            .with(Category::Qna, 30)
            .with(Category::Feedback, 0)
            .with(Category::Tone, 2);
        let snapshot = calculate_score(&counts);

        let ranked: Vec<Category> = snapshot.shortfalls.iter().map(|s| s.category).collect();
        // QnA: 30/60*0.23 = 0.115, Tone: 6/8*0.10 = 0.075, Feedback: 10/10*0.04 = 0.04
        assert_eq!(
            ranked,
            vec![Category::Qna, Category::Tone, Category::Feedback]
        );
        assert!(
            snapshot
                .shortfalls
                .windows(2)
                .all(|w| w[0].priority >= w[1].priority)
        );
        assert_eq!(snapshot.shortfalls[0].needed, 30);
    }

    #[test]
    fn equal_priorities_keep_declaration_order() {
        // Injury and Philosophy share weight 0.09; empty both.
        let counts = full_counts()
            .with(Category::Injury, 0)
            .with(Category::Philosophy, 0);
        let snapshot = calculate_score(&counts);
        let ranked: Vec<Category> = snapshot.shortfalls.iter().map(|s| s.category).collect();
        assert_eq!(ranked, vec![Category::Philosophy, Category::Injury]);
    }

    #[test]
    fn labels_three_urgent_then_two_important() {
        let snapshot = calculate_score(&CategoryCounts::new());
        let labels: Vec<Option<Urgency>> =
            snapshot.shortfalls.iter().map(|s| s.urgency).collect();
        assert_eq!(
            &labels[..6],
            &[
                Some(Urgency::Urgent),
                Some(Urgency::Urgent),
                Some(Urgency::Urgent),
                Some(Urgency::Important),
                Some(Urgency::Important),
                None,
            ]
        );
        assert_eq!(snapshot.surfaced().len(), SURFACED_SHORTFALLS);
        assert_eq!(snapshot.surfaced()[0].category, Category::Qna);
    }

    #[test]
    fn zero_target_counts_as_achieved() {
        let table = ScoringTable::new(vec![
            (Category::Qna, ScoringRule { target: 0, weight: 0.5 }),
            (Category::Tone, ScoringRule { target: 4, weight: 0.5 }),
        ]);
        let snapshot = table.score(&CategoryCounts::new());
        assert_eq!(snapshot.detail(Category::Qna).unwrap().achievement, 100.0);
        assert!((snapshot.total_score - 50.0).abs() < EPSILON);
        assert_eq!(snapshot.shortfalls.len(), 1);
        assert_eq!(snapshot.shortfalls[0].category, Category::Tone);
    }

    #[test]
    fn scoring_is_deterministic() {
        let counts = CategoryCounts::new()
            .with(Category::Injury, 5)
            .with(Category::Tone, 3);
        assert_eq!(calculate_score(&counts), calculate_score(&counts));
    }
}
