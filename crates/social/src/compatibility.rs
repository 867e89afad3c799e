//! Game-library compatibility scoring.
//!
//! Pure domain logic over two users' owned-game collections. No database
//! access and no clock; callers load the collections and hand them in.

use std::collections::{HashMap, HashSet};

use gamelink_database::{GameRecord, Platform};
use serde::Serialize;

/// Maximum contribution of the platform-overlap boost.
pub const PLATFORM_BOOST_MAX: f64 = 10.0;
/// Maximum contribution of the genre-overlap boost.
pub const GENRE_BOOST_MAX: f64 = 15.0;
/// How many unique-to-one-side games are sampled into the report.
pub const UNIQUE_SAMPLE_LIMIT: usize = 10;
/// How many genres the breakdown keeps, by combined frequency.
pub const GENRE_BREAKDOWN_LIMIT: usize = 10;
/// How many recommendations the report carries.
pub const RECOMMENDATION_LIMIT: usize = 5;

/// Rating threshold for a game to qualify as a recommendation.
const RECOMMENDATION_MIN_RATING: i64 = 7;
/// Sort bonus a favorite earns when ranking recommendations.
const FAVORITE_SORT_BONUS: i64 = 2;

/// Qualitative label for a compatibility score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchRating {
    #[serde(rename = "Excellent Match")]
    Excellent,
    #[serde(rename = "Great Match")]
    Great,
    #[serde(rename = "Good Match")]
    Good,
    #[serde(rename = "Fair Match")]
    Fair,
    #[serde(rename = "Limited Match")]
    Limited,
    #[serde(rename = "No Match")]
    NoMatch,
    #[serde(rename = "No Data")]
    NoData,
}

impl MatchRating {
    /// Label a final score. Thresholds are fixed product copy.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            MatchRating::Excellent
        } else if score >= 60.0 {
            MatchRating::Great
        } else if score >= 40.0 {
            MatchRating::Good
        } else if score >= 20.0 {
            MatchRating::Fair
        } else if score > 0.0 {
            MatchRating::Limited
        } else {
            MatchRating::NoMatch
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchRating::Excellent => "Excellent Match",
            MatchRating::Great => "Great Match",
            MatchRating::Good => "Good Match",
            MatchRating::Fair => "Fair Match",
            MatchRating::Limited => "Limited Match",
            MatchRating::NoMatch => "No Match",
            MatchRating::NoData => "No Data",
        }
    }
}

/// Display projection of a game for report lists
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub name: String,
    pub platform: &'static str,
    pub external_id: Option<i64>,
}

impl From<&GameRecord> for GameSummary {
    fn from(game: &GameRecord) -> Self {
        Self {
            name: game.name.clone(),
            platform: game.platform.display_name(),
            external_id: game.external_id,
        }
    }
}

/// One platform's share of each library
#[derive(Debug, Clone, Serialize)]
pub struct PlatformOverlap {
    pub platform: &'static str,
    pub count_first: usize,
    pub count_second: usize,
}

/// One genre's share of each library, by occurrence
#[derive(Debug, Clone, Serialize)]
pub struct GenreOverlap {
    pub genre: String,
    pub count_first: usize,
    pub count_second: usize,
    pub combined: usize,
}

/// A suggested title from the other user's library
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub name: String,
    pub platform: &'static str,
    pub external_id: Option<i64>,
    pub rating: Option<i64>,
    pub favorite: bool,
}

/// Structured result of comparing two owned-game collections
#[derive(Debug, Clone, Serialize)]
pub struct CompatibilityReport {
    /// Final score in [0, 100], rounded to one decimal place
    pub score: f64,
    pub rating: MatchRating,
    pub shared_games: Vec<GameSummary>,
    pub unique_to_first: Vec<GameSummary>,
    pub unique_to_second: Vec<GameSummary>,
    pub total_first: usize,
    pub total_second: usize,
    pub platform_breakdown: Vec<PlatformOverlap>,
    pub genre_breakdown: Vec<GenreOverlap>,
    pub recommendations: Vec<Recommendation>,
}

impl CompatibilityReport {
    /// The fixed result when either collection is empty
    fn no_data(total_first: usize, total_second: usize) -> Self {
        Self {
            score: 0.0,
            rating: MatchRating::NoData,
            shared_games: Vec::new(),
            unique_to_first: Vec::new(),
            unique_to_second: Vec::new(),
            total_first,
            total_second,
            platform_breakdown: Vec::new(),
            genre_breakdown: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

/// Index of one side's games used to answer "does the other side hold this?"
struct MatchIndex {
    external_ids: HashSet<i64>,
    /// Lowercased names of games without a catalog link. Name matching only
    /// applies when neither side of the comparison is linked.
    unlinked_names: HashSet<String>,
}

impl MatchIndex {
    fn build(games: &[GameRecord]) -> Self {
        let mut external_ids = HashSet::new();
        let mut unlinked_names = HashSet::new();

        for game in games {
            match game.external_id {
                Some(id) => {
                    external_ids.insert(id);
                }
                None => {
                    unlinked_names.insert(game.name.to_lowercase());
                }
            }
        }

        Self {
            external_ids,
            unlinked_names,
        }
    }

    /// Catalog-id match takes priority; the name fallback is evaluated
    /// independently per game.
    fn holds(&self, game: &GameRecord) -> bool {
        match game.external_id {
            Some(id) => self.external_ids.contains(&id),
            None => self.unlinked_names.contains(&game.name.to_lowercase()),
        }
    }
}

/// Compare two users' owned-game collections and produce a symmetric
/// similarity report.
///
/// The score is a Dice-style overlap over the two collections plus capped
/// platform and genre boosts; base and boost components are symmetric under
/// argument swap. Recommendations intentionally are not: they are drawn from
/// the second collection for the first user.
pub fn score_compatibility(first: &[GameRecord], second: &[GameRecord]) -> CompatibilityReport {
    if first.is_empty() || second.is_empty() {
        return CompatibilityReport::no_data(first.len(), second.len());
    }

    let index_first = MatchIndex::build(first);
    let index_second = MatchIndex::build(second);

    let shared: Vec<&GameRecord> = first.iter().filter(|g| index_second.holds(g)).collect();
    let unique_first: Vec<&GameRecord> = first.iter().filter(|g| !index_second.holds(g)).collect();
    let unique_second: Vec<&GameRecord> = second.iter().filter(|g| !index_first.holds(g)).collect();

    let base_score = (2.0 * shared.len() as f64) / ((first.len() + second.len()) as f64) * 100.0;

    let platforms_first: HashSet<Platform> = first.iter().map(|g| g.platform).collect();
    let platforms_second: HashSet<Platform> = second.iter().map(|g| g.platform).collect();
    let platform_boost = jaccard(&platforms_first, &platforms_second) * PLATFORM_BOOST_MAX;

    let genres_first: HashSet<String> = first
        .iter()
        .flat_map(|g| g.genres.iter().cloned())
        .collect();
    let genres_second: HashSet<String> = second
        .iter()
        .flat_map(|g| g.genres.iter().cloned())
        .collect();
    let genre_boost = jaccard(&genres_first, &genres_second) * GENRE_BOOST_MAX;

    let score = round_one_decimal((base_score + platform_boost + genre_boost).min(100.0));

    CompatibilityReport {
        score,
        rating: MatchRating::from_score(score),
        shared_games: shared.iter().map(|g| GameSummary::from(*g)).collect(),
        unique_to_first: unique_first
            .iter()
            .take(UNIQUE_SAMPLE_LIMIT)
            .map(|g| GameSummary::from(*g))
            .collect(),
        unique_to_second: unique_second
            .iter()
            .take(UNIQUE_SAMPLE_LIMIT)
            .map(|g| GameSummary::from(*g))
            .collect(),
        total_first: first.len(),
        total_second: second.len(),
        platform_breakdown: platform_breakdown(first, second),
        genre_breakdown: genre_breakdown(first, second),
        recommendations: recommend(&unique_second),
    }
}

/// Intersection over union of two sets; 0 when both are empty
fn jaccard<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn platform_breakdown(first: &[GameRecord], second: &[GameRecord]) -> Vec<PlatformOverlap> {
    let mut counts: HashMap<Platform, (usize, usize)> = HashMap::new();

    for game in first {
        counts.entry(game.platform).or_default().0 += 1;
    }
    for game in second {
        counts.entry(game.platform).or_default().1 += 1;
    }

    let mut breakdown: Vec<PlatformOverlap> = counts
        .into_iter()
        .map(|(platform, (count_first, count_second))| PlatformOverlap {
            platform: platform.display_name(),
            count_first,
            count_second,
        })
        .collect();

    breakdown.sort_by(|a, b| {
        (b.count_first + b.count_second)
            .cmp(&(a.count_first + a.count_second))
            .then_with(|| a.platform.cmp(&b.platform))
    });
    breakdown
}

fn genre_breakdown(first: &[GameRecord], second: &[GameRecord]) -> Vec<GenreOverlap> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

    // Occurrences count with repeats: a genre tagged on five games weighs
    // five, even if the tag repeats within one game's list.
    for game in first {
        for genre in &game.genres {
            counts.entry(genre.as_str()).or_default().0 += 1;
        }
    }
    for game in second {
        for genre in &game.genres {
            counts.entry(genre.as_str()).or_default().1 += 1;
        }
    }

    let mut breakdown: Vec<GenreOverlap> = counts
        .into_iter()
        .map(|(genre, (count_first, count_second))| GenreOverlap {
            genre: genre.to_string(),
            count_first,
            count_second,
            combined: count_first + count_second,
        })
        .collect();

    breakdown.sort_by(|a, b| b.combined.cmp(&a.combined).then_with(|| a.genre.cmp(&b.genre)));
    breakdown.truncate(GENRE_BREAKDOWN_LIMIT);
    breakdown
}

/// Pick well-regarded games the first user is missing: rated highly or
/// flagged a favorite by the second user, best first.
fn recommend(unique_second: &[&GameRecord]) -> Vec<Recommendation> {
    let sort_key = |game: &GameRecord| {
        game.rating.unwrap_or(0) + if game.favorite { FAVORITE_SORT_BONUS } else { 0 }
    };

    let mut candidates: Vec<&GameRecord> = unique_second
        .iter()
        .copied()
        .filter(|g| g.rating.unwrap_or(0) >= RECOMMENDATION_MIN_RATING || g.favorite)
        .collect();

    candidates.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)).then_with(|| a.name.cmp(&b.name)));

    candidates
        .into_iter()
        .take(RECOMMENDATION_LIMIT)
        .map(|game| Recommendation {
            name: game.name.clone(),
            platform: game.platform.display_name(),
            external_id: game.external_id,
            rating: game.rating,
            favorite: game.favorite,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamelink_database::CreateGameRequest;

    fn game(owner_id: i64, external_id: Option<i64>, name: &str, platform: &str, genres: &[&str]) -> GameRecord {
        let request = CreateGameRequest {
            external_id,
            name: name.to_string(),
            platform: platform.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            ownership: None,
            rating: None,
            favorite: false,
        };
        GameRecord::new(owner_id, &request)
    }

    fn rated(mut g: GameRecord, rating: i64, favorite: bool) -> GameRecord {
        g.rating = Some(rating);
        g.favorite = favorite;
        g
    }

    // -- Short-circuit -------------------------------------------------------

    #[test]
    fn empty_side_returns_no_data() {
        let a = vec![game(1, Some(1), "Halo", "xbox", &["Shooter"])];

        let report = score_compatibility(&a, &[]);
        assert_eq!(report.score, 0.0);
        assert_eq!(report.rating, MatchRating::NoData);
        assert!(report.shared_games.is_empty());
        assert!(report.recommendations.is_empty());
        assert_eq!(report.total_first, 1);
        assert_eq!(report.total_second, 0);

        let report = score_compatibility(&[], &a);
        assert_eq!(report.rating, MatchRating::NoData);

        let report = score_compatibility(&[], &[]);
        assert_eq!(report.rating, MatchRating::NoData);
    }

    // -- Matching ------------------------------------------------------------

    #[test]
    fn identical_single_game_scores_hundred() {
        // Spec example: both own {id:1, "Halo", Shooter} on the same platform
        let a = vec![game(1, Some(1), "Halo", "xbox", &["Shooter"])];
        let b = vec![game(2, Some(1), "Halo", "xbox", &["Shooter"])];

        let report = score_compatibility(&a, &b);
        assert_eq!(report.score, 100.0);
        assert_eq!(report.rating, MatchRating::Excellent);
        assert_eq!(report.shared_games.len(), 1);
        assert!(report.unique_to_first.is_empty());
        assert!(report.unique_to_second.is_empty());
    }

    #[test]
    fn id_match_ignores_name_differences() {
        let a = vec![game(1, Some(7), "The Witcher 3", "pc", &[])];
        let b = vec![game(2, Some(7), "Witcher III GOTY", "pc", &[])];

        let report = score_compatibility(&a, &b);
        assert_eq!(report.shared_games.len(), 1);
    }

    #[test]
    fn name_fallback_applies_only_without_ids() {
        // Both unlinked: lowercased names match
        let a = vec![game(1, None, "Stardew Valley", "pc", &[])];
        let b = vec![game(2, None, "stardew valley", "pc", &[])];
        assert_eq!(score_compatibility(&a, &b).shared_games.len(), 1);

        // One side linked: no match by name alone
        let a = vec![game(1, Some(9), "Stardew Valley", "pc", &[])];
        let b = vec![game(2, None, "Stardew Valley", "pc", &[])];
        assert!(score_compatibility(&a, &b).shared_games.is_empty());
    }

    #[test]
    fn different_ids_do_not_match() {
        let a = vec![game(1, Some(1), "Halo", "xbox", &[])];
        let b = vec![game(2, Some(2), "Gears", "xbox", &[])];
        assert!(score_compatibility(&a, &b).shared_games.is_empty());
    }

    // -- Scoring -------------------------------------------------------------

    #[test]
    fn disjoint_libraries_score_boosts_only() {
        // No shared ids or names; same platform, same genre
        let a = vec![game(1, Some(1), "Halo", "xbox", &["Shooter"])];
        let b = vec![game(2, Some(2), "Gears", "xbox", &["Shooter"])];

        let report = score_compatibility(&a, &b);
        // base 0, platform Jaccard 1.0 * 10, genre Jaccard 1.0 * 15
        assert_eq!(report.score, 25.0);
        assert_eq!(report.rating, MatchRating::Fair);
    }

    #[test]
    fn disjoint_libraries_no_overlap_at_all_scores_zero() {
        let a = vec![game(1, Some(1), "Halo", "xbox", &["Shooter"])];
        let b = vec![game(2, Some(2), "Zelda", "switch", &["Adventure"])];

        let report = score_compatibility(&a, &b);
        assert_eq!(report.score, 0.0);
        assert_eq!(report.rating, MatchRating::NoMatch);
    }

    #[test]
    fn identical_collections_clamp_to_hundred() {
        let a = vec![
            game(1, Some(1), "Halo", "xbox", &["Shooter"]),
            game(1, Some(2), "Gears", "xbox", &["Shooter"]),
        ];
        let b = vec![
            game(2, Some(1), "Halo", "xbox", &["Shooter"]),
            game(2, Some(2), "Gears", "xbox", &["Shooter"]),
        ];

        // base 100 + boosts 25 clamps at 100
        let report = score_compatibility(&a, &b);
        assert_eq!(report.score, 100.0);
        assert_eq!(report.rating, MatchRating::Excellent);
    }

    #[test]
    fn base_score_uses_total_counts_as_denominator() {
        // One shared game out of 1 + 3 records
        let a = vec![game(1, Some(1), "Halo", "xbox", &[])];
        let b = vec![
            game(2, Some(1), "Halo", "playstation", &[]),
            game(2, Some(2), "Gears", "playstation", &[]),
            game(2, Some(3), "Forza", "playstation", &[]),
        ];

        let report = score_compatibility(&a, &b);
        // base = 2*1/4*100 = 50, platform jaccard 0, genre 0
        assert_eq!(report.score, 50.0);
        assert_eq!(report.rating, MatchRating::Good);
    }

    #[test]
    fn score_components_are_symmetric() {
        let a = vec![
            game(1, Some(1), "Halo", "xbox", &["Shooter", "Sci-Fi"]),
            game(1, Some(2), "Stardew Valley", "pc", &["Farming"]),
            game(1, None, "Homebrew Puzzler", "pc", &["Puzzle"]),
        ];
        let b = vec![
            game(2, Some(1), "Halo", "xbox", &["Shooter"]),
            game(2, Some(5), "Factorio", "pc", &["Automation"]),
        ];

        let forward = score_compatibility(&a, &b);
        let backward = score_compatibility(&b, &a);

        assert_eq!(forward.score, backward.score);
        assert_eq!(forward.rating, backward.rating);
        assert_eq!(forward.shared_games.len(), backward.shared_games.len());
        assert_eq!(forward.total_first, backward.total_second);
        assert_eq!(forward.unique_to_first.len(), backward.unique_to_second.len());
    }

    #[test]
    fn score_rounds_to_one_decimal() {
        // 1 shared of 1+2 => base 66.666..., no boosts
        let a = vec![game(1, Some(1), "Halo", "xbox", &[])];
        let b = vec![
            game(2, Some(1), "Halo", "playstation", &[]),
            game(2, Some(2), "Gears", "playstation", &[]),
        ];

        let report = score_compatibility(&a, &b);
        assert_eq!(report.score, 66.7);
        assert_eq!(report.rating, MatchRating::Great);
    }

    // -- Rating labels -------------------------------------------------------

    #[test]
    fn rating_thresholds() {
        assert_eq!(MatchRating::from_score(100.0), MatchRating::Excellent);
        assert_eq!(MatchRating::from_score(80.0), MatchRating::Excellent);
        assert_eq!(MatchRating::from_score(79.9), MatchRating::Great);
        assert_eq!(MatchRating::from_score(60.0), MatchRating::Great);
        assert_eq!(MatchRating::from_score(40.0), MatchRating::Good);
        assert_eq!(MatchRating::from_score(20.0), MatchRating::Fair);
        assert_eq!(MatchRating::from_score(0.1), MatchRating::Limited);
        assert_eq!(MatchRating::from_score(0.0), MatchRating::NoMatch);

        assert_eq!(MatchRating::Excellent.label(), "Excellent Match");
        assert_eq!(MatchRating::NoData.label(), "No Data");
    }

    // -- Breakdowns ----------------------------------------------------------

    #[test]
    fn platform_breakdown_counts_both_sides() {
        let a = vec![
            game(1, Some(1), "Halo", "xbox", &[]),
            game(1, Some(2), "Stardew Valley", "pc", &[]),
        ];
        let b = vec![game(2, Some(3), "Factorio", "pc", &[])];

        let report = score_compatibility(&a, &b);
        let pc = report
            .platform_breakdown
            .iter()
            .find(|p| p.platform == "PC")
            .unwrap();
        assert_eq!(pc.count_first, 1);
        assert_eq!(pc.count_second, 1);

        let xbox = report
            .platform_breakdown
            .iter()
            .find(|p| p.platform == "Xbox")
            .unwrap();
        assert_eq!(xbox.count_first, 1);
        assert_eq!(xbox.count_second, 0);
    }

    #[test]
    fn genre_breakdown_keeps_top_ten_by_combined_frequency() {
        let mut a = Vec::new();
        for i in 0..12 {
            // Each game carries a distinct genre plus the common one
            a.push(game(
                1,
                Some(i),
                &format!("Game {i}"),
                "pc",
                &[&format!("Genre{i}"), "Common"],
            ));
        }
        let b = vec![game(2, Some(100), "Other", "pc", &["Common"])];

        let report = score_compatibility(&a, &b);
        assert_eq!(report.genre_breakdown.len(), GENRE_BREAKDOWN_LIMIT);
        assert_eq!(report.genre_breakdown[0].genre, "Common");
        assert_eq!(report.genre_breakdown[0].count_first, 12);
        assert_eq!(report.genre_breakdown[0].count_second, 1);
        assert_eq!(report.genre_breakdown[0].combined, 13);
    }

    #[test]
    fn unique_samples_are_capped() {
        let a: Vec<GameRecord> = (0..15)
            .map(|i| game(1, Some(i), &format!("A{i}"), "pc", &[]))
            .collect();
        let b: Vec<GameRecord> = (100..103)
            .map(|i| game(2, Some(i), &format!("B{i}"), "pc", &[]))
            .collect();

        let report = score_compatibility(&a, &b);
        assert_eq!(report.unique_to_first.len(), UNIQUE_SAMPLE_LIMIT);
        assert_eq!(report.unique_to_second.len(), 3);
        assert_eq!(report.total_first, 15);
    }

    // -- Recommendations -----------------------------------------------------

    #[test]
    fn recommendations_filter_and_rank() {
        let a = vec![game(1, Some(1), "Halo", "xbox", &[])];
        let b = vec![
            game(2, Some(1), "Halo", "xbox", &[]), // shared, never recommended
            rated(game(2, Some(2), "Hades", "pc", &[]), 9, false),
            rated(game(2, Some(3), "Celeste", "pc", &[]), 8, true), // 8 + 2 ranks first
            rated(game(2, Some(4), "Filler", "pc", &[]), 3, false), // filtered out
            rated(game(2, Some(5), "Old Favorite", "pc", &[]), 2, true), // favorite passes filter
        ];

        let report = score_compatibility(&a, &b);
        let names: Vec<&str> = report.recommendations.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Celeste", "Hades", "Old Favorite"]);
        assert_eq!(report.recommendations[0].platform, "PC");
    }

    #[test]
    fn recommendations_cap_at_five() {
        let a = vec![game(1, Some(1), "Halo", "xbox", &[])];
        let b: Vec<GameRecord> = (10..20)
            .map(|i| rated(game(2, Some(i), &format!("Gem {i}"), "pc", &[]), 9, false))
            .collect();

        let report = score_compatibility(&a, &b);
        assert_eq!(report.recommendations.len(), RECOMMENDATION_LIMIT);
    }

    #[test]
    fn unrated_games_default_to_zero() {
        let a = vec![game(1, Some(1), "Halo", "xbox", &[])];
        let b = vec![
            game(2, Some(2), "Unrated", "pc", &[]), // no rating, not favorite
        ];

        let report = score_compatibility(&a, &b);
        assert!(report.recommendations.is_empty());
    }
}
