use chrono::{Duration, NaiveDate};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{ContentType, CreatorProfile, PostStat};

const POST_TYPES: [ContentType; 3] = [ContentType::Story, ContentType::Reel, ContentType::Post];
const NICHES: [&str; 6] = ["beaute", "travel", "tech", "food", "fitness", "lifestyle"];
const GENDERS: [&str; 2] = ["F", "M"];

/// Seeded post history ending at `end_date`, newest first. Roughly three posts
/// in four are of `content_type`; the rest are spread over the other formats.
pub fn generate_synthetic_history(
    seed: u64,
    count: usize,
    followers: u64,
    content_type: ContentType,
    end_date: NaiveDate,
) -> Vec<PostStat> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut history = Vec::with_capacity(count);
    let mut date = end_date;

    for _ in 0..count {
        let post_type = if rng.gen::<f64>() < 0.75 {
            content_type
        } else {
            POST_TYPES[rng.gen_range(0..POST_TYPES.len())]
        };
        history.push(sample_post(&mut rng, followers, post_type, date));
        date -= Duration::days(rng.gen_range(2..=5));
    }

    history
}

/// Seeded creator pool with mixed niches, genders and audience sizes.
pub fn generate_synthetic_pool(seed: u64, size: usize, end_date: NaiveDate) -> Vec<CreatorProfile> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size)
        .map(|idx| {
            let followers = 10f64.powf(rng.gen_range(3.0..6.5)).round() as u64;
            let content_type = POST_TYPES[rng.gen_range(0..POST_TYPES.len())];
            let posts = rng.gen_range(2..=14);
            CreatorProfile {
                id: Some(format!("synthetic_{}", idx)),
                name: format!("creator_{}", idx),
                gender: GENDERS[idx % GENDERS.len()].to_string(),
                niche_category: NICHES[rng.gen_range(0..NICHES.len())].to_string(),
                followers,
                posts: generate_synthetic_history(rng.gen(), posts, followers, content_type, end_date),
            }
        })
        .collect()
}

fn sample_post(rng: &mut StdRng, followers: u64, content_type: ContentType, date: NaiveDate) -> PostStat {
    let audience = followers.max(100) as f64;
    let reach = audience * rng.gen_range(0.12..0.40);
    let views = reach * rng.gen_range(1.05..1.6);
    let likes = reach * rng.gen_range(0.015..0.07);
    let comments = likes * rng.gen_range(0.02..0.12);
    let saves = likes * rng.gen_range(0.05..0.25);
    let new_followers = views * rng.gen_range(0.001..0.012);
    let profile_visits = reach * rng.gen_range(0.01..0.05);

    PostStat {
        reach: reach.round() as u64,
        likes: likes.round() as u64,
        comments: comments.round() as u64,
        saves: saves.round() as u64,
        views: views.round() as u64,
        new_followers: new_followers.round() as u64,
        profile_visits: profile_visits.round() as u64,
        interacting_accounts: ((likes + comments) * 0.85).round() as u64,
        content_type,
        date,
    }
}
