use chrono::{Datelike, NaiveDate};
use collab_pricing::scoring::{seasonal_factor, OutlierFilter, PerformancePredictor};
use collab_pricing::{
    calculate_price, ContentType, Exclusivity, PostStat, PricingEngine, PricingInput,
    PricingRequest, UsageRights,
};

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn post(views: u64, content_type: ContentType, day: &str) -> PostStat {
    PostStat {
        reach: 2000,
        likes: 60,
        comments: 6,
        saves: 8,
        views,
        new_followers: 4,
        profile_visits: 40,
        interacting_accounts: 60,
        content_type,
        date: date(day),
    }
}

fn example_history() -> Vec<PostStat> {
    vec![PostStat {
        reach: 2000,
        likes: 50,
        comments: 10,
        saves: 5,
        views: 1000,
        new_followers: 2,
        profile_visits: 20,
        interacting_accounts: 0,
        content_type: ContentType::Post,
        date: date("2024-01-01"),
    }]
}

fn example_request() -> PricingRequest {
    let mut request = PricingRequest::new(ContentType::Post, date("2025-06-01"));
    request.niche_category = "beaute".to_string();
    request.destination = "europe_west".to_string();
    request.cpm_weight = 0.6;
    request.cpa_weight = 0.4;
    request
}

#[test]
fn single_post_example_prices_end_to_end() {
    let result = calculate_price(&example_history(), &example_request());

    // adjustment 0.87875 (June seasonal 0.90), damped by 0.8 for one sample
    assert_eq!(result.estimated_views, 703);
    assert!((result.applied_cpm - 10.63).abs() < 1e-9);
    assert!((result.base_price - 6.44).abs() < 1e-9);
    assert!((result.min_price - 5.47).abs() < 1e-9);
    assert!((result.max_price - 7.41).abs() < 1e-9);
    assert_eq!(result.confidence, 0.65);
}

#[test]
fn pricing_is_deterministic() {
    let history = example_history();
    let request = example_request();
    let first = calculate_price(&history, &request);
    for _ in 0..5 {
        assert_eq!(calculate_price(&history, &request), first);
    }
}

#[test]
fn band_brackets_the_base_price() {
    let history: Vec<PostStat> = (0..7)
        .map(|idx| post(800 + idx * 37, ContentType::Reel, &format!("2025-03-{:02}", idx + 1)))
        .collect();
    let mut request = PricingRequest::new(ContentType::Reel, date("2025-12-10"));
    request.usage_rights = UsageRights::Unlimited;
    request.exclusivity = Exclusivity::Industry;

    let result = calculate_price(&history, &request);
    assert!(result.min_price <= result.base_price);
    assert!(result.base_price <= result.max_price);
    assert_eq!(result.min_price, (result.base_price * 0.85 * 100.0).round() / 100.0);
    assert_eq!(result.max_price, (result.base_price * 1.15 * 100.0).round() / 100.0);
}

#[test]
fn confidence_never_drops_as_matching_posts_grow() {
    let request = PricingRequest::new(ContentType::Story, date("2025-10-01"));
    let allowed = [0.65, 0.75, 0.85, 0.95];
    let mut history = Vec::new();
    let mut previous = 0.0;

    for idx in 0..14 {
        history.push(post(1000, ContentType::Story, &format!("2025-09-{:02}", idx + 1)));
        history.push(post(1000, ContentType::Post, &format!("2025-08-{:02}", idx + 1)));
        let confidence = calculate_price(&history, &request).confidence;
        assert!(allowed.contains(&confidence));
        assert!(confidence >= previous);
        previous = confidence;
    }
    assert_eq!(previous, 0.95);
}

#[test]
fn outlier_filter_drops_only_the_spike() {
    let mut history: Vec<PostStat> = (0..10)
        .map(|idx| post(950 + idx * 10, ContentType::Post, &format!("2025-04-{:02}", idx + 1)))
        .collect();
    history.push(post(10_000, ContentType::Post, "2025-04-20"));

    let filtered = OutlierFilter::default().filter(&history, None);
    assert_eq!(filtered.len(), 10);
    assert!(filtered.iter().all(|post| post.views < 10_000));

    let comparable = PerformancePredictor::default().comparable_posts(&history, ContentType::Post);
    assert_eq!(comparable.len(), 10);
}

#[test]
fn recent_post_outweighs_older_twin() {
    let predictor = PerformancePredictor::default();
    let older = post(500, ContentType::Post, "2025-01-01");
    let newer = post(500, ContentType::Post, "2025-02-01");
    let flat = predictor.weighted_average_views(&[older.clone(), newer.clone()]);
    assert!((flat - 500.0).abs() < 1e-9);

    // Bump the newer post: the average should move further than bumping the older one.
    let mut boosted_newer = newer.clone();
    boosted_newer.views = 600;
    let mut boosted_older = older.clone();
    boosted_older.views = 600;
    let newer_bumped = predictor.weighted_average_views(&[older, boosted_newer]);
    let older_bumped = predictor.weighted_average_views(&[boosted_older, newer]);
    assert!(newer_bumped > older_bumped);
}

#[test]
fn seasonal_factor_partitions_the_year() {
    let mut day = date("2025-01-01");
    while day.year() == 2025 {
        let expected = match day.month() {
            11 | 12 | 1 => 1.15,
            6..=8 => 0.90,
            3..=5 => 1.05,
            _ => 1.00,
        };
        assert_eq!(seasonal_factor(day), expected);
        day = day.succ_opt().unwrap();
    }
}

#[test]
fn empty_history_is_non_negative() {
    let mut request = PricingRequest::new(ContentType::Contest, date("2025-06-01"));
    request.niche_category = "unknown-niche".to_string();
    request.destination = "atlantis".to_string();

    let result = calculate_price(&[], &request);
    assert_eq!(result.estimated_views, 0);
    assert!(result.applied_cpm >= 0.0);
    assert_eq!(result.base_price, 0.0);
    assert_eq!(result.confidence, 0.65);
}

#[test]
fn unknown_niche_falls_back_to_default_tables() {
    let mut request = example_request();
    request.niche_category = "basket weaving".to_string();
    request.destination = "atlantis".to_string();

    let result = calculate_price(&example_history(), &request);
    // 12 base x 0.7 audience x 1.4 engagement (0.0325 vs 0.02) x 1.1 quality x 1.0 niche
    assert!((result.applied_cpm - 12.94).abs() < 1e-9);
    assert!(result.base_price > 0.0);
}

#[test]
fn declared_followers_drive_the_audience_tier() {
    let history = example_history();
    let mut small = example_request();
    small.followers = Some(5_000);
    let mut large = example_request();
    large.followers = Some(2_000_000);

    let small = calculate_price(&history, &small);
    let large = calculate_price(&history, &large);
    assert!(large.applied_cpm > small.applied_cpm);
    assert_eq!(small.estimated_views, large.estimated_views);
}

#[test]
fn maximal_counters_price_without_overflow() {
    let body = r#"{
        "influencerHistory": [
            {"reach": 18446744073709551615, "likes": 18446744073709551615, "comments": 18446744073709551615,
             "saves": 18446744073709551615, "views": 18446744073709551615, "contentType": "POST", "date": "2025-05-01"},
            {"reach": 18446744073709551615, "likes": 18446744073709551615, "comments": 18446744073709551615,
             "saves": 18446744073709551615, "views": 18446744073709551615, "contentType": "POST", "date": "2025-05-03"}
        ],
        "request": {"contentType": "POST", "publishDate": "2025-06-01"}
    }"#;
    let input = PricingInput::from_json_str(body).expect("valid input");
    let result = PricingEngine::default().price(&input);
    assert!(result.base_price.is_finite());
    assert!(result.base_price >= 0.0);
    assert!(result.min_price <= result.base_price && result.base_price <= result.max_price);
}
