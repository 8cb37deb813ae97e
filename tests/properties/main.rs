//! Property-based tests for similarity, filtering, scoring and the keyword
//! fallback.

use std::sync::Arc;

use proptest::prelude::*;

use creator_search::core::corpus::Corpus;
use creator_search::core::creator::{Creator, Platform};
use creator_search::search::scoring::score_creator;
use creator_search::search::{
    SearchEngine, SearchFilters, SearchRequest, SimilarityMetric, VectorIndex, cosine_similarity,
};
use creator_search::test_utils::FailingProvider;
use creator_search::test_utils::fixtures::{DIMS, test_config};

fn arb_vector(len: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-100.0f32..100.0, len)
}

fn arb_platform() -> impl Strategy<Value = Platform> {
    prop_oneof![
        Just(Platform::Instagram),
        Just(Platform::YouTube),
        Just(Platform::TikTok),
        Just(Platform::Twitch),
    ]
}

const CATEGORIES: [&str; 5] = ["fitness", "tech", "food", "fashion", "gaming"];
const CITIES: [&str; 4] = ["Austin, TX", "Miami, FL", "Toronto, Canada", "Denver, CO"];

fn arb_creator() -> impl Strategy<Value = Creator> {
    (
        "[a-z]{1,8}",
        arb_platform(),
        0u64..2_000_000,
        0.0f64..20.0,
        0u8..=100,
        prop::sample::subsequence(CATEGORIES.to_vec(), 0..3),
        prop::sample::select(CITIES.to_vec()),
        "[a-z ]{0,40}",
    )
        .prop_map(
            |(id, platform, followers, engagement, response, categories, city, style)| {
                Creator::new(id.clone(), format!("Creator {id}"), platform)
                    .with_followers(followers)
                    .with_engagement_rate(engagement)
                    .with_response_rate(response)
                    .with_categories(categories)
                    .with_location(city)
                    .with_content_style(style)
            },
        )
}

fn arb_filters() -> impl Strategy<Value = SearchFilters> {
    (
        prop::option::of(arb_platform()),
        prop::option::of(0u64..1_000_000),
        prop::option::of(0.0f64..10.0),
        prop::sample::subsequence(CATEGORIES.to_vec(), 0..2),
        prop::option::of(prop::sample::select(vec!["Austin", "miami", "CANADA"])),
        prop::option::of(0u8..=100),
    )
        .prop_map(|(platform, min_followers, min_er, categories, location, rr)| {
            SearchFilters {
                platform: platform.map(|p| p.to_string()),
                min_followers,
                min_engagement_rate: min_er,
                categories: categories.into_iter().map(String::from).collect(),
                location: location.map(String::from),
                response_rate_min: rr,
                ..SearchFilters::default()
            }
        })
}

proptest! {
    #[test]
    fn cosine_is_symmetric_and_bounded(
        (a, b) in (1usize..32).prop_flat_map(|n| (arb_vector(n), arb_vector(n)))
    ) {
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-6);
        prop_assert!((-1.0..=1.0).contains(&ab));
    }

    #[test]
    fn zero_vector_has_zero_similarity(v in arb_vector(16)) {
        prop_assert_eq!(cosine_similarity(&v, &[0.0; 16]), 0.0);
        prop_assert_eq!(cosine_similarity(&[0.0; 16], &v), 0.0);
    }

    #[test]
    fn higher_threshold_returns_subset(
        vectors in prop::collection::vec(arb_vector(8), 1..20),
        query in arb_vector(8),
        low in -1.0f32..1.0,
        delta in 0.0f32..1.0,
    ) {
        let index: VectorIndex = vectors
            .into_iter()
            .enumerate()
            .map(|(i, v)| (format!("c{i:02}"), v))
            .collect();
        let high = (low + delta).min(1.0);
        let loose = index.search(&query, usize::MAX, low);
        let strict = index.search(&query, usize::MAX, high);

        prop_assert!(strict.len() <= loose.len());
        for candidate in &strict {
            prop_assert!(candidate.score >= high);
            prop_assert!(loose.iter().any(|c| c.id == candidate.id));
        }
        prop_assert_eq!(index.metric(), SimilarityMetric::Cosine);
    }

    #[test]
    fn filters_admit_only_matching_creators(
        creators in prop::collection::vec(arb_creator(), 0..15),
        filters in arb_filters(),
    ) {
        for creator in creators.iter().filter(|c| filters.matches(c)) {
            if let Some(platform) = &filters.platform {
                prop_assert!(creator.platform.as_str().eq_ignore_ascii_case(platform));
            }
            if let Some(min) = filters.min_followers {
                prop_assert!(creator.followers >= min);
            }
            if let Some(min) = filters.min_engagement_rate {
                prop_assert!(creator.engagement_rate >= min);
            }
            if !filters.categories.is_empty() {
                prop_assert!(filters.categories.iter().any(|c| creator.has_category(c)));
            }
            if let Some(location) = &filters.location {
                prop_assert!(creator.location.to_lowercase().contains(&location.to_lowercase()));
            }
            if let Some(min) = filters.response_rate_min {
                prop_assert!(creator.response_rate >= min);
            }
        }
    }

    #[test]
    fn creator_score_stays_in_range(creator in arb_creator()) {
        let score = score_creator(&creator);
        prop_assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn provider_outage_equals_keyword_search(
        creators in prop::collection::vec(arb_creator(), 1..12),
        query in prop::sample::select(vec!["fitness tips", "tech", "food fashion", "gaming streams"]),
        filters in arb_filters(),
    ) {
        let corpus = Corpus::new(creators);
        let engine = SearchEngine::new(&test_config(), Arc::new(FailingProvider::new(DIMS)));
        let request = SearchRequest::new(query).with_filters(filters).with_limit(5);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let degraded = runtime.block_on(engine.search(&request, &corpus)).unwrap();
        let keyword = engine.keyword_search(&request, &corpus).unwrap();

        prop_assert!(degraded.used_fallback);
        let degraded_ids: Vec<_> = degraded.results.iter().map(|r| r.creator_id.clone()).collect();
        let keyword_ids: Vec<_> = keyword.results.iter().map(|r| r.creator_id.clone()).collect();
        prop_assert_eq!(degraded_ids, keyword_ids);
        prop_assert_eq!(degraded.error_message, keyword.error_message);
    }
}
