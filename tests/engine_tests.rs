mod common;

use chrono::{Duration, Utc};
use uuid::Uuid;

use common::{accepted_connection, engine_over, engine_with_config, user, FakeData, FakeStore};
use elevate_api::error::AppError;
use elevate_api::models::{
    CourseRecord, Domain, GroupRecord, MentorRecord, PostRecord, RecommendationOptions,
    RecommendationRequest,
};
use elevate_api::services::EngineConfig;

fn request(subject: Uuid, domain: Domain) -> RecommendationRequest {
    RecommendationRequest {
        subject_user_id: subject,
        domain,
        options: RecommendationOptions::default(),
    }
}

#[tokio::test]
async fn test_unknown_subject_is_not_found() {
    let engine = engine_over(FakeStore::default());
    let result = engine
        .recommend(&request(Uuid::new_v4(), Domain::Connection))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_invalid_options_rejected_before_any_lookup() {
    let engine = engine_over(FakeStore::default());
    let mut req = request(Uuid::new_v4(), Domain::Connection);
    req.options.limit = 0;
    assert!(matches!(
        engine.recommend(&req).await,
        Err(AppError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_connections_exclude_subject_existing_and_excluded() {
    let subject = user("Subject", &["rust", "sql"]);
    let already = user("Already Connected", &["rust", "sql"]);
    let shunned = user("Excluded", &["rust", "sql"]);
    let fresh = user("Fresh Face", &["rust", "sql"]);

    let mut data = FakeData::default();
    data.connections
        .push(accepted_connection(subject.id, already.id));
    data.users = vec![subject.clone(), already.clone(), shunned.clone(), fresh.clone()];

    let engine = engine_over(FakeStore::new(data));
    let mut req = request(subject.id, Domain::Connection);
    req.options.exclude_ids = vec![shunned.id];
    req.options.min_score = Some(0.0);

    let recommendations = engine.recommend(&req).await.unwrap();

    let ids: Vec<Uuid> = recommendations.iter().map(|r| r.entity_id).collect();
    assert!(!ids.contains(&subject.id));
    assert!(!ids.contains(&already.id));
    assert!(!ids.contains(&shunned.id));
    assert!(ids.contains(&fresh.id));
}

#[tokio::test]
async fn test_scores_respect_min_score_and_ordering() {
    let subject = user("Subject", &["rust", "sql", "kubernetes", "grpc"]);
    let strong = user("Strong Match", &["rust", "sql", "kubernetes", "grpc"]);
    let weak = user("Weak Match", &["painting"]);

    let mut data = FakeData::default();
    data.users = vec![subject.clone(), strong.clone(), weak.clone()];
    data.mutuals.push((subject.id, strong.id, 5));

    let engine = engine_over(FakeStore::new(data));
    let mut req = request(subject.id, Domain::Connection);
    req.options.min_score = Some(0.2);

    let recommendations = engine.recommend(&req).await.unwrap();

    assert!(recommendations.iter().all(|r| r.score >= 0.2));
    for pair in recommendations.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    // Full skill overlap plus mutual connections clears the floor; the weak
    // match does not appear at all.
    assert!(recommendations.iter().any(|r| r.entity_id == strong.id));
    assert!(!recommendations.iter().any(|r| r.entity_id == weak.id));
}

#[tokio::test]
async fn test_pagination_concatenation_matches_full_page() {
    let subject = user("Subject", &["rust"]);
    let mut data = FakeData::default();
    data.users.push(subject.clone());
    for i in 0..8 {
        // Distinct mutual-connection counts spread the scores out.
        let candidate = user(&format!("Candidate {}", i), &["rust"]);
        data.mutuals.push((subject.id, candidate.id, i));
        data.users.push(candidate);
    }

    let engine = engine_over(FakeStore::new(data));

    let page = |offset: usize, limit: usize| {
        let mut req = request(subject.id, Domain::Connection);
        req.options.min_score = Some(0.0);
        req.options.offset = offset;
        req.options.limit = limit;
        req
    };

    let first = engine.recommend(&page(0, 4)).await.unwrap();
    let second = engine.recommend(&page(4, 4)).await.unwrap();
    let full = engine.recommend(&page(0, 8)).await.unwrap();

    let mut concatenated: Vec<Uuid> = first.iter().map(|r| r.entity_id).collect();
    concatenated.extend(second.iter().map(|r| r.entity_id));
    let expected: Vec<Uuid> = full.iter().map(|r| r.entity_id).collect();
    assert_eq!(concatenated, expected);
}

#[tokio::test]
async fn test_mentor_capacity_and_neutral_goals() {
    let subject = user("Subject", &[]);

    let available = MentorRecord {
        user_id: Uuid::new_v4(),
        display_name: "Open Mentor".to_string(),
        industry: None,
        expertise: vec!["rust".to_string()],
        rating: 5.0,
        active_sessions: 2,
        max_sessions: 5,
        last_active_at: Utc::now(),
    };
    let full = MentorRecord {
        user_id: Uuid::new_v4(),
        display_name: "Booked Mentor".to_string(),
        active_sessions: 5,
        ..available.clone()
    };

    let mut data = FakeData::default();
    data.users.push(subject.clone());
    data.mentors = vec![available.clone(), full.clone()];

    let engine = engine_over(FakeStore::new(data));
    let recommendations = engine
        .recommend(&request(subject.id, Domain::Mentor))
        .await
        .unwrap();

    // Subject has no learning goals: neutral 0.5 goal fit still leaves the
    // open mentor above the 0.3 floor (0.15 goals + 0.15 rating + 0.10
    // activity), while the at-capacity mentor is never scored.
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0].entity_id, available.user_id);
    assert!(recommendations[0].score >= 0.3);
}

#[tokio::test]
async fn test_group_size_threshold_and_membership_exclusion() {
    let subject = user("Subject", &[]);
    let mut subject = subject;
    subject.interests = vec!["rust".to_string()];

    let active = GroupRecord {
        id: Uuid::new_v4(),
        name: "Active Rustaceans".to_string(),
        topics: vec!["rust".to_string()],
        communities: vec![],
        member_count: 10,
        weekly_activity: 0,
        last_active_at: Utc::now(),
    };
    let quiet = GroupRecord {
        id: Uuid::new_v4(),
        name: "Quiet Corner".to_string(),
        member_count: 9,
        ..active.clone()
    };
    let joined = GroupRecord {
        id: Uuid::new_v4(),
        name: "Home Group".to_string(),
        ..active.clone()
    };

    let mut data = FakeData::default();
    data.users.push(subject.clone());
    data.groups = vec![active.clone(), quiet.clone(), joined.clone()];
    data.memberships.push((joined.id, subject.id));

    let engine = engine_over(FakeStore::new(data));
    let mut req = request(subject.id, Domain::Group);
    req.options.min_score = Some(0.0);

    let recommendations = engine.recommend(&req).await.unwrap();

    let score_of = |id: Uuid| {
        recommendations
            .iter()
            .find(|r| r.entity_id == id)
            .map(|r| r.score)
    };

    assert!(score_of(joined.id).is_none());
    let active_score = score_of(active.id).unwrap();
    let quiet_score = score_of(quiet.id).unwrap();
    // Ten members crosses the active-community threshold, nine does not.
    assert!((active_score - quiet_score - 0.10).abs() < 1e-9);
}

#[tokio::test]
async fn test_content_excludes_already_engaged_and_stale_posts() {
    let subject = user("Subject", &[]);
    let author = user("Author", &[]);

    let fresh = PostRecord {
        id: Uuid::new_v4(),
        author_id: author.id,
        title: "Fresh take".to_string(),
        topics: vec![],
        like_count: 0,
        comment_count: 0,
        share_count: 0,
        created_at: Utc::now() - Duration::hours(2),
    };
    let liked = PostRecord {
        id: Uuid::new_v4(),
        title: "Already liked".to_string(),
        ..fresh.clone()
    };
    let stale = PostRecord {
        id: Uuid::new_v4(),
        title: "Old news".to_string(),
        created_at: Utc::now() - Duration::days(30),
        ..fresh.clone()
    };

    let mut data = FakeData::default();
    data.users = vec![subject.clone(), author.clone()];
    data.posts = vec![fresh.clone(), liked.clone(), stale.clone()];
    data.likes.push((subject.id, liked.id, Utc::now()));

    let engine = engine_over(FakeStore::new(data));
    let recommendations = engine
        .recommend(&request(subject.id, Domain::Content))
        .await
        .unwrap();

    let ids: Vec<Uuid> = recommendations.iter().map(|r| r.entity_id).collect();
    assert!(ids.contains(&fresh.id));
    assert!(!ids.contains(&liked.id));
    assert!(!ids.contains(&stale.id));
}

#[tokio::test]
async fn test_courses_exclude_enrolled() {
    let mut subject = user("Subject", &["rust"]);
    subject.learning_goals = vec!["sql".to_string()];

    let new_course = CourseRecord {
        id: Uuid::new_v4(),
        title: "Practical SQL".to_string(),
        skills: vec!["sql".to_string()],
        topics: vec![],
        enrollment_count: 500,
        published_at: Utc::now(),
    };
    let enrolled_course = CourseRecord {
        id: Uuid::new_v4(),
        title: "Rust Basics".to_string(),
        ..new_course.clone()
    };

    let mut data = FakeData::default();
    data.users.push(subject.clone());
    data.courses = vec![new_course.clone(), enrolled_course.clone()];
    data.enrollments.push((enrolled_course.id, subject.id));

    let engine = engine_over(FakeStore::new(data));
    let recommendations = engine
        .recommend(&request(subject.id, Domain::Course))
        .await
        .unwrap();

    let ids: Vec<Uuid> = recommendations.iter().map(|r| r.entity_id).collect();
    assert!(ids.contains(&new_course.id));
    assert!(!ids.contains(&enrolled_course.id));
}

#[tokio::test]
async fn test_content_degrades_to_empty_on_store_failure() {
    let subject = user("Subject", &[]);
    let mut data = FakeData::default();
    data.users.push(subject.clone());
    data.fail_posts = true;

    let engine = engine_over(FakeStore::new(data));
    let recommendations = engine
        .recommend(&request(subject.id, Domain::Content))
        .await
        .unwrap();
    assert!(recommendations.is_empty());
}

#[tokio::test]
async fn test_clear_caches_picks_up_new_interactions() {
    let subject = user("Subject", &[]);
    let peer = user("Peer", &[]);
    let post = Uuid::new_v4();

    let mut data = FakeData::default();
    data.users = vec![subject.clone(), peer.clone()];
    data.likes.push((subject.id, post, Utc::now()));

    let store = FakeStore::new(data);
    let engine = engine_over(store.clone());

    let cold = engine.user_similarity(subject.id, peer.id).await;
    assert_eq!(cold, 0.0);

    // The peer now likes the same post; cached profiles and pair scores hide
    // it until the caches are dropped.
    store
        .data
        .lock()
        .unwrap()
        .likes
        .push((peer.id, post, Utc::now()));

    let still_cached = engine.user_similarity(subject.id, peer.id).await;
    assert_eq!(still_cached, 0.0);

    engine.clear_caches();
    let warm = engine.user_similarity(subject.id, peer.id).await;
    assert!(warm > 0.0);
}

#[tokio::test]
async fn test_zero_worker_concurrency_is_floored_not_stalled() {
    let subject = user("Subject", &["rust", "sql"]);
    let candidate = user("Candidate", &["rust", "sql"]);

    let mut data = FakeData::default();
    data.users = vec![subject.clone(), candidate.clone()];
    data.mutuals.push((subject.id, candidate.id, 5));

    let config = EngineConfig {
        worker_concurrency: 0,
        ..Default::default()
    };
    let engine = engine_with_config(FakeStore::new(data), config);

    let mut req = request(subject.id, Domain::Connection);
    req.options.min_score = Some(0.1);

    let recommendations = engine.recommend(&req).await.unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0].entity_id, candidate.id);
}

#[tokio::test]
async fn test_reasons_and_confidence_are_well_formed() {
    let mut subject = user("Subject", &["rust", "sql"]);
    subject.industry = Some("Software".to_string());
    let mut candidate = user("Candidate", &["rust", "sql"]);
    candidate.industry = Some("Software".to_string());

    let mut data = FakeData::default();
    data.users = vec![subject.clone(), candidate.clone()];
    data.mutuals.push((subject.id, candidate.id, 4));

    let engine = engine_over(FakeStore::new(data));
    let recommendations = engine
        .recommend(&request(subject.id, Domain::Connection))
        .await
        .unwrap();

    assert_eq!(recommendations.len(), 1);
    let top = &recommendations[0];
    assert!(!top.reasons.is_empty());
    assert!((0.0..=1.0).contains(&top.confidence));
    assert!(top.reasons.iter().any(|r| r == "Similar skills"));
    assert!(top.reasons.iter().any(|r| r == "4 mutual connections"));
}
