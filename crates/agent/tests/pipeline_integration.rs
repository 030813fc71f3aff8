//! Pipeline tests: ranking guarantees, refinement outcomes and a full
//! search → score → rank → review → refine → approve cycle

use std::sync::Arc;

use async_trait::async_trait;
use leadgen_agent::{
    rank, AgentError, InMemoryProspectStore, ListState, ProspectAgent, RankOptions,
    EXCLUDED_INDUSTRIES,
};
use leadgen_config::Settings;
use leadgen_core::{
    Company, CompanySizeCriterion, Icp, Person, Prospect, ProspectScore, ProspectSource,
    ProspectStatus, RawCandidate, Result,
};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

fn scored(id: &str, total: f64) -> Prospect {
    let mut prospect = Prospect::new(id, Company::named(id), Person::default(), "test");
    prospect.score = Some(Arc::new(ProspectScore {
        total_score: total,
        company_match_score: total,
        person_match_score: total,
        intent_score: total,
        engagement_score: total,
        criteria_scores: Default::default(),
        explanation: String::new(),
        strengths: vec![],
        weaknesses: vec![],
        scoring_method: "test".into(),
        icp_version: 1,
    }));
    prospect
}

fn ids(prospects: &[Prospect]) -> Vec<String> {
    prospects.iter().map(|p| p.id.clone()).collect()
}

/// Seeded scores on a 0.1 grid so ties are common
fn generated(n: usize, seed: u64) -> Vec<Prospect> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| scored(&format!("p{}", i), rng.gen_range(0..=10) as f64 / 10.0))
        .collect()
}

#[test]
fn test_rank_tie_keeps_first_and_reports_counts() {
    let prospects = vec![scored("p1", 0.9), scored("p2", 0.5), scored("p3", 0.9)];
    let result = rank(prospects, &RankOptions::default().with_min_score(0.6).with_limit(1));

    assert_eq!(ids(&result.ranked), vec!["p1"]);
    assert_eq!(result.total_evaluated, 3);
    assert_eq!(result.total_after_filter, 2);
}

#[test]
fn test_rank_empty_input() {
    let result = rank(vec![], &RankOptions::default().with_min_score(0.5));
    assert!(result.ranked.is_empty());
    assert_eq!(result.total_evaluated, 0);
    assert_eq!(result.total_after_filter, 0);
}

#[test]
fn test_rank_unreachable_min_score() {
    let result = rank(generated(20, 3), &RankOptions::default().with_min_score(1.5));
    assert!(result.ranked.is_empty());
    assert_eq!(result.total_evaluated, 20);
}

#[test]
fn test_rank_filter_sort_and_idempotence() {
    for seed in 0..50u64 {
        let input = generated(40, seed);
        let min_score = (seed % 10) as f64 / 10.0;
        let limit = if seed % 3 == 0 { Some((seed % 7) as usize) } else { None };
        let options = RankOptions {
            min_score,
            limit,
            ..Default::default()
        };

        let once = rank(input.clone(), &options);
        let twice = rank(once.ranked.clone(), &options);
        assert_eq!(ids(&once.ranked), ids(&twice.ranked), "seed {}", seed);

        for window in once.ranked.windows(2) {
            assert!(
                window[0].total_score() >= window[1].total_score(),
                "not sorted at seed {}",
                seed
            );
            if window[0].total_score() == window[1].total_score() {
                let pos = |id: &str| input.iter().position(|p| p.id == id);
                assert!(pos(&window[0].id) < pos(&window[1].id), "unstable at seed {}", seed);
            }
        }

        assert!(once.ranked.iter().all(|p| p.total_score() >= min_score));
        let kept = ids(&once.ranked);
        for p in &input {
            if !kept.contains(&p.id) {
                assert!(
                    p.total_score() < min_score || limit.is_some(),
                    "{} dropped without cause at seed {}",
                    p.id,
                    seed
                );
            }
        }
    }
}

/// Source returning canned provider records and remembering the ICP
/// versions it was queried with
struct FixtureSource {
    queried_versions: Mutex<Vec<u32>>,
}

impl FixtureSource {
    fn new() -> Self {
        Self {
            queried_versions: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ProspectSource for FixtureSource {
    async fn search(&self, icp: &Icp, limit: usize) -> Result<Vec<RawCandidate>> {
        self.queried_versions.lock().push(icp.version);
        let records = vec![
            RawCandidate {
                company: json!({"name": "Acme Cloud", "industry": "Technology", "employee_count": 150}),
                person: json!({"first_name": "Ada", "last_name": "Lovelace", "title": "CTO"}),
                source: "people_search".into(),
            },
            RawCandidate {
                company: json!({"name": "Shopify-ish", "industry": "Retail", "size": "51-200"}),
                person: json!({"name": "Sam Rep", "title": "Sales Rep"}),
                source: "people_search".into(),
            },
            RawCandidate {
                company: json!({"title": "Initech", "url": "https://initech.com", "industry": "Technology", "employees": 3000}),
                person: json!({"name": "Peter Gibbons", "position": "VP Engineering"}),
                source: "web".into(),
            },
        ];
        Ok(records.into_iter().take(limit).collect())
    }

    fn name(&self) -> &str {
        "fixture"
    }
}

fn tech_icp() -> Icp {
    let mut icp = Icp::new("icp-tech", "Mid-market tech");
    icp.industries = vec!["Technology".into()];
    icp.target_roles = vec!["CTO".into()];
    icp.company_size = Some(CompanySizeCriterion::between(50, 500));
    icp
}

fn agent_with(source: Arc<FixtureSource>) -> ProspectAgent {
    let agent = ProspectAgent::new(&Settings::default(), Arc::new(InMemoryProspectStore::new()))
        .unwrap()
        .with_source(source);
    agent.set_icp(tech_icp()).unwrap();
    agent
}

#[tokio::test]
async fn test_full_cycle() {
    let source = Arc::new(FixtureSource::new());
    let agent = agent_with(Arc::clone(&source));

    let first = agent.run_cycle(10, None).await.unwrap();
    assert_eq!(first.total_evaluated, 3);
    assert_eq!(first.ranked[0].person.title(), Some("CTO"));
    assert!(first.ranked.iter().all(|p| p.score.is_some()));
    assert_eq!(agent.list_state(), Some(ListState::Ranked));

    let reviewed = agent.mark_reviewed().unwrap();
    assert!(reviewed.iter().all(|p| p.status == ProspectStatus::Reviewed));

    // 1-based: the retail prospect ranks last
    let retail_position = first
        .ranked
        .iter()
        .position(|p| p.company.industry.as_deref() == Some("Retail"))
        .unwrap()
        + 1;
    let response = agent
        .refine_by_indices("focus on bigger companies", &[1, 99], &[retail_position])
        .unwrap();
    assert!(response.outcome.changed);
    assert!(!response.no_changes_applied);
    assert_eq!(ids(&response.previous), ids(&first.ranked));
    assert_eq!(agent.list_state(), Some(ListState::Refined));

    let icp = agent.icp().unwrap();
    assert_eq!(icp.version, 2);
    assert_eq!(icp.company_size.as_ref().and_then(|s| s.min_employees), Some(51));
    assert_eq!(icp.excluded(EXCLUDED_INDUSTRIES), &["Retail".to_string()]);

    // the refined ICP drives the next search; retail is excluded at ingest
    let second = agent.run_cycle(10, None).await.unwrap();
    assert_eq!(second.total_evaluated, 2);
    assert_eq!(*source.queried_versions.lock(), vec![1, 2]);

    let rounds = agent.rounds();
    assert_eq!(rounds.len(), 2);
    assert_eq!(rounds[0].icp_version, 1);
    assert_eq!(rounds[1].icp_version, 2);
    assert_eq!(rounds[0].scores.len(), 3);
    assert!(rounds[1]
        .scores
        .values()
        .all(|score| score.icp_version == 2));

    // both survivors share the liked prospect's industry and nothing with
    // the disliked retail one beyond size, so both are boosted
    assert!(rounds[0].adjustments.is_empty());
    assert_eq!(rounds[1].adjustments.len(), 2);
    for prospect in &second.ranked {
        let adjustment = prospect.user_score_adjustment.unwrap();
        assert!(adjustment > 0.0, "{} adjusted by {}", prospect.id, adjustment);
        assert_eq!(rounds[1].adjustments[&prospect.id], adjustment);
        assert!(
            (prospect.effective_score() - (prospect.total_score() + adjustment).min(1.0)).abs() < 1e-9
        );
    }
    for window in second.ranked.windows(2) {
        assert!(window[0].effective_score() >= window[1].effective_score());
    }

    agent.mark_reviewed().unwrap();
    let approved = agent.approve().unwrap();
    assert_eq!(approved.len(), 2);
    assert!(approved.iter().all(|p| p.status == ProspectStatus::Approved));
    assert_eq!(agent.list_state(), Some(ListState::Approved));

    assert!(matches!(agent.search(10).await, Err(AgentError::Core(_))));
}

#[tokio::test]
async fn test_disliking_a_targeted_prospect_keeps_its_industry() {
    let agent = agent_with(Arc::new(FixtureSource::new()));
    let first = agent.run_cycle(10, None).await.unwrap();
    agent.mark_reviewed().unwrap();

    let position = |ranked: &[Prospect], title: &str| {
        ranked
            .iter()
            .position(|p| p.person.title() == Some(title))
            .unwrap()
            + 1
    };
    let vp = position(&first.ranked, "VP Engineering");
    let response = agent
        .refine_by_indices("bigger companies, wrong kind of role", &[], &[vp])
        .unwrap();
    assert!(response.outcome.changed);
    let icp = agent.icp().unwrap();
    assert!(icp.excluded(EXCLUDED_INDUSTRIES).is_empty());
    assert_eq!(icp.industries, vec!["Technology".to_string()]);

    let disliked = agent.store().get(&first.ranked[vp - 1].id).unwrap();
    assert_eq!(disliked.tags, vec!["disliked".to_string()]);
    assert!(disliked.notes[0].ends_with("disliked: bigger companies, wrong kind of role"));

    // nothing excluded at ingest; the look-alike is penalized instead
    let second = agent.run_cycle(10, None).await.unwrap();
    assert_eq!(second.total_evaluated, 3);
    let adjustments = &agent.active_round().unwrap().adjustments;
    let look_alike = &second.ranked[position(&second.ranked, "VP Engineering") - 1];
    assert!((adjustments[&look_alike.id] + 0.13).abs() < 1e-9, "{:?}", adjustments);
    assert!(look_alike.effective_score() < look_alike.total_score());
}

#[tokio::test]
async fn test_refinement_without_signal_keeps_list() {
    let agent = agent_with(Arc::new(FixtureSource::new()));
    let ranked = agent.run_cycle(10, None).await.unwrap();
    agent.mark_reviewed().unwrap();

    let response = agent.refine("no real signal here", &[], &[]).unwrap();
    assert!(response.no_changes_applied);
    assert!(!response.outcome.changed);
    assert!(response.outcome.changes_summary.is_empty());
    assert_eq!(response.outcome.updated_icp.version, 1);
    assert_eq!(ids(&response.previous), ids(&ranked.ranked));

    assert_eq!(agent.list_state(), Some(ListState::Reviewed));
    assert_eq!(agent.icp().unwrap().version, 1);
    assert_eq!(agent.active_round().unwrap().ranked_ids, ids(&ranked.ranked));
}

#[tokio::test]
async fn test_refine_before_review_is_rejected() {
    let agent = agent_with(Arc::new(FixtureSource::new()));
    agent.run_cycle(10, None).await.unwrap();

    let err = agent.refine("bigger companies", &[], &[]).unwrap_err();
    assert!(matches!(
        err,
        AgentError::Core(leadgen_core::Error::InvalidTransition { .. })
    ));
    assert_eq!(agent.icp().unwrap().version, 1);
}

#[tokio::test]
async fn test_search_without_source() {
    let agent = ProspectAgent::new(&Settings::default(), Arc::new(InMemoryProspectStore::new())).unwrap();
    agent.set_icp(tech_icp()).unwrap();
    assert!(matches!(agent.search(5).await, Err(AgentError::NoSource)));
}

#[tokio::test]
async fn test_insights_for_active_round() {
    let agent = agent_with(Arc::new(FixtureSource::new()));
    agent.run_cycle(10, None).await.unwrap();

    let insights = agent.insights();
    assert_eq!(insights.total, 3);
    assert_eq!(insights.top_industries[0], ("Technology".to_string(), 2));
    assert_eq!(insights.source_breakdown["web"], 1);
    assert_eq!(insights.high + insights.medium + insights.low, 3);
}
