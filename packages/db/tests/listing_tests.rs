#![allow(clippy::disallowed_methods)]

mod common;

use std::error::Error;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use common::locale;
use db::{DbError, FilterValue, JobListingRepository, JobQuery, RepositoryConfig, SortDirection};
use jobs_core::{JobAttributes, JobField, Locale, Parameterize, validation};
use search::{DocumentKey, IndexDocument, IndexError, KeywordIndex, SearchHit};

fn yesterday() -> DateTime<Utc> {
    Utc::now() - Duration::days(1)
}

fn field_errors(result: Result<impl std::fmt::Debug, DbError>, field: JobField) -> Vec<String> {
    match result {
        Err(DbError::Validation(errors)) => {
            errors.on(field).into_iter().map(str::to_string).collect()
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn create_and_get() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();

    let attrs = JobAttributes::new("Senior Baker", "Bread and pastry")
        .with_text(JobField::Hours, "40")
        .with_published_at(yesterday());
    let created = repo.create(&en, attrs).await?;

    assert_eq!(created.title(&en), Some("Senior Baker"));
    assert_eq!(created.slug(&en), Some("senior-baker"));
    assert!(created.is_live());

    let loaded = repo.get(created.id).await?;
    assert_eq!(loaded.id, created.id);
    assert_eq!(loaded.translations.len(), 1);
    assert_eq!(loaded.translations[0].hours.as_deref(), Some("40"));

    let by_slug = repo.find_by_slug("senior-baker", &en).await?;
    assert_eq!(by_slug.id, created.id);

    let by_id = repo.find(&created.id.to_string(), &en).await?;
    assert_eq!(by_id.id, created.id);

    Ok(())
}

#[tokio::test]
async fn missing_listings_are_not_found() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();

    let missing = jobs_core::JobListingId::new();
    assert!(matches!(repo.get(missing).await, Err(DbError::NotFound(_))));
    assert!(matches!(repo.delete(missing).await, Err(DbError::NotFound(_))));
    assert!(matches!(
        repo.find_by_slug("nothing-here", &en).await,
        Err(DbError::NotFound(_))
    ));
    assert!(matches!(repo.find("nothing-here", &en).await, Err(DbError::NotFound(_))));
    assert!(matches!(
        repo.update(missing, &en, JobAttributes::new("Baker", "Bread")).await,
        Err(DbError::NotFound(_))
    ));

    Ok(())
}

#[tokio::test]
async fn blank_and_long_fields_are_rejected() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();

    let blank = repo.create(&en, JobAttributes::new("  ", "Bread")).await;
    assert_eq!(field_errors(blank, JobField::Title), vec![validation::BLANK]);

    let long = repo
        .create(&en, JobAttributes::new("x".repeat(256), "Bread"))
        .await;
    assert_eq!(field_errors(long, JobField::Title), vec![validation::too_long()]);

    let long_salary = repo
        .create(
            &en,
            JobAttributes::new("Baker", "Bread").with_text(JobField::Salary, "9".repeat(256)),
        )
        .await;
    assert_eq!(
        field_errors(long_salary, JobField::Salary),
        vec![validation::too_long()]
    );

    // 255 characters is still fine.
    repo.create(&en, JobAttributes::new("x".repeat(255), "Bread"))
        .await?;

    assert!(repo.latest(10).await?.len() == 1);
    Ok(())
}

#[tokio::test]
async fn unsluggable_title_is_a_slug_error() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;

    let result = repo
        .create(&Locale::default(), JobAttributes::new("!!!", "Bread"))
        .await;
    assert_eq!(field_errors(result, JobField::Slug), vec![validation::BLANK]);

    Ok(())
}

#[tokio::test]
async fn duplicate_titles_are_rejected_across_locales() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();
    let nl = locale("nl");

    let first = repo.create(&en, JobAttributes::new("Baker", "Bread")).await?;

    let same_locale = repo.create(&en, JobAttributes::new("Baker", "Cakes")).await;
    assert_eq!(field_errors(same_locale, JobField::Title), vec![validation::TAKEN]);

    let other_locale = repo.create(&nl, JobAttributes::new("Baker", "Brood")).await;
    assert_eq!(field_errors(other_locale, JobField::Title), vec![validation::TAKEN]);

    // The owner may reuse its own title in another locale.
    let updated = repo
        .update(first.id, &nl, JobAttributes::new("Baker", "Brood"))
        .await?;
    assert_eq!(updated.translations.len(), 2);

    Ok(())
}

#[tokio::test]
async fn slug_follows_title_changes() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();

    let created = repo.create(&en, JobAttributes::new("Baker", "Bread")).await?;
    assert_eq!(created.slug(&en), Some("baker"));

    let same_title = repo
        .update(created.id, &en, JobAttributes::new("Baker", "Bread and cakes"))
        .await?;
    assert_eq!(same_title.slug(&en), Some("baker"));
    assert_eq!(same_title.created_at, created.created_at);
    assert!(same_title.updated_at >= created.updated_at);

    let renamed = repo
        .update(created.id, &en, JobAttributes::new("Head Baker", "Bread"))
        .await?;
    assert_eq!(renamed.slug(&en), Some("head-baker"));
    assert_eq!(renamed.translations.len(), 1);

    assert!(matches!(
        repo.find_by_slug("baker", &en).await,
        Err(DbError::NotFound(_))
    ));
    assert_eq!(repo.find_by_slug("head-baker", &en).await?.id, created.id);

    Ok(())
}

#[tokio::test]
async fn slug_collisions_are_scoped_by_locale() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();
    let nl = locale("nl");

    let first = repo.create(&en, JobAttributes::new("Baker!", "Bread")).await?;
    let second = repo.create(&en, JobAttributes::new("Baker?", "Bread")).await?;
    let third = repo.create(&en, JobAttributes::new("Baker.", "Bread")).await?;
    let dutch = repo.create(&nl, JobAttributes::new("Baker...", "Brood")).await?;

    assert_eq!(first.slug(&en), Some("baker"));
    assert_eq!(second.slug(&en), Some("baker-2"));
    assert_eq!(third.slug(&en), Some("baker-3"));
    assert_eq!(dutch.slug(&nl), Some("baker"));

    assert_eq!(repo.find_by_slug("baker", &nl).await?.id, dutch.id);
    assert_eq!(repo.find_by_slug("baker", &en).await?.id, first.id);

    Ok(())
}

#[tokio::test]
async fn reserved_slugs_are_skipped() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();

    let created = repo.create(&en, JobAttributes::new("New", "Fresh")).await?;
    assert_eq!(created.slug(&en), Some("new-2"));

    Ok(())
}

#[tokio::test]
async fn latest_returns_newest_first() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();

    let mut ids = Vec::new();
    for i in 1..=5 {
        let listing = repo
            .create(&en, JobAttributes::new(format!("Job {i}"), "Work"))
            .await?;
        ids.push(listing.id);
        tokio::time::sleep(StdDuration::from_millis(5)).await;
    }

    let latest: Vec<_> = repo.latest(3).await?.into_iter().map(|l| l.id).collect();
    assert_eq!(latest, vec![ids[4], ids[3], ids[2]]);

    let defaults = repo.latest_default().await?;
    assert_eq!(defaults.len(), 5);

    Ok(())
}

#[tokio::test]
async fn live_excludes_drafts_and_future_listings() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();

    let published = repo
        .create(
            &en,
            JobAttributes::new("Baker", "Bread").with_published_at(yesterday()),
        )
        .await?;
    let draft = repo
        .create(
            &en,
            JobAttributes::new("Butcher", "Meat")
                .with_published_at(yesterday())
                .with_draft(true),
        )
        .await?;
    let scheduled = repo
        .create(
            &en,
            JobAttributes::new("Brewer", "Beer").with_published_at(Utc::now() + Duration::days(1)),
        )
        .await?;

    assert!(published.is_live());
    assert!(!draft.is_live());
    assert!(!scheduled.is_live());

    let live: Vec<_> = repo.live(None).await?.into_iter().map(|l| l.id).collect();
    assert_eq!(live, vec![published.id]);

    Ok(())
}

#[tokio::test]
async fn publish_boundary_is_inclusive() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();
    let as_of = DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")?.with_timezone(&Utc);

    let listing = repo
        .create(&en, JobAttributes::new("Baker", "Bread").with_published_at(as_of))
        .await?;
    assert!(listing.is_live_at(as_of));

    let found = repo.published_before(as_of, None).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, listing.id);

    let before = repo
        .published_before(as_of - Duration::seconds(1), None)
        .await?;
    assert!(before.is_empty());

    Ok(())
}

#[tokio::test]
async fn live_listings_are_filtered_by_locale() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();
    let nl = locale("nl");

    let english = repo
        .create(&en, JobAttributes::new("Baker", "Bread").with_published_at(yesterday()))
        .await?;
    let dutch = repo
        .create(&nl, JobAttributes::new("Bakker", "Brood").with_published_at(yesterday()))
        .await?;

    let live_en: Vec<_> = repo.live(None).await?.into_iter().map(|l| l.id).collect();
    assert_eq!(live_en, vec![english.id]);

    let live_nl = repo.live(Some(&nl)).await?;
    assert_eq!(live_nl.len(), 1);
    assert_eq!(live_nl[0].id, dutch.id);
    assert_eq!(live_nl[0].title(&nl), Some("Bakker"));

    Ok(())
}

#[tokio::test]
async fn localized_filter_joins_translations() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();
    let nl = locale("nl");

    let baker = repo
        .create(
            &en,
            JobAttributes::new("Baker", "Bread").with_text(JobField::Hours, "40"),
        )
        .await?;
    repo.update(
        baker.id,
        &nl,
        JobAttributes::new("Bakker", "Brood").with_text(JobField::Hours, "32"),
    )
    .await?;
    repo.create(
        &en,
        JobAttributes::new("Butcher", "Meat")
            .with_text(JobField::Hours, "32")
            .with_draft(true),
    )
    .await?;

    // Translated and base conditions together.
    let query = JobQuery::with_localized_filter([
        (JobField::Hours, FilterValue::from("32")),
        (JobField::Draft, FilterValue::from(false)),
    ]);

    let dutch = repo.fetch(&query, Some(&nl)).await?;
    assert_eq!(dutch.len(), 1);
    assert_eq!(dutch[0].id, baker.id);
    assert_eq!(dutch[0].title(&nl), Some("Bakker"));
    assert_eq!(dutch[0].translations.len(), 1);

    // Defaults to the repository locale, where the baker works 40 hours.
    assert!(repo.fetch(&query, None).await?.is_empty());

    // An explicit locale condition wins over the fetch locale.
    let pinned = query.clone().in_locale(&nl);
    assert_eq!(repo.fetch(&pinned, Some(&en)).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn queries_order_by_translated_fields() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();

    for title in ["Cook", "Accountant", "Baker"] {
        repo.create(&en, JobAttributes::new(title, "Work")).await?;
    }

    let query = JobQuery::new()
        .order_by(JobField::Title, SortDirection::Asc)
        .limit(2);
    let titles: Vec<_> = repo
        .fetch(&query, None)
        .await?
        .iter()
        .filter_map(|l| l.title(&en).map(str::to_string))
        .collect();
    assert_eq!(titles, vec!["Accountant", "Baker"]);

    Ok(())
}

#[tokio::test]
async fn search_ranks_and_localizes() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();
    let nl = locale("nl");

    let baker = repo
        .create(&en, JobAttributes::new("Senior Baker", "Bread and pastry"))
        .await?;
    let pastry = repo
        .create(&en, JobAttributes::new("Pastry Chef", "Cakes, bread and more bread"))
        .await?;
    repo.create(&en, JobAttributes::new("Butcher", "Meat")).await?;
    repo.update(baker.id, &nl, JobAttributes::new("Bakker", "Brood en gebak"))
        .await?;

    let ids: Vec<_> = repo
        .search("bread", &en)
        .await?
        .into_iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec![pastry.id, baker.id]);

    let excluded = repo.search("bread -pastry", &en).await?;
    assert!(excluded.is_empty());

    let dutch = repo.search("brood", &nl).await?;
    assert_eq!(dutch.len(), 1);
    assert_eq!(dutch[0].translations.len(), 1);
    assert_eq!(dutch[0].title(&nl), Some("Bakker"));

    assert!(repo.search("brood", &en).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn deleted_listings_leave_the_index() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();

    let baker = repo.create(&en, JobAttributes::new("Baker", "Bread")).await?;
    assert_eq!(repo.search("bread", &en).await?.len(), 1);

    repo.delete(baker.id).await?;
    assert!(repo.search("bread", &en).await?.is_empty());
    assert_eq!(repo.index().len().await, 0);

    Ok(())
}

#[tokio::test]
async fn search_can_be_disabled() -> Result<(), Box<dyn Error>> {
    let db = common::setup_db().await?;
    let repo = JobListingRepository::new(db, RepositoryConfig::default().with_search_enabled(false));
    let en = Locale::default();

    repo.create(&en, JobAttributes::new("Baker", "Bread")).await?;

    assert!(matches!(repo.search("bread", &en).await, Err(DbError::SearchDisabled)));
    assert!(matches!(repo.reindex().await, Err(DbError::SearchDisabled)));

    Ok(())
}

/// Index whose writes always fail.
struct UnavailableIndex;

impl KeywordIndex for UnavailableIndex {
    async fn upsert(&self, _key: &DocumentKey, _document: &IndexDocument) -> Result<(), IndexError> {
        Err(IndexError::Unavailable("offline".into()))
    }

    async fn remove(&self, _key: &DocumentKey) -> Result<(), IndexError> {
        Err(IndexError::Unavailable("offline".into()))
    }

    async fn clear(&self) -> Result<(), IndexError> {
        Err(IndexError::Unavailable("offline".into()))
    }

    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, IndexError> {
        Err(IndexError::Unavailable("offline".into()))
    }
}

#[tokio::test]
async fn index_failures_do_not_fail_writes() -> Result<(), Box<dyn Error>> {
    let db = common::setup_db().await?;
    let repo = JobListingRepository::with_strategies(
        db,
        RepositoryConfig::default(),
        Parameterize::default(),
        UnavailableIndex,
    );
    let en = Locale::default();

    let created = repo.create(&en, JobAttributes::new("Baker", "Bread")).await?;
    repo.update(created.id, &en, JobAttributes::new("Head Baker", "Bread"))
        .await?;
    assert_eq!(repo.get(created.id).await?.slug(&en), Some("head-baker"));

    assert!(matches!(
        repo.search("bread", &en).await,
        Err(DbError::Index(IndexError::Unavailable(_)))
    ));

    repo.delete(created.id).await?;
    Ok(())
}

#[tokio::test]
async fn reindex_rebuilds_from_the_store() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();
    let nl = locale("nl");

    let baker = repo.create(&en, JobAttributes::new("Baker", "Bread")).await?;
    repo.update(baker.id, &nl, JobAttributes::new("Bakker", "Brood"))
        .await?;
    repo.create(&en, JobAttributes::new("Butcher", "Meat")).await?;

    repo.index().clear().await?;
    assert!(repo.search("bread", &en).await?.is_empty());

    assert_eq!(repo.reindex().await?, 3);
    assert_eq!(repo.search("bread", &en).await?.len(), 1);
    assert_eq!(repo.search("brood", &nl).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn translations_load_for_every_locale() -> Result<(), Box<dyn Error>> {
    let db = common::setup_db().await?;
    // Running the schema again must leave lookups intact.
    db::init_schema(&db).await?;
    let repo = JobListingRepository::new(db, RepositoryConfig::default());
    let en = Locale::default();
    let nl = locale("nl");

    let baker = repo.create(&en, JobAttributes::new("Baker", "Bread")).await?;
    assert_eq!(baker.translations.len(), 1);

    let updated = repo
        .update(baker.id, &nl, JobAttributes::new("Bakker", "Brood"))
        .await?;
    assert_eq!(updated.title(&en), Some("Baker"));
    assert_eq!(updated.title(&nl), Some("Bakker"));

    let butcher = repo.create(&en, JobAttributes::new("Butcher", "Meat")).await?;

    let all = repo.translations().for_listing(baker.id, None).await?;
    let locales: Vec<_> = all.iter().map(|t| t.locale.as_str()).collect();
    assert_eq!(locales, vec!["en", "nl"]);

    let grouped = repo
        .translations()
        .for_listings(&[baker.id, butcher.id], None)
        .await?;
    assert_eq!(grouped.get(&baker.id).map(Vec::len), Some(2));
    assert_eq!(grouped.get(&butcher.id).map(Vec::len), Some(1));

    let latest = repo.latest(10).await?;
    assert!(latest.iter().all(|l| !l.translations.is_empty()));

    Ok(())
}

#[tokio::test]
async fn adding_a_locale_keeps_publication_state() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();
    let nl = locale("nl");
    let next_month = Utc::now() + Duration::days(30);

    let draft = repo
        .create(
            &en,
            JobAttributes::new("Baker", "Bread")
                .with_draft(true)
                .with_published_at(next_month),
        )
        .await?;

    let translated = repo
        .update(draft.id, &nl, JobAttributes::new("Bakker", "Brood"))
        .await?;
    assert!(translated.draft);
    assert_eq!(translated.published_at, draft.published_at);
    assert!(!translated.is_live());
    assert!(repo.live(Some(&nl)).await?.is_empty());

    let published = repo
        .update(
            draft.id,
            &nl,
            JobAttributes::new("Bakker", "Brood")
                .with_draft(false)
                .with_published_at(yesterday()),
        )
        .await?;
    assert!(!published.draft);
    assert!(published.is_live());
    assert_eq!(repo.live(Some(&nl)).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn oversized_latest_limit_returns_everything() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();

    repo.create(&en, JobAttributes::new("Baker", "Bread")).await?;
    repo.create(&en, JobAttributes::new("Butcher", "Meat")).await?;

    assert_eq!(repo.latest(usize::MAX).await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn concurrent_creates_with_clashing_slugs_both_succeed() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;
    let en = Locale::default();

    let (first, second) = tokio::join!(
        repo.create(&en, JobAttributes::new("Baker!", "Bread")),
        repo.create(&en, JobAttributes::new("Baker?", "Bread")),
    );
    let (first, second) = (first?, second?);

    let mut slugs = vec![
        first.slug(&en).map(str::to_string),
        second.slug(&en).map(str::to_string),
    ];
    slugs.sort();
    assert_eq!(
        slugs,
        vec![Some("baker".to_string()), Some("baker-2".to_string())]
    );

    Ok(())
}

#[tokio::test]
async fn region_case_does_not_split_locales() -> Result<(), Box<dyn Error>> {
    let repo = common::listings().await?;

    let listing = repo
        .create(&locale("pt-BR"), JobAttributes::new("Padeiro", "Pão"))
        .await?;
    let updated = repo
        .update(listing.id, &locale("pt-br"), JobAttributes::new("Padeiro", "Pão e bolos"))
        .await?;

    assert_eq!(updated.translations.len(), 1);
    assert_eq!(updated.translations[0].locale.as_str(), "pt-BR");
    assert_eq!(repo.find_by_slug("padeiro", &locale("PT-br")).await?.id, listing.id);

    Ok(())
}
