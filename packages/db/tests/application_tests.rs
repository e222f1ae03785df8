#![allow(clippy::disallowed_methods)]

mod common;

use std::error::Error;

use db::DbError;
use jobs_core::{JobApplication, JobAttributes, JobListingId, Locale};

#[tokio::test]
async fn applications_belong_to_existing_listings() -> Result<(), Box<dyn Error>> {
    let (listings, applications) = common::repositories().await?;

    let orphan = JobApplication::new(JobListingId::new(), "Ada", "ada@example.com");
    assert!(matches!(
        applications.create(&orphan).await,
        Err(DbError::NotFound(_))
    ));

    let listing = listings
        .create(&Locale::default(), JobAttributes::new("Baker", "Bread"))
        .await?;
    let application = JobApplication::new(listing.id, "Ada", "ada@example.com")
        .with_phone("+31 20 123 4567")
        .with_cover_letter("I like bread.");
    let created = applications.create(&application).await?;
    assert_eq!(created.id, application.id);
    assert_eq!(created.phone.as_deref(), Some("+31 20 123 4567"));

    let loaded = applications.get(application.id).await?;
    assert_eq!(loaded.job_id, listing.id);
    assert_eq!(loaded.cover_letter.as_deref(), Some("I like bread."));

    Ok(())
}

#[tokio::test]
async fn applications_are_listed_and_counted() -> Result<(), Box<dyn Error>> {
    let (listings, applications) = common::repositories().await?;
    let en = Locale::default();

    let baker = listings.create(&en, JobAttributes::new("Baker", "Bread")).await?;
    let butcher = listings.create(&en, JobAttributes::new("Butcher", "Meat")).await?;

    let first = applications
        .create(&JobApplication::new(baker.id, "Ada", "ada@example.com"))
        .await?;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = applications
        .create(&JobApplication::new(baker.id, "Grace", "grace@example.com"))
        .await?;
    applications
        .create(&JobApplication::new(butcher.id, "Linus", "linus@example.com"))
        .await?;

    let ids: Vec<_> = applications
        .list_for_job(baker.id)
        .await?
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert_eq!(applications.count_for_job(baker.id).await?, 2);
    assert_eq!(applications.count_for_job(butcher.id).await?, 1);

    applications.delete(first.id).await?;
    assert_eq!(applications.count_for_job(baker.id).await?, 1);
    assert!(matches!(
        applications.delete(first.id).await,
        Err(DbError::NotFound(_))
    ));

    Ok(())
}

#[tokio::test]
async fn deleting_a_listing_removes_its_applications() -> Result<(), Box<dyn Error>> {
    let (listings, applications) = common::repositories().await?;
    let en = Locale::default();

    let baker = listings.create(&en, JobAttributes::new("Baker", "Bread")).await?;
    let butcher = listings.create(&en, JobAttributes::new("Butcher", "Meat")).await?;
    listings
        .update(baker.id, &common::locale("nl"), JobAttributes::new("Bakker", "Brood"))
        .await?;

    for name in ["Ada", "Grace", "Linus"] {
        applications
            .create(&JobApplication::new(baker.id, name, "jobs@example.com"))
            .await?;
    }
    applications
        .create(&JobApplication::new(butcher.id, "Ken", "ken@example.com"))
        .await?;

    listings.delete(baker.id).await?;

    assert_eq!(applications.count_for_job(baker.id).await?, 0);
    assert!(listings.translations().for_listing(baker.id, None).await?.is_empty());
    assert!(matches!(listings.get(baker.id).await, Err(DbError::NotFound(_))));

    assert_eq!(applications.count_for_job(butcher.id).await?, 1);
    assert_eq!(listings.get(butcher.id).await?.translations.len(), 1);

    Ok(())
}
