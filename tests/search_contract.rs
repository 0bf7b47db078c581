use didyoumean::{
    CallContext,
    Document,
    DocumentStore,
    Error,
    MemoryStore,
    MockStore,
    Pagination,
    store::{Call, FindResponse},
};

fn movie(id: i64, title: &str, keywords: &[&str]) -> Document {
    Document {
        id,
        title: title.to_string(),
        original_title: title.to_string(),
        overview: format!("overview of {title}"),
        creation_date: "2005-06-15".to_string(),
        keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
    }
}

fn catalog() -> Vec<Document> {
    vec![
        movie(1, "Batman Begins", &["gotham", "origin"]),
        movie(2, "Heat", &["heist", "los angeles"]),
        movie(3, "The Lego Movie", &["lego", "BATMAN"]),
        movie(4, "Superman", &["krypton"]),
        movie(5, "Mask of the Phantasm", &["animated", "Batman"]),
        movie(6, "Batmanuel", &[]),
    ]
}

async fn seeded() -> (MemoryStore, CallContext) {
    let store = MemoryStore::new();
    let ctx = CallContext::background();
    store.upsert_batch(&ctx, "movies", &catalog()).await.unwrap();
    (store, ctx)
}

#[tokio::test]
async fn multi_field_search_matches_title_or_keywords() {
    let (store, ctx) = seeded().await;
    let mut page = Pagination::new(1, 50);

    let found: Vec<Document> = store
        .find(&ctx, "movies", &["title", "keywords"], "batman", &mut page)
        .await
        .unwrap();

    let ids: Vec<i64> = found.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 3, 5, 6]);
    assert_eq!(page.total_documents, 4);
    for doc in &found {
        let hit = doc.title.to_lowercase().contains("batman")
            || doc
                .keywords
                .iter()
                .any(|k| k.to_lowercase().contains("batman"));
        assert!(hit, "unexpected match {doc:?}");
    }
}

#[tokio::test]
async fn query_is_a_live_pattern() {
    let (store, ctx) = seeded().await;
    let mut page = Pagination::new(1, 50);

    let found: Vec<Document> = store
        .find(&ctx, "movies", &["title"], "^bat.*s$", &mut page)
        .await
        .unwrap();

    let ids: Vec<i64> = found.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn out_of_range_pages_fold_to_first_page() {
    let (store, ctx) = seeded().await;

    for (page, size) in [(3, 2), (5, 1), (40, 10), (2, 4)] {
        let mut window = Pagination::new(page, size);
        let found: Vec<Document> = store
            .find(&ctx, "movies", &["title", "keywords"], "batman", &mut window)
            .await
            .unwrap();

        assert_eq!(window.page, 1, "page {page} size {size}");
        assert_eq!(window.total_documents, 4);
        assert_eq!(found[0].id, 1);
    }
}

#[tokio::test]
async fn in_range_pages_are_disjoint() {
    let (store, ctx) = seeded().await;
    let mut seen = Vec::new();

    for page in 1..=2 {
        let mut window = Pagination::new(page, 2);
        let found: Vec<Document> = store
            .find(&ctx, "movies", &["title", "keywords"], "batman", &mut window)
            .await
            .unwrap();
        assert_eq!(window.page, page);
        seen.extend(found.into_iter().map(|d| d.id));
    }

    assert_eq!(seen, vec![1, 3, 5, 6]);
}

#[tokio::test]
async fn blank_query_never_reaches_the_store() {
    let mock = MockStore::new();
    let memory = MemoryStore::new();
    let ctx = CallContext::background();

    for query in ["", "   ", "\t"] {
        let mut page = Pagination::new(2, 10);
        let result: didyoumean::Result<Vec<Document>> = memory
            .find(&ctx, "movies", &["title"], query, &mut page)
            .await;
        assert!(matches!(result, Err(Error::QueryEmpty)));
        assert_eq!(page.total_documents, 0);
        assert_eq!(page.page, 2);
    }

    // The double records whatever it is given; only real stores guard.
    let _: Vec<Document> = mock
        .find(&ctx, "movies", &["title"], "", &mut Pagination::default())
        .await
        .unwrap();
    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn upsert_then_find_round_trips_once() {
    let (store, ctx) = seeded().await;
    let updated = Document {
        keywords: vec!["gotham".into(), "nolan".into()],
        ..movie(1, "Batman Begins", &[])
    };

    let result = store
        .upsert_batch(&ctx, "movies", &[updated.clone()])
        .await
        .unwrap();
    assert_eq!((result.matched, result.modified, result.upserted), (1, 1, 0));

    let mut page = Pagination::new(1, 10);
    let found: Vec<Document> = store
        .find(&ctx, "movies", &["keywords"], "nolan", &mut page)
        .await
        .unwrap();

    assert_eq!(found, vec![updated]);
    assert_eq!(store.documents("movies").await.len(), catalog().len());
}

#[tokio::test]
async fn batch_with_missing_id_is_rejected_whole() {
    let store = MemoryStore::new();
    let ctx = CallContext::background();
    let batch = vec![
        bson::doc! { "id": 10_i64, "title": "First" },
        bson::doc! { "title": "No identity" },
        bson::doc! { "id": 11_i64, "title": "Third" },
    ];

    let result = store.upsert_batch(&ctx, "movies", &batch).await;

    assert!(matches!(result, Err(Error::DocumentMissingId)));
    assert!(store.documents("movies").await.is_empty());
}

#[tokio::test]
async fn mock_replays_pages_for_callers() {
    let mock = MockStore::new();
    mock.on_find(Ok(FindResponse {
        total: 3,
        documents: vec![bson::to_document(&movie(2, "Heat", &[])).unwrap()],
    }));
    let ctx = CallContext::background();

    let mut page = Pagination::new(9, 1);
    let found: Vec<Document> = mock
        .find(&ctx, "movies", &["title"], "heat", &mut page)
        .await
        .unwrap();

    assert_eq!(found[0].title, "Heat");
    assert_eq!(page.page, 1);
    assert_eq!(page.total_documents, 3);
    assert!(matches!(
        &mock.calls()[0],
        Call::Find { query, .. } if query == "heat"
    ));
}
