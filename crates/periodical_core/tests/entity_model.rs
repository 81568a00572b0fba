use periodical_core::{Article, Author, Magazine, MemoryDatabase, Session, ValidationError};

#[test]
fn author_name_round_trips_for_valid_names() {
    for name in ["A", "Ada", "Ada Lovelace", "Émilie du Châtelet"] {
        assert_eq!(Author::new(name).unwrap().name(), name);
    }
    assert_eq!(
        Author::new("").unwrap_err(),
        ValidationError::EmptyAuthorName
    );
}

#[test]
fn article_title_length_window_is_five_to_fifty() {
    for len in [5, 6, 25, 49, 50] {
        assert!(Article::new("t".repeat(len), "body", 1, 1).is_ok(), "len {len}");
    }
    for len in [0, 4, 51] {
        let err = Article::new("t".repeat(len), "body", 1, 1).unwrap_err();
        assert_eq!(err, ValidationError::TitleLength { chars: len });
    }
}

#[test]
fn short_title_article_is_rejected() {
    let err = Article::new("Bad", "x", 1, 1).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Title must be a string between 5 and 50 characters"
    );
}

#[test]
fn serialization_uses_plain_field_names() {
    let db = MemoryDatabase::open().unwrap();
    let mut session = Session::new(&db);
    session.create_tables().unwrap();
    let ada = session.authors.create("Ada").unwrap();
    let vogue = session.magazines.create("Vogue", "Fashion").unwrap();
    let article = session
        .articles
        .create(
            "Valid Title",
            "Some content",
            &ada.borrow(),
            &vogue.borrow(),
        )
        .unwrap();

    let json = serde_json::to_value(&*article.borrow()).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["title"], "Valid Title");
    assert_eq!(json["author_id"], 1);
    assert_eq!(json["magazine_id"], 1);

    let draft = Author::new("Grace").unwrap();
    let json = serde_json::to_value(&draft).unwrap();
    assert!(json["id"].is_null());
}

#[test]
fn deserialization_yields_validated_drafts() {
    let author: Author = serde_json::from_value(serde_json::json!({
        "id": 42,
        "name": "Ada"
    }))
    .unwrap();
    assert_eq!(author.id(), None);
    assert_eq!(author.name(), "Ada");

    let err = serde_json::from_value::<Magazine>(serde_json::json!({
        "name": "X",
        "category": "Fashion"
    }))
    .unwrap_err();
    assert!(
        err.to_string()
            .contains("Name must be a string between 2 and 16 characters"),
        "unexpected error: {err}"
    );

    let err = serde_json::from_value::<Article>(serde_json::json!({
        "title": "Valid Title",
        "content": "",
        "author_id": 1,
        "magazine_id": 1
    }))
    .unwrap_err();
    assert!(err.to_string().contains("Content must be a non-empty string"));
}

#[test]
fn display_matches_short_form() {
    let magazine = Magazine::new("Wired", "Technology").unwrap();
    let article = Article::new("Valid Title", "body", 1, 1).unwrap();
    assert_eq!(magazine.to_string(), "<Magazine Wired>");
    assert_eq!(article.to_string(), "<Article Valid Title>");
}
