use periodical_core::{
    Article, Author, ConnectionProvider, FileDatabase, Magazine, MemoryDatabase, RepoError,
    Session, Shared, StoreConfig, ValidationError,
};
use std::rc::Rc;

fn seeded(session: &mut Session<'_, impl ConnectionProvider>) -> (Shared<Author>, Shared<Magazine>) {
    session.create_tables().unwrap();
    let author = session.authors.create("Ada").unwrap();
    let magazine = session.magazines.create("Vogue", "Fashion").unwrap();
    (author, magazine)
}

#[test]
fn create_article_links_saved_author_and_magazine() {
    let db = MemoryDatabase::open().unwrap();
    let mut session = Session::new(&db);
    let (author, magazine) = seeded(&mut session);

    let article = session
        .articles
        .create(
            "Valid Title",
            "Some content",
            &author.borrow(),
            &magazine.borrow(),
        )
        .unwrap();

    let article = article.borrow();
    assert_eq!(article.id(), Some(1));
    assert_eq!(article.author_id(), 1);
    assert_eq!(article.magazine_id(), 1);
    assert_eq!(article.title(), "Valid Title");
}

#[test]
fn create_article_with_draft_author_fails_validation() {
    let db = MemoryDatabase::open().unwrap();
    let mut session = Session::new(&db);
    let (_, magazine) = seeded(&mut session);
    let draft = Author::new("Eve").unwrap();

    let err = session
        .articles
        .create("Valid Title", "Some content", &draft, &magazine.borrow())
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingAuthorId)
    ));
    assert!(session.articles.get_all().unwrap().is_empty());
}

#[test]
fn foreign_keys_are_enforced_by_storage() {
    let db = MemoryDatabase::open().unwrap();
    let mut session = Session::new(&db);
    seeded(&mut session);

    let orphan = Article::new("Orphaned piece", "body", 99, 1).unwrap();
    let err = session.articles.add(orphan).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(session.articles.identity_map().is_empty());
}

#[test]
fn foreign_keys_can_be_disabled_through_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = StoreConfig::new(dir.path().join("loose.db"));
    config.enforce_foreign_keys = false;
    let db = FileDatabase::new(config).unwrap();
    let mut session = Session::new(&db);
    session.create_tables().unwrap();

    let orphan = Article::new("Orphaned piece", "body", 99, 42).unwrap();
    let saved = session.articles.add(orphan).unwrap();
    assert_eq!(saved.borrow().id(), Some(1));
}

#[test]
fn finders_by_title_author_and_magazine() {
    let db = MemoryDatabase::open().unwrap();
    let mut session = Session::new(&db);
    let (ada, vogue) = seeded(&mut session);
    let grace = session.authors.create("Grace").unwrap();
    let wired = session.magazines.create("Wired", "Technology").unwrap();

    let first = session
        .articles
        .create("Analytical Engines", "notes", &ada.borrow(), &wired.borrow())
        .unwrap();
    let second = session
        .articles
        .create("Fashion and Math", "essay", &ada.borrow(), &vogue.borrow())
        .unwrap();
    let third = session
        .articles
        .create("Compilers Today", "report", &grace.borrow(), &wired.borrow())
        .unwrap();

    let by_title = session
        .articles
        .find_by_title("Fashion and Math")
        .unwrap()
        .unwrap();
    assert!(Rc::ptr_eq(&by_title, &second));
    assert!(session
        .articles
        .find_by_title("Missing Title")
        .unwrap()
        .is_none());

    let by_ada = session.articles.find_by_author(1).unwrap();
    assert_eq!(by_ada.len(), 2);
    assert!(Rc::ptr_eq(&by_ada[0], &first));
    assert!(Rc::ptr_eq(&by_ada[1], &second));

    let wired_id = wired.borrow().id().unwrap();
    let in_wired = session.articles.find_by_magazine(wired_id).unwrap();
    assert_eq!(in_wired.len(), 2);
    assert!(Rc::ptr_eq(&in_wired[1], &third));
}

#[test]
fn update_changes_every_column() {
    let db = MemoryDatabase::open().unwrap();
    let mut session = Session::new(&db);
    let (ada, vogue) = seeded(&mut session);
    let wired = session.magazines.create("Wired", "Technology").unwrap();

    let article = session
        .articles
        .create("Valid Title", "Some content", &ada.borrow(), &vogue.borrow())
        .unwrap();
    {
        let mut draft = article.borrow_mut();
        draft.set_title("Revised Title").unwrap();
        draft.set_content("Revised content").unwrap();
        draft.set_magazine(&wired.borrow()).unwrap();
    }
    session.articles.save(&article).unwrap();

    let stored: (String, String, i64) = db
        .with_connection(|conn| {
            Ok(conn.query_row(
                "SELECT title, content, magazine_id FROM articles WHERE id = 1;",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?)
        })
        .unwrap();
    assert_eq!(
        stored,
        ("Revised Title".to_string(), "Revised content".to_string(), 2)
    );
}

#[test]
fn delete_article_then_resave_assigns_new_id() {
    let db = MemoryDatabase::open().unwrap();
    let mut session = Session::new(&db);
    let (ada, vogue) = seeded(&mut session);

    let first = session
        .articles
        .create("First Article", "one", &ada.borrow(), &vogue.borrow())
        .unwrap();
    session
        .articles
        .create("Second Article", "two", &ada.borrow(), &vogue.borrow())
        .unwrap();

    session.articles.delete(&first).unwrap();
    assert_eq!(first.borrow().id(), None);
    assert_eq!(session.articles.get_all().unwrap().len(), 1);

    session.articles.save(&first).unwrap();
    assert_eq!(first.borrow().id(), Some(3));
    assert_eq!(session.articles.get_all().unwrap().len(), 2);
}
