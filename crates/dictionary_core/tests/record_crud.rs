use dictionary_core::db::{open_record_db_in_memory, share, SharedConnection};
use dictionary_core::{
    Category, PageRequest, RepoError, Repository, SortOrder, SqliteCategoryRepository,
    SqliteWordRepository, Word,
};

fn record_store() -> SharedConnection {
    share(open_record_db_in_memory().unwrap())
}

#[test]
fn create_assigns_id_and_get_roundtrips() {
    let repo = SqliteWordRepository::new(record_store());

    let word = Word::new("привет", "hello").with_definition("greeting");
    let saved = repo.create(&word).unwrap();
    let id = saved.id.expect("store assigns an id");

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.id, Some(id));
    assert_eq!(loaded.rus.as_deref(), Some("привет"));
    assert_eq!(loaded.en.as_deref(), Some("hello"));
    assert_eq!(loaded.definition.as_deref(), Some("greeting"));
    assert!(loaded.category.is_none());
}

#[test]
fn create_rejects_preassigned_id() {
    let repo = SqliteWordRepository::new(record_store());

    let mut word = Word::new("да", "yes");
    word.id = Some(10);
    let err = repo.create(&word).unwrap_err();
    assert!(matches!(err, RepoError::IdAlreadyAssigned { id: 10, .. }));
    assert_eq!(repo.find_all(&PageRequest::default()).unwrap().total_elements, 0);
}

#[test]
fn words_load_their_category_labels() {
    let conn = record_store();
    let categories = SqliteCategoryRepository::new(conn.clone());
    let words = SqliteWordRepository::new(conn);

    let animals = categories.create(&Category::new("животные", "animals")).unwrap();
    let category_id = animals.id.unwrap();

    let saved = words
        .create(&Word::new("кот", "cat").with_category(Category::from_id(category_id)))
        .unwrap();

    let category = saved.category.expect("category reference is loaded");
    assert_eq!(category.id, Some(category_id));
    assert_eq!(category.en.as_deref(), Some("animals"));
    assert_eq!(category.rus.as_deref(), Some("животные"));
}

#[test]
fn create_with_unknown_category_fails() {
    let repo = SqliteWordRepository::new(record_store());

    let err = repo
        .create(&Word::new("кот", "cat").with_category(Category::from_id(404)))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn update_overwrites_every_field() {
    let repo = SqliteWordRepository::new(record_store());

    let mut word = repo
        .create(&Word::new("черновик", "draft").with_definition("first"))
        .unwrap();
    word.rus = Some("updated".to_string());
    word.en = None;
    word.definition = None;

    let updated = repo.update(&word).unwrap();
    assert_eq!(updated.id, word.id);
    assert_eq!(updated.rus.as_deref(), Some("updated"));
    assert_eq!(updated.en, None);
    assert_eq!(updated.definition, None);

    let total = repo.find_all(&PageRequest::default()).unwrap().total_elements;
    assert_eq!(total, 1);
}

#[test]
fn update_with_unknown_id_inserts() {
    let repo = SqliteWordRepository::new(record_store());

    let mut word = Word::new("новый", "new");
    word.id = Some(77);
    let saved = repo.update(&word).unwrap();
    assert_eq!(saved.id, Some(77));
    assert!(repo.find_by_id(77).unwrap().is_some());
}

#[test]
fn update_without_id_is_rejected_by_store() {
    let repo = SqliteWordRepository::new(record_store());

    let err = repo.update(&Word::new("без", "without")).unwrap_err();
    assert!(matches!(err, RepoError::MissingId { entity: "word" }));
}

#[test]
fn delete_removes_and_missing_id_is_silent() {
    let repo = SqliteWordRepository::new(record_store());

    let saved = repo.create(&Word::new("удалить", "delete")).unwrap();
    let id = saved.id.unwrap();

    repo.delete(id).unwrap();
    assert!(repo.find_by_id(id).unwrap().is_none());

    repo.delete(id).unwrap();
    repo.delete(999_999_999).unwrap();
}

#[test]
fn find_all_pages_and_sorts() {
    let repo = SqliteWordRepository::new(record_store());
    for (rus, en) in [("в", "c"), ("а", "a"), ("б", "b")] {
        repo.create(&Word::new(rus, en)).unwrap();
    }

    let first = repo
        .find_all(&PageRequest::new(0, 2).with_sort(SortOrder::desc("en")))
        .unwrap();
    assert_eq!(first.total_elements, 3);
    assert_eq!(first.total_pages(), 2);
    let ens = first
        .content
        .iter()
        .map(|word| word.en.clone().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(ens, vec!["c", "b"]);

    let second = repo
        .find_all(&PageRequest::new(1, 2).with_sort(SortOrder::desc("en")))
        .unwrap();
    assert_eq!(second.content.len(), 1);
    assert_eq!(second.content[0].en.as_deref(), Some("a"));
}

#[test]
fn find_all_rejects_unknown_sort_property() {
    let repo = SqliteWordRepository::new(record_store());

    let err = repo
        .find_all(&PageRequest::default().with_sort(SortOrder::asc("colour")))
        .unwrap_err();
    assert!(matches!(err, RepoError::Page(_)));
}

#[test]
fn category_crud_roundtrip() {
    let repo = SqliteCategoryRepository::new(record_store());

    let mut category = repo.create(&Category::new("еда", "food")).unwrap();
    let id = category.id.unwrap();

    category.en = Some("meals".to_string());
    repo.update(&category).unwrap();
    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.en.as_deref(), Some("meals"));

    repo.delete(id).unwrap();
    assert!(repo.find_by_id(id).unwrap().is_none());
}

#[test]
fn deleting_referenced_category_fails() {
    let conn = record_store();
    let categories = SqliteCategoryRepository::new(conn.clone());
    let words = SqliteWordRepository::new(conn);

    let category = categories.create(&Category::new("цвет", "colour")).unwrap();
    let category_id = category.id.unwrap();
    words
        .create(&Word::new("красный", "red").with_category(Category::from_id(category_id)))
        .unwrap();

    assert!(categories.delete(category_id).is_err());
    assert!(categories.find_by_id(category_id).unwrap().is_some());
}
