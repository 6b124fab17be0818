use dictionary_core::db::{open_index_db_in_memory, share};
use dictionary_core::{
    Category, PageRequest, SearchError, SearchIndex, SortOrder, SqliteSearchIndex, Word,
};

fn word_index() -> SqliteSearchIndex<Word> {
    SqliteSearchIndex::new(share(open_index_db_in_memory().unwrap()))
}

fn indexed_word(id: i64, rus: &str, en: &str, definition: Option<&str>) -> Word {
    let mut word = Word::new(rus, en);
    word.id = Some(id);
    word.definition = definition.map(str::to_string);
    word
}

fn ids(page: &dictionary_core::Page<Word>) -> Vec<i64> {
    page.content.iter().filter_map(|word| word.id).collect()
}

#[test]
fn search_by_id_returns_exactly_one_match() {
    let index = word_index();
    index
        .upsert(&indexed_word(1, "привет", "hello", Some("greeting")))
        .unwrap();
    index.upsert(&indexed_word(2, "пока", "bye", None)).unwrap();

    let page = index.search("id:1", &PageRequest::default()).unwrap();
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].rus.as_deref(), Some("привет"));
    assert_eq!(page.content[0].definition.as_deref(), Some("greeting"));
}

#[test]
fn bare_terms_match_any_text_field_case_insensitively() {
    let index = word_index();
    index
        .upsert(&indexed_word(1, "Привет", "hello", Some("greeting")))
        .unwrap();
    index
        .upsert(&indexed_word(2, "утро", "morning", Some("early greeting")))
        .unwrap();
    index.upsert(&indexed_word(3, "кот", "cat", None)).unwrap();

    assert_eq!(ids(&index.search("GREETING", &PageRequest::default()).unwrap()), vec![1, 2]);
    assert_eq!(ids(&index.search("привет", &PageRequest::default()).unwrap()), vec![1]);
    assert_eq!(ids(&index.search("hello cat", &PageRequest::default()).unwrap()), vec![1, 3]);
}

#[test]
fn field_filters_prefixes_and_boolean_operators() {
    let index = word_index();
    index.upsert(&indexed_word(1, "дом", "house", Some("home"))).unwrap();
    index.upsert(&indexed_word(2, "домик", "hut", Some("small house"))).unwrap();
    index.upsert(&indexed_word(3, "кот", "cat", None)).unwrap();

    let request = PageRequest::default();
    assert_eq!(ids(&index.search("en:house", &request).unwrap()), vec![1]);
    assert_eq!(ids(&index.search("rus:дом*", &request).unwrap()), vec![1, 2]);
    assert_eq!(ids(&index.search("house AND NOT id:1", &request).unwrap()), vec![2]);
    assert_eq!(ids(&index.search("definition:\"small house\"", &request).unwrap()), vec![2]);
    assert_eq!(ids(&index.search("*", &request).unwrap()), vec![1, 2, 3]);
}

#[test]
fn upsert_replaces_document_and_tokens() {
    let index = word_index();
    let mut word = indexed_word(5, "старый", "old", None);
    index.upsert(&word).unwrap();

    word.rus = Some("updated".to_string());
    word.en = Some("new".to_string());
    index.upsert(&word).unwrap();

    assert!(index.search("old", &PageRequest::default()).unwrap().content.is_empty());
    let page = index.search("id:5", &PageRequest::default()).unwrap();
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].rus.as_deref(), Some("updated"));
    assert_eq!(ids(&index.search("new", &PageRequest::default()).unwrap()), vec![5]);
    assert_eq!(index.count().unwrap(), 1);
}

#[test]
fn delete_removes_document_and_missing_id_is_silent() {
    let index = word_index();
    index.upsert(&indexed_word(8, "снег", "snow", None)).unwrap();

    index.delete(8).unwrap();
    index.delete(8).unwrap();

    assert!(index.search("id:8", &PageRequest::default()).unwrap().content.is_empty());
    assert!(index.search("snow", &PageRequest::default()).unwrap().content.is_empty());
}

#[test]
fn delete_all_clears_every_document() {
    let index = word_index();
    for id in 1..=3 {
        index.upsert(&indexed_word(id, "слово", "word", None)).unwrap();
    }

    index.delete_all().unwrap();
    assert_eq!(index.count().unwrap(), 0);
    assert!(index.search("word", &PageRequest::default()).unwrap().content.is_empty());
}

#[test]
fn category_labels_are_stored_with_the_word() {
    let index = word_index();
    let word = indexed_word(4, "яблоко", "apple", None).with_category(Category {
        id: Some(2),
        rus: Some("еда".to_string()),
        en: Some("food".to_string()),
    });
    index.upsert(&word).unwrap();

    let page = index.search("categoryId:2", &PageRequest::default()).unwrap();
    let category = page.content[0].category.clone().unwrap();
    assert_eq!(category.id, Some(2));
    assert_eq!(category.en.as_deref(), Some("food"));
}

#[test]
fn category_labels_and_id_are_searchable() {
    let index = word_index();
    let food = Category {
        id: Some(3),
        rus: Some("еда".to_string()),
        en: Some("food".to_string()),
    };
    index
        .upsert(&indexed_word(1, "хлеб", "bread", None).with_category(food))
        .unwrap();
    index.upsert(&indexed_word(2, "кот", "cat", None)).unwrap();

    let request = PageRequest::default();
    assert_eq!(ids(&index.search("food", &request).unwrap()), vec![1]);
    assert_eq!(ids(&index.search("category.en:food", &request).unwrap()), vec![1]);
    assert_eq!(ids(&index.search("category.rus:еда", &request).unwrap()), vec![1]);
    assert_eq!(ids(&index.search("category.id:3", &request).unwrap()), vec![1]);
    assert_eq!(ids(&index.search("category.en:fo*", &request).unwrap()), vec![1]);
    assert!(index.search("en:food", &request).unwrap().content.is_empty());
}

#[test]
fn relabelled_word_drops_old_category_tokens() {
    let index = word_index();
    let word = indexed_word(1, "хлеб", "bread", None).with_category(Category {
        id: Some(3),
        rus: Some("еда".to_string()),
        en: Some("food".to_string()),
    });
    index.upsert(&word).unwrap();
    index
        .upsert(&word.clone().with_category(Category {
            id: Some(4),
            rus: Some("выпечка".to_string()),
            en: Some("bakery".to_string()),
        }))
        .unwrap();

    let request = PageRequest::default();
    assert!(index.search("food", &request).unwrap().content.is_empty());
    assert_eq!(ids(&index.search("category.en:bakery", &request).unwrap()), vec![1]);
    assert_eq!(ids(&index.search("category.id:4", &request).unwrap()), vec![1]);

    index.delete(1).unwrap();
    assert!(index.search("bakery", &request).unwrap().content.is_empty());
}

#[test]
fn search_pages_and_sorts() {
    let index = word_index();
    for (id, en) in [(1, "b"), (2, "c"), (3, "a")] {
        index.upsert(&indexed_word(id, "х", en, None)).unwrap();
    }

    let request = PageRequest::new(0, 2).with_sort(SortOrder::asc("en"));
    let page = index.search("*", &request).unwrap();
    assert_eq!(page.total_elements, 3);
    assert_eq!(ids(&page), vec![3, 1]);
    assert!(page.has_next());

    let request = PageRequest::new(1, 2).with_sort(SortOrder::asc("en"));
    assert_eq!(ids(&index.search("*", &request).unwrap()), vec![2]);
}

#[test]
fn blank_query_returns_empty_page() {
    let index = word_index();
    index.upsert(&indexed_word(1, "а", "a", None)).unwrap();

    let page = index.search("  ", &PageRequest::default()).unwrap();
    assert!(page.content.is_empty());
    assert_eq!(page.total_elements, 0);
}

#[test]
fn invalid_queries_are_reported() {
    let index = word_index();

    for query in ["id:abc", "colour:red", "(cat", "\"open"] {
        let err = index.search(query, &PageRequest::default()).unwrap_err();
        assert!(
            matches!(err, SearchError::InvalidQuery { .. }),
            "query {query} gave {err}"
        );
    }

    let err = index
        .search("*", &PageRequest::default().with_sort(SortOrder::asc("category_rus")))
        .unwrap_err();
    assert!(matches!(err, SearchError::Page(_)));
}

#[test]
fn upsert_without_id_is_rejected() {
    let index = word_index();
    let err = index.upsert(&Word::new("без", "none")).unwrap_err();
    assert!(matches!(err, SearchError::MissingId { entity: "word" }));
}

#[test]
fn category_index_searches_labels() {
    let index: SqliteSearchIndex<Category> =
        SqliteSearchIndex::new(share(open_index_db_in_memory().unwrap()));
    let mut category = Category::new("животные", "animals");
    category.id = Some(1);
    index.upsert(&category).unwrap();

    let page = index.search("rus:животные", &PageRequest::default()).unwrap();
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].en.as_deref(), Some("animals"));
}
