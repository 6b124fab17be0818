//! CRUD and search endpoints, one [`Resource`] per entity.

mod resource;

pub use resource::{routes, Resource};

use crate::{AppState, CategoryApiService, WordApiService};
use dictionary_core::{
    CategoryDto, CategoryMapper, SqliteCategoryRepository, SqliteSearchIndex,
    SqliteWordRepository, WordDto, WordMapper,
};
use dictionary_core::{Category, Word};
use std::sync::Arc;

/// `/api/words`, `/api/words/:id`, `/api/_search/words`.
pub struct Words;

impl Resource for Words {
    type Mapper = WordMapper;
    type Dto = WordDto;
    type Repo = SqliteWordRepository;
    type Index = SqliteSearchIndex<Word>;

    const COLLECTION: &'static str = "words";

    fn service(state: &AppState) -> Arc<WordApiService> {
        state.words.clone()
    }
}

/// `/api/categories`, `/api/categories/:id`, `/api/_search/categories`.
pub struct Categories;

impl Resource for Categories {
    type Mapper = CategoryMapper;
    type Dto = CategoryDto;
    type Repo = SqliteCategoryRepository;
    type Index = SqliteSearchIndex<Category>;

    const COLLECTION: &'static str = "categories";

    fn service(state: &AppState) -> Arc<CategoryApiService> {
        state.categories.clone()
    }
}
