//! Pure conversions between persisted records and transfer records.

use super::dto::{CategoryDto, TransferRecord, WordDto};
use crate::model::{Category, Entity, Word};

/// Stateless two-way mapping for one entity.
pub trait EntityMapper {
    type Entity: Entity;
    type Dto: TransferRecord;

    fn to_dto(entity: &Self::Entity) -> Self::Dto;
    fn to_entity(dto: &Self::Dto) -> Self::Entity;
}

/// Flattens `category` to `categoryId` and back.
pub struct WordMapper;

impl EntityMapper for WordMapper {
    type Entity = Word;
    type Dto = WordDto;

    fn to_dto(word: &Word) -> WordDto {
        WordDto {
            id: word.id,
            rus: word.rus.clone(),
            en: word.en.clone(),
            definition: word.definition.clone(),
            category_id: word.category_id(),
        }
    }

    fn to_entity(dto: &WordDto) -> Word {
        Word {
            id: dto.id,
            rus: dto.rus.clone(),
            en: dto.en.clone(),
            definition: dto.definition.clone(),
            category: dto.category_id.map(Category::from_id),
        }
    }
}

pub struct CategoryMapper;

impl EntityMapper for CategoryMapper {
    type Entity = Category;
    type Dto = CategoryDto;

    fn to_dto(category: &Category) -> CategoryDto {
        CategoryDto {
            id: category.id,
            rus: category.rus.clone(),
            en: category.en.clone(),
        }
    }

    fn to_entity(dto: &CategoryDto) -> Category {
        Category {
            id: dto.id,
            rus: dto.rus.clone(),
            en: dto.en.clone(),
        }
    }
}
