//! Post entity for SeaORM.

use std::collections::BTreeSet;

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quill_core::domain::PostFields;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text")]
    pub excerpt: String,
    pub author: String,
    /// JSON array of tag strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub published: bool,
    pub views: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn tags_to_json(tags: &BTreeSet<String>) -> Json {
    Json::Array(tags.iter().cloned().map(Json::String).collect())
}

fn tags_from_json(value: Json) -> BTreeSet<String> {
    match value {
        Json::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Json::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => BTreeSet::new(),
    }
}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for quill_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            content: model.content,
            excerpt: model.excerpt,
            author: model.author,
            tags: tags_from_json(model.tags),
            published: model.published,
            views: model.views,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl ActiveModel {
    /// Active model for a new row; the database assigns the id.
    pub fn from_fields(fields: PostFields) -> Self {
        let now: DateTimeWithTimeZone = chrono::Utc::now().into();
        let mut model = Self {
            views: Set(0),
            created_at: Set(now),
            ..Default::default()
        };
        model.set_fields(fields, now);
        model
    }

    /// Overwrite every mutable column and stamp `updated_at`.
    pub fn set_fields(&mut self, fields: PostFields, now: DateTimeWithTimeZone) {
        self.title = Set(fields.title);
        self.slug = Set(fields.slug);
        self.content = Set(fields.content);
        self.excerpt = Set(fields.excerpt);
        self.author = Set(fields.author);
        self.tags = Set(tags_to_json(&fields.tags));
        self.published = Set(fields.published);
        self.updated_at = Set(now);
    }
}
