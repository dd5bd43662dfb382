use sea_orm::entity::prelude::*;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_type: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub website: String,
    pub github: String,
    pub linkedin: String,
    pub department: Option<String>,
    pub year: Option<String>,
    pub profession: Option<String>,
    /// JSON array of strings.
    #[sea_orm(column_type = "Text")]
    pub interests: String,
    /// JSON object, see `campusnet_sdk::Preferences`.
    #[sea_orm(column_type = "Text")]
    pub preferences: String,
    /// Lowercased `name`, written alongside it.
    pub name_search: String,
    /// Lowercased `profession`, empty when absent.
    pub profession_search: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
